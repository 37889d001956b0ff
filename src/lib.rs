//! audiopaper — spoken-audio narration of long academic documents.
//!
//! The crate turns a plain-text document into a queue of narrated audio
//! segments.  A document is first decomposed into bounded, semantically
//! coherent chunks ([`segmenter`]), then each chunk is driven sequentially
//! through translate → synthesize → decode ([`pipeline`]), with per-chunk
//! failure isolation and live progress events.  A small playback state
//! machine decides which segment should currently be audible.
//!
//! # Architecture
//!
//! ```text
//! document text
//!     │
//!     ▼
//! segmenter::segment()          — pure, deterministic chunking
//!     │
//!     ▼
//! pipeline::SegmentStore        — ordered segments + lifecycle status
//!     │                            (single writer: the orchestrator)
//!     ▼
//! pipeline::PipelineOrchestrator
//!     ├─ translate::Translator   (chat-completions API)
//!     ├─ tts::Synthesizer        (speech API, raw PCM out)
//!     └─ audio::AudioClip        (PCM → WAV container)
//!     │
//!     ▼
//! pipeline::PlaybackScheduler   — "which segment is audible" pointer
//! ```
//!
//! The binary in `main.rs` is a thin shell: it wires real API collaborators
//! from [`config::AppConfig`] and writes finished segments to WAV files.

pub mod audio;
pub mod config;
pub mod extract;
pub mod pipeline;
pub mod segmenter;
pub mod translate;
pub mod tts;
