//! Segment pipeline for audiopaper.
//!
//! This module holds the run state ([`SegmentStore`]), the playback pointer
//! ([`PlaybackScheduler`]) and the driver that moves every segment through
//! translate → synthesize → decode ([`PipelineOrchestrator`]).
//!
//! # Architecture
//!
//! ```text
//! PipelineCommand (mpsc)
//!        │
//!        ▼
//! PipelineOrchestrator::run()  ← async tokio task
//!        │
//!        ├─ StartRun        → extract, truncate, segment, begin_run,
//!        │                    spawn the sequential run task
//!        ├─ SelectSegment   → PlaybackScheduler::select
//!        └─ SegmentFinished → PlaybackScheduler::finished
//!
//! run task (one per run, superseded by the next StartRun):
//!        for each segment, in order:
//!            Translator::translate → Synthesizer::synthesize → AudioClip
//!            (failures stay on the segment; the loop continues)
//!
//! SegmentStore (Arc<Mutex<…>>)  ←─── snapshots read by the presentation
//! PipelineEvent (mpsc)          ───▶ progress / logs / pointer updates
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use audiopaper::config::AppConfig;
//! use audiopaper::extract::PlainTextExtractor;
//! use audiopaper::pipeline::{new_shared_scheduler, new_shared_store, PipelineOrchestrator};
//! use audiopaper::translate::ApiTranslator;
//! use audiopaper::tts::ApiSynthesizer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let store = new_shared_store();
//!     let scheduler = new_shared_scheduler();
//!
//!     let (command_tx, command_rx) = mpsc::channel(16);
//!     let (event_tx, mut event_rx) = mpsc::channel(64);
//!
//!     let orchestrator = PipelineOrchestrator::new(
//!         store.clone(),
//!         scheduler.clone(),
//!         Arc::new(PlainTextExtractor),
//!         Arc::new(ApiTranslator::from_config(&config.translator)),
//!         Arc::new(ApiSynthesizer::from_config(&config.tts)),
//!         config.segmenter.clone(),
//!         event_tx,
//!     );
//!     tokio::spawn(orchestrator.run(command_rx));
//!
//!     // command_tx and event_rx are handed to the presentation layer.
//!     # let _ = (command_tx, &mut event_rx);
//! }
//! ```

pub mod orchestrator;
pub mod playback;
pub mod store;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use orchestrator::{LogLine, PipelineCommand, PipelineEvent, PipelineOrchestrator};
pub use playback::{new_shared_scheduler, PlaybackScheduler, SharedScheduler};
pub use store::{
    new_shared_store, Progress, RunId, Segment, SegmentStatus, SegmentStore, SharedStore,
};
