//! Speech-synthesis collaborator.
//!
//! This module provides:
//! * [`Synthesizer`] — async trait implemented by all synthesis backends.
//! * [`ApiSynthesizer`] — OpenAI-compatible `/v1/audio/speech` backend that
//!   requests raw PCM output.
//! * [`SynthesisError`] — error variants for synthesis calls.
//!
//! Synthesizers return raw 16-bit signed little-endian PCM at
//! [`crate::audio::SAMPLE_RATE_HZ`]; the [`crate::audio`] module turns that
//! into a playable WAV container.  Synthesis failures are segment-local.

pub mod synthesizer;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use synthesizer::{ApiSynthesizer, SynthesisError, Synthesizer};

#[cfg(test)]
pub use synthesizer::MockSynthesizer;
