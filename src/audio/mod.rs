//! Audio decoding and container encoding.
//!
//! The speech-synthesis collaborator returns raw 16-bit signed little-endian
//! PCM.  This module normalizes those samples to `f32` in `[-1.0, 1.0]` and
//! wraps them in a standard WAV container so any player can consume them.
//!
//! [`AudioClip`] is the owned playable resource attached to a successful
//! segment; it is dropped (and its buffer freed) when the owning run is
//! discarded or replaced.

pub mod encode;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use encode::{decode_pcm16, encode_wav, AudioClip, AudioError, SAMPLE_RATE_HZ};
