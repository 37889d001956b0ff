//! PCM normalization and in-memory WAV encoding.
//!
//! Raw synthesizer output is 16-bit signed little-endian PCM, mono, at
//! [`SAMPLE_RATE_HZ`].  [`decode_pcm16`] converts it to normalized `f32`
//! samples; [`encode_wav`] writes those samples into a 32-bit-float WAV
//! container using `hound`, entirely in memory.

use std::io::Cursor;

use thiserror::Error;

/// Sample rate of all synthesized speech in this system.
pub const SAMPLE_RATE_HZ: u32 = 24_000;

// ---------------------------------------------------------------------------
// AudioError
// ---------------------------------------------------------------------------

/// Errors from PCM decoding or WAV encoding.
#[derive(Debug, Clone, Error)]
pub enum AudioError {
    /// The raw byte stream does not contain whole 16-bit samples.
    #[error("PCM byte stream has odd length ({0} bytes)")]
    OddPcmLength(usize),

    /// The synthesizer returned no samples at all.
    #[error("PCM byte stream is empty")]
    EmptyPcm,

    /// `hound` failed to write the WAV container.
    #[error("WAV encoding failed: {0}")]
    Encode(String),
}

// ---------------------------------------------------------------------------
// PCM decode
// ---------------------------------------------------------------------------

/// Decode 16-bit signed little-endian PCM into `f32` samples in
/// `[-1.0, 1.0]` (divide by 32768).
pub fn decode_pcm16(bytes: &[u8]) -> Result<Vec<f32>, AudioError> {
    if bytes.is_empty() {
        return Err(AudioError::EmptyPcm);
    }
    if bytes.len() % 2 != 0 {
        return Err(AudioError::OddPcmLength(bytes.len()));
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32_768.0)
        .collect();

    Ok(samples)
}

// ---------------------------------------------------------------------------
// WAV encode
// ---------------------------------------------------------------------------

/// Encode mono `f32` samples into a 32-bit-float WAV container in memory.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, AudioError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| AudioError::Encode(e.to_string()))?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| AudioError::Encode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| AudioError::Encode(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

// ---------------------------------------------------------------------------
// AudioClip
// ---------------------------------------------------------------------------

/// An owned, playable audio resource: an encoded WAV buffer plus enough
/// metadata to report duration.
///
/// Created when a segment's synthesis + decode succeed; released when the
/// owning segment list is dropped at the start of a new run.
#[derive(Debug, Clone)]
pub struct AudioClip {
    wav: Vec<u8>,
    sample_count: usize,
    sample_rate: u32,
}

impl AudioClip {
    /// Build a clip from raw 16-bit LE PCM bytes at `sample_rate`.
    pub fn from_pcm16(bytes: &[u8], sample_rate: u32) -> Result<Self, AudioError> {
        let samples = decode_pcm16(bytes)?;
        let wav = encode_wav(&samples, sample_rate)?;
        Ok(Self {
            wav,
            sample_count: samples.len(),
            sample_rate,
        })
    }

    /// The encoded WAV container bytes.
    pub fn wav_bytes(&self) -> &[u8] {
        &self.wav
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Playback duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.sample_count as f64 / self.sample_rate as f64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
