//! Core `Synthesizer` trait and `ApiSynthesizer` implementation.
//!
//! `ApiSynthesizer` calls an OpenAI-compatible `/v1/audio/speech` endpoint
//! with `response_format: "pcm"`, so the response body is raw 16-bit LE PCM
//! at 24 kHz with no container to strip.  All connection details come from
//! [`TtsConfig`].

use async_trait::async_trait;
use thiserror::Error;

use crate::config::TtsConfig;

// ---------------------------------------------------------------------------
// SynthesisError
// ---------------------------------------------------------------------------

/// Errors that can occur during a synthesis call.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("synthesis request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status code.
    #[error("synthesis endpoint returned {0}")]
    Status(u16),

    /// The endpoint returned a zero-length audio body.
    #[error("synthesis returned no audio")]
    EmptyAudio,
}

impl From<reqwest::Error> for SynthesisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SynthesisError::Timeout
        } else {
            SynthesisError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Synthesizer trait
// ---------------------------------------------------------------------------

/// Async trait for text → raw-PCM speech synthesis.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn Synthesizer>`).
///
/// # Contract
///
/// The returned bytes are 16-bit signed little-endian PCM, mono, at
/// [`crate::audio::SAMPLE_RATE_HZ`] (24 000 Hz).
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize `text` into raw PCM bytes.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError>;
}

// ---------------------------------------------------------------------------
// ApiSynthesizer
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/audio/speech` endpoint.
pub struct ApiSynthesizer {
    client: reqwest::Client,
    config: TtsConfig,
}

impl ApiSynthesizer {
    /// Build an `ApiSynthesizer` from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; synthesis of a full chunk can take a while,
    /// so this is configured separately from the translator's timeout.
    pub fn from_config(config: &TtsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Synthesizer for ApiSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let url = format!("{}/v1/audio/speech", self.config.base_url);

        let body = serde_json::json!({
            "model":           self.config.model,
            "voice":           self.config.voice,
            "input":           text,
            "response_format": "pcm"
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynthesisError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }

        Ok(bytes.to_vec())
    }
}

// ---------------------------------------------------------------------------
// MockSynthesizer  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a fixed-size silent PCM buffer, optionally
/// failing on texts that contain a configured needle.
#[cfg(test)]
pub struct MockSynthesizer {
    samples: usize,
    fail_when_contains: Option<String>,
}

#[cfg(test)]
impl MockSynthesizer {
    /// A mock that always succeeds with `samples` silent 16-bit samples.
    pub fn ok(samples: usize) -> Self {
        Self {
            samples,
            fail_when_contains: None,
        }
    }

    /// A mock that fails only for inputs containing `needle`.
    pub fn failing_on(needle: impl Into<String>) -> Self {
        Self {
            samples: 240,
            fail_when_contains: Some(needle.into()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        if let Some(needle) = &self.fail_when_contains {
            if text.contains(needle.as_str()) {
                return Err(SynthesisError::EmptyAudio);
            }
        }
        Ok(vec![0u8; self.samples * 2])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
