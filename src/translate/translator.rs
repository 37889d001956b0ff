//! Core `Translator` trait and `ApiTranslator` implementation.
//!
//! `ApiTranslator` calls any OpenAI-compatible `/v1/chat/completions`
//! endpoint — OpenAI, Groq, Ollama (OpenAI mode), LM Studio, vLLM, etc.
//! All connection details come from [`TranslatorConfig`]; nothing is
//! hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{NarrationMode, TranslatorConfig};
use crate::translate::prompt::PromptBuilder;

// ---------------------------------------------------------------------------
// TranslateError
// ---------------------------------------------------------------------------

/// Errors that can occur during a translation call.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("translation request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse translation response: {0}")]
    Parse(String),

    /// The endpoint returned a response with no usable text content.
    #[error("translation returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for TranslateError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranslateError::Timeout
        } else {
            TranslateError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Translator trait
// ---------------------------------------------------------------------------

/// Async trait for per-segment translation / condensation.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn Translator>`).
#[async_trait]
pub trait Translator: Send + Sync {
    /// Produce the narration text for `text` in the given mode.
    async fn translate(&self, text: &str, mode: NarrationMode)
        -> Result<String, TranslateError>;
}

// ---------------------------------------------------------------------------
// ApiTranslator
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// All connection details (`base_url`, `api_key`, `model`) come exclusively
/// from the [`TranslatorConfig`] passed to [`ApiTranslator::from_config`].
pub struct ApiTranslator {
    client: reqwest::Client,
    config: TranslatorConfig,
    prompt_builder: PromptBuilder,
}

impl ApiTranslator {
    /// Build an `ApiTranslator` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &TranslatorConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let prompt_builder = PromptBuilder::new(&config.language);

        Self {
            client,
            config: config.clone(),
            prompt_builder,
        }
    }
}

#[async_trait]
impl Translator for ApiTranslator {
    /// Send `text` to the configured chat-completions endpoint.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when
    /// `config.api_key` is `Some(key)` and `key` is non-empty — safe for
    /// local providers that require no authentication.
    async fn translate(
        &self,
        text: &str,
        mode: NarrationMode,
    ) -> Result<String, TranslateError> {
        let (system_msg, user_msg) = self.prompt_builder.build_chat(text, mode);

        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": system_msg },
                { "role": "user",   "content": user_msg   }
            ],
            "stream":      false,
            "temperature": self.config.temperature
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranslateError::Parse(e.to_string()))?;

        let narration = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(TranslateError::EmptyResponse)?
            .trim()
            .to_string();

        if narration.is_empty() {
            return Err(TranslateError::EmptyResponse);
        }

        Ok(narration)
    }
}

// ---------------------------------------------------------------------------
// MockTranslator  (test-only)
// ---------------------------------------------------------------------------

/// A test double that echoes its input with a marker prefix, optionally
/// failing on texts that contain a configured needle.
#[cfg(test)]
pub struct MockTranslator {
    fail_when_contains: Option<String>,
}

#[cfg(test)]
impl MockTranslator {
    /// A mock that always succeeds, returning `"narrated: <text>"`.
    pub fn ok() -> Self {
        Self {
            fail_when_contains: None,
        }
    }

    /// A mock that fails only for inputs containing `needle`.
    pub fn failing_on(needle: impl Into<String>) -> Self {
        Self {
            fail_when_contains: Some(needle.into()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _mode: NarrationMode,
    ) -> Result<String, TranslateError> {
        if let Some(needle) = &self.fail_when_contains {
            if text.contains(needle.as_str()) {
                return Err(TranslateError::EmptyResponse);
            }
        }
        Ok(format!("narrated: {text}"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
