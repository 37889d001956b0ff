//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// NarrationMode
// ---------------------------------------------------------------------------

/// Selects how a document is rendered into speech.
///
/// | Variant | Output                                              |
/// |---------|-----------------------------------------------------|
/// | Literal | Faithful segment-by-segment narration               |
/// | Podcast | Condensed conversational retelling of each segment  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrationMode {
    /// Narrate every chunk completely, in document order.
    Literal,
    /// Condense each chunk to roughly a third of its length.
    Podcast,
}

impl Default for NarrationMode {
    fn default() -> Self {
        Self::Literal
    }
}

impl std::fmt::Display for NarrationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NarrationMode::Literal => write!(f, "literal"),
            NarrationMode::Podcast => write!(f, "podcast"),
        }
    }
}

// ---------------------------------------------------------------------------
// TranslatorConfig
// ---------------------------------------------------------------------------

/// Settings for the translation / condensation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Base URL of an OpenAI-compatible API endpoint.
    pub base_url: String,
    /// API key — `None` for local providers that need no authentication.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"gpt-4o-mini"`).
    pub model: String,
    /// Target narration language, as a human-readable name used in the
    /// prompt (e.g. `"English"`).
    pub language: String,
    /// Sampling temperature (0.0 – 1.0).  Lower = more deterministic.
    pub temperature: f32,
    /// Maximum seconds to wait for a translation response.
    pub timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "gpt-4o-mini".into(),
            language: "English".into(),
            temperature: 0.3,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-synthesis collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Base URL of an OpenAI-compatible `/v1/audio/speech` endpoint.
    pub base_url: String,
    /// API key — `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier (e.g. `"gpt-4o-mini-tts"`).
    pub model: String,
    /// Voice name passed to the endpoint.
    pub voice: String,
    /// Maximum seconds to wait for one segment's audio.  Synthesis of a
    /// full chunk is slow, so this is longer than the translator timeout.
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "gpt-4o-mini-tts".into(),
            voice: "alloy".into(),
            timeout_secs: 120,
        }
    }
}

// ---------------------------------------------------------------------------
// SegmenterConfig
// ---------------------------------------------------------------------------

/// Settings for document segmentation and intake limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Target chunk size in characters.  A chunk may exceed this only when
    /// a single line alone is longer.
    pub target_chars: usize,
    /// Safety ceiling on extracted text; longer documents are truncated to
    /// this many characters (with a logged warning) before segmentation.
    pub max_document_chars: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            target_chars: 3_500,
            max_document_chars: 50_000,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use audiopaper::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Selected narration mode.
    pub mode: NarrationMode,
    /// Translation / condensation collaborator settings.
    pub translator: TranslatorConfig,
    /// Speech-synthesis collaborator settings.
    pub tts: TtsConfig,
    /// Segmentation and intake limits.
    pub segmenter: SegmenterConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
