//! Prompt builder for narration-oriented translation.
//!
//! [`PromptBuilder`] constructs the `(system, user)` message pair sent to a
//! chat-completions endpoint.  The system instruction depends on the
//! narration mode: literal narration preserves every statement of the
//! chunk, podcast narration condenses it into a conversational retelling.
//! Both instruct the model to reply with narration text only, since the
//! output is fed straight into speech synthesis.

use crate::config::NarrationMode;

// ---------------------------------------------------------------------------
// System instructions
// ---------------------------------------------------------------------------

/// Literal mode — faithful, complete, read-aloud rendering.
const SYSTEM_INSTRUCTION_LITERAL: &str = "\
You are a narration assistant that prepares academic text for text-to-speech.
Task: Render the given passage in {language}, faithfully and completely, as
natural spoken prose.

Rules:
1. Preserve every statement, number, and citation author; omit nothing.
2. Expand abbreviations, symbols, and inline math into speakable words.
3. Do not add commentary, headings, or formatting of any kind.
4. Reply with ONLY the narration text.";

/// Podcast mode — condensed conversational retelling.
const SYSTEM_INSTRUCTION_PODCAST: &str = "\
You are a narration assistant that turns academic text into a short podcast
segment in {language}.
Task: Retell the given passage conversationally, keeping the key findings
and their significance while dropping boilerplate and repetition.

Rules:
1. Keep the essential claims, numbers, and conclusions accurate.
2. Aim for roughly a third of the original length.
3. Use plain spoken language; no headings, lists, or formatting.
4. Reply with ONLY the narration text.";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds per-mode chat prompts for the translation collaborator.
///
/// # Example
/// ```rust
/// use audiopaper::config::NarrationMode;
/// use audiopaper::translate::PromptBuilder;
///
/// let builder = PromptBuilder::new("English");
/// let (system, user) = builder.build_chat("The results show…", NarrationMode::Literal);
/// assert!(system.contains("English"));
/// assert_eq!(user, "The results show…");
/// ```
pub struct PromptBuilder {
    language: String,
}

impl PromptBuilder {
    /// Create a builder targeting `language` (a human-readable name such as
    /// `"English"` — it is interpolated into the instruction text).
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }

    /// Build the `(system, user)` pair for one chunk in the given mode.
    pub fn build_chat(&self, text: &str, mode: NarrationMode) -> (String, String) {
        let template = match mode {
            NarrationMode::Literal => SYSTEM_INSTRUCTION_LITERAL,
            NarrationMode::Podcast => SYSTEM_INSTRUCTION_PODCAST,
        };
        let system = template.replace("{language}", &self.language);
        (system, text.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
