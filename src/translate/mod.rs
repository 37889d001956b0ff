//! Translation / condensation collaborator.
//!
//! Every segment's source text goes through one translation call before
//! synthesis.  In **literal** mode the call produces a faithful spoken-style
//! rendering of the chunk; in **podcast** mode it produces a condensed
//! conversational retelling.
//!
//! This module provides:
//! * [`Translator`] — async trait implemented by all translation backends.
//! * [`ApiTranslator`] — OpenAI-compatible `/v1/chat/completions` backend.
//! * [`PromptBuilder`] — builds per-mode (system, user) message pairs.
//! * [`TranslateError`] — error variants for translation calls.
//!
//! Translation failures are segment-local: the orchestrator records them on
//! the failing segment and moves on.

pub mod prompt;
pub mod translator;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use prompt::PromptBuilder;
pub use translator::{ApiTranslator, TranslateError, Translator};

#[cfg(test)]
pub use translator::MockTranslator;
