//! Text extraction collaborator seam.
//!
//! The pipeline consumes documents as plain text.  [`TextExtractor`] is the
//! narrow interface behind which the actual extraction lives; the shipped
//! [`PlainTextExtractor`] handles pasted text and UTF-8 `text/plain`
//! payloads, while richer formats (PDF, DOCX, …) can be supplied by the
//! surrounding layer as another implementation.
//!
//! Extraction failure is document-fatal: the orchestrator aborts the run
//! before any segment is created.

use thiserror::Error;

// ---------------------------------------------------------------------------
// DocumentPayload
// ---------------------------------------------------------------------------

/// A document as delivered by the intake layer.
#[derive(Debug, Clone)]
pub enum DocumentPayload {
    /// Text pasted or already decoded by the caller.
    PlainText(String),
    /// Raw file bytes plus their MIME type.
    Binary { bytes: Vec<u8>, mime: String },
}

// ---------------------------------------------------------------------------
// ExtractError
// ---------------------------------------------------------------------------

/// Errors from the extraction collaborator.  All are document-fatal.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The payload's bytes are not valid UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    /// No extractor is available for this MIME type.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// The document contains no text at all.
    #[error("document is empty")]
    Empty,
}

// ---------------------------------------------------------------------------
// TextExtractor trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for document text extraction.
pub trait TextExtractor: Send + Sync {
    /// Extract the full plain text of `payload`.
    fn extract(&self, payload: &DocumentPayload) -> Result<String, ExtractError>;
}

// ---------------------------------------------------------------------------
// PlainTextExtractor
// ---------------------------------------------------------------------------

/// Extractor for pasted text and UTF-8 `text/plain` payloads.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, payload: &DocumentPayload) -> Result<String, ExtractError> {
        let text = match payload {
            DocumentPayload::PlainText(text) => text.clone(),
            DocumentPayload::Binary { bytes, mime } => {
                if mime != "text/plain" {
                    return Err(ExtractError::UnsupportedFormat(mime.clone()));
                }
                String::from_utf8(bytes.clone())
                    .map_err(|e| ExtractError::InvalidEncoding(e.to_string()))?
            }
        };

        if text.trim().is_empty() {
            return Err(ExtractError::Empty);
        }
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// FailingExtractor  (test-only)
// ---------------------------------------------------------------------------

/// A test double whose extraction always fails with the given error.
#[cfg(test)]
pub struct FailingExtractor(pub ExtractError);

#[cfg(test)]
impl TextExtractor for FailingExtractor {
    fn extract(&self, _payload: &DocumentPayload) -> Result<String, ExtractError> {
        Err(self.0.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
