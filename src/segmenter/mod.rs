//! Header-aware document segmentation.
//!
//! [`segment`] decomposes an unstructured academic document into an ordered
//! sequence of titled [`TextChunk`]s bounded by a target character size.
//! It is pure, deterministic and total: well-formed input never fails, and
//! an empty document yields an empty sequence.
//!
//! # Algorithm
//!
//! Two phases:
//!
//! 1. **Sectioning** — the document is split on blank-line boundaries into
//!    paragraphs.  Short paragraphs that start with a structural keyword
//!    (abstract, introduction, methods, …) open a new section; everything
//!    else accumulates under the current section title.  The header
//!    paragraph itself stays part of the narrated content.
//! 2. **Size-bounded chunking** — each section that exceeds the target size
//!    is split on single line breaks with a greedy accumulator.  Multi-part
//!    sections are titled `"<title> (Part <n>)"`; a section that fits in one
//!    chunk keeps its title unmodified.
//!
//! No mid-line splitting is performed: a single line longer than the target
//! becomes its own oversized chunk.

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// A paragraph longer than this is never treated as a section header, even
/// when it starts with a structural keyword.
const HEADER_MAX_CHARS: usize = 100;

/// Structural keywords that mark the start of a new section when they open
/// a short paragraph.  Matching is case-insensitive.
const HEADER_KEYWORDS: &[&str] = &[
    "abstract",
    "introduction",
    "background",
    "literature review",
    "methods",
    "methodology",
    "results",
    "discussion",
    "conclusion",
    "references",
    "appendix",
];

/// Title used for content that appears before the first recognizable header
/// (or for the whole document when no header is found).
const SENTINEL_TITLE: &str = "Start of document";

// ---------------------------------------------------------------------------
// TextChunk
// ---------------------------------------------------------------------------

/// A bounded unit of source text, ready for narration.
///
/// `text` is drawn verbatim from the document; only paragraph-boundary
/// whitespace is normalized.  Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Human-readable section label, possibly suffixed with a part number.
    pub title: String,
    /// The chunk's exact content.
    pub text: String,
}

// ---------------------------------------------------------------------------
// Internal section representation (phase 1 output)
// ---------------------------------------------------------------------------

struct Section {
    title: String,
    /// Paragraphs re-joined with blank lines.
    content: String,
}

// ---------------------------------------------------------------------------
// segment()
// ---------------------------------------------------------------------------

/// Split `document` into titled chunks of at most `target_chars` characters.
///
/// Chunk sizes are measured in Unicode scalar values, not bytes.  The only
/// exception to the bound is a single line that alone exceeds the target —
/// it is emitted as its own oversized chunk rather than split mid-line.
///
/// ```
/// use audiopaper::segmenter::segment;
///
/// let doc = "Abstract\n\nFoo bar.\n\nIntroduction\n\nBaz qux.";
/// let chunks = segment(doc, 3_500);
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[0].title, "Abstract");
/// assert_eq!(chunks[0].text, "Abstract\n\nFoo bar.");
/// ```
pub fn segment(document: &str, target_chars: usize) -> Vec<TextChunk> {
    let mut chunks = Vec::new();
    for section in split_sections(document) {
        chunk_section(&section, target_chars, &mut chunks);
    }
    chunks
}

// ---------------------------------------------------------------------------
// Phase 1 — sectioning
// ---------------------------------------------------------------------------

/// Returns `true` when `paragraph` should open a new section.
///
/// A header is a paragraph under [`HEADER_MAX_CHARS`] characters whose first
/// line starts (case-insensitively) with one of [`HEADER_KEYWORDS`].
fn is_header(paragraph: &str) -> bool {
    if paragraph.chars().count() >= HEADER_MAX_CHARS {
        return false;
    }
    let first_line = paragraph.lines().next().unwrap_or("").to_lowercase();
    HEADER_KEYWORDS.iter().any(|kw| first_line.starts_with(kw))
}

/// Strip trailing punctuation and whitespace from a header paragraph to form
/// a display title.
fn header_title(paragraph: &str) -> String {
    paragraph
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ':' | ';' | ','))
        .to_string()
}

fn split_sections(document: &str) -> Vec<Section> {
    let normalized = document.replace("\r\n", "\n").replace('\r', "\n");

    // Group lines into trimmed, non-empty paragraphs separated by blank lines.
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in normalized.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n").trim().to_string());
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n").trim().to_string());
    }

    // Scan paragraphs, opening a new section at each header.  A header's
    // title applies to all content from that header up to the next one.
    let mut sections = Vec::new();
    let mut title = SENTINEL_TITLE.to_string();
    let mut buffer: Vec<String> = Vec::new();

    for paragraph in paragraphs {
        if is_header(&paragraph) {
            if !buffer.is_empty() {
                sections.push(Section {
                    title: std::mem::replace(&mut title, header_title(&paragraph)),
                    content: buffer.join("\n\n"),
                });
                buffer.clear();
            } else {
                title = header_title(&paragraph);
            }
            // The header itself remains part of the narrated content.
            buffer.push(paragraph);
        } else {
            buffer.push(paragraph);
        }
    }

    if !buffer.is_empty() {
        sections.push(Section {
            title,
            content: buffer.join("\n\n"),
        });
    }

    sections
}

// ---------------------------------------------------------------------------
// Phase 2 — size-bounded chunking
// ---------------------------------------------------------------------------

fn chunk_section(section: &Section, target_chars: usize, out: &mut Vec<TextChunk>) {
    let content = section.content.trim();
    if content.is_empty() {
        return;
    }

    if content.chars().count() <= target_chars {
        out.push(TextChunk {
            title: section.title.clone(),
            text: content.to_string(),
        });
        return;
    }

    // Greedy line accumulation.  A flush happens when adding the next line
    // would push the buffer over the target and the buffer is non-empty.
    let mut parts: Vec<String> = Vec::new();
    let mut buffer = String::new();
    let mut buffer_chars = 0usize;

    for line in content.split('\n') {
        let line_chars = line.chars().count();
        // `+ 1` accounts for the joining newline.
        if !buffer.is_empty() && buffer_chars + 1 + line_chars > target_chars {
            parts.push(std::mem::take(&mut buffer));
            buffer_chars = 0;
        }
        if !buffer.is_empty() {
            buffer.push('\n');
            buffer_chars += 1;
        }
        buffer.push_str(line);
        buffer_chars += line_chars;
    }
    if !buffer.trim().is_empty() {
        parts.push(buffer);
    }

    // The part suffix appears only when the section split into multiple
    // parts; a single-part section keeps its title unchanged.
    if parts.len() == 1 {
        out.push(TextChunk {
            title: section.title.clone(),
            text: parts.remove(0),
        });
    } else {
        for (n, text) in parts.into_iter().enumerate() {
            out.push(TextChunk {
                title: format!("{} (Part {})", section.title, n + 1),
                text,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- basics ---

    #[test]
    fn empty_document_yields_no_chunks() {
        assert!(segment("", 3_500).is_empty());
        assert!(segment("   \n\n  \n", 3_500).is_empty());
    }

    #[test]
    fn two_headers_yield_two_titled_chunks() {
        let doc = "Abstract\n\nFoo bar.\n\nIntroduction\n\nBaz qux.";
        let chunks = segment(doc, 3_500);
        assert_eq!(
            chunks,
            vec![
                TextChunk {
                    title: "Abstract".into(),
                    text: "Abstract\n\nFoo bar.".into(),
                },
                TextChunk {
                    title: "Introduction".into(),
                    text: "Introduction\n\nBaz qux.".into(),
                },
            ]
        );
    }

    #[test]
    fn headerless_document_uses_sentinel_title() {
        let chunks = segment("Just some prose.\n\nMore prose.", 3_500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].title, "Start of document");
        assert_eq!(chunks[0].text, "Just some prose.\n\nMore prose.");
    }

    #[test]
    fn crlf_line_endings_are_normalized() {
        let doc = "Abstract\r\n\r\nFoo bar.";
        let chunks = segment(doc, 3_500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].title, "Abstract");
        assert_eq!(chunks[0].text, "Abstract\n\nFoo bar.");
    }

    // ---- header classification ---

    #[test]
    fn header_match_is_case_insensitive() {
        let chunks = segment("INTRODUCTION\n\nBody text.", 3_500);
        assert_eq!(chunks[0].title, "INTRODUCTION");
    }

    #[test]
    fn header_keeps_trailing_words_but_strips_punctuation() {
        let chunks = segment("Methods and Materials:\n\nWe did things.", 3_500);
        assert_eq!(chunks[0].title, "Methods and Materials");
        // The header paragraph itself stays in the narrated text, untouched.
        assert!(chunks[0].text.starts_with("Methods and Materials:"));
    }

    #[test]
    fn long_paragraph_starting_with_keyword_is_not_a_header() {
        let long = format!("Introduction {}", "x".repeat(120));
        let doc = format!("{long}\n\nBody.");
        let chunks = segment(&doc, 3_500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].title, "Start of document");
    }

    #[test]
    fn keyword_paragraph_just_under_limit_is_a_header() {
        // 99 characters total, starts with a keyword.
        let header = format!("Discussion {}", "y".repeat(88));
        assert_eq!(header.chars().count(), 99);
        let doc = format!("{header}\n\nBody.");
        let chunks = segment(&doc, 3_500);
        assert_eq!(chunks[0].title, header);
    }

    #[test]
    fn keyword_mid_paragraph_does_not_start_a_section() {
        let chunks = segment("See the discussion below.\n\nMore.", 3_500);
        assert_eq!(chunks[0].title, "Start of document");
    }

    #[test]
    fn content_before_first_header_gets_sentinel_section() {
        let doc = "Title of the Paper\n\nAbstract\n\nWe study things.";
        let chunks = segment(doc, 3_500);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].title, "Start of document");
        assert_eq!(chunks[0].text, "Title of the Paper");
        assert_eq!(chunks[1].title, "Abstract");
        assert_eq!(chunks[1].text, "Abstract\n\nWe study things.");
    }

    // ---- size-bounded chunking ---

    #[test]
    fn section_within_target_is_one_unsuffixed_chunk() {
        let doc = "Results\n\nline one\nline two";
        let chunks = segment(doc, 3_500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].title, "Results");
    }

    #[test]
    fn oversized_section_splits_into_numbered_parts() {
        // Three 40-char lines under one header; target 60 forces one line
        // per part once the header line is consumed.
        let line = "a".repeat(40);
        let doc = format!("Results\n\n{line}\n{line}\n{line}");
        let chunks = segment(&doc, 60);
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.title, format!("Results (Part {})", i + 1));
            assert!(chunk.text.chars().count() <= 60);
        }
    }

    #[test]
    fn first_part_carries_suffix_when_multiple_parts_exist() {
        let line = "b".repeat(50);
        let doc = format!("Appendix\n\n{line}\n{line}");
        let chunks = segment(&doc, 55);
        assert!(chunks.len() >= 2);
        assert_eq!(chunks[0].title, "Appendix (Part 1)");
    }

    #[test]
    fn three_flushes_number_parts_one_through_three() {
        let line = "c".repeat(50);
        // Header (8 chars) + blank + three long lines; target 55 gives one
        // line per flush: header joins nothing because 8+1+50 > 55.
        let doc = format!("Appendix\n\n{line}\n{line}\n{line}");
        let chunks = segment(&doc, 55);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[3].title, "Appendix (Part 4)");
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.title, format!("Appendix (Part {})", i + 1));
        }
    }

    #[test]
    fn single_line_over_target_becomes_oversized_chunk() {
        let long_line = "d".repeat(200);
        let doc = format!("Results\n\n{long_line}");
        let chunks = segment(&doc, 50);
        // Header flushes alone, then the long line becomes its own chunk.
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].text, long_line);
    }

    #[test]
    fn chunk_sizes_respect_target_except_oversized_lines() {
        let doc = "Introduction\n\n".to_string()
            + &(0..100)
                .map(|i| format!("Sentence number {i} with a bit of padding."))
                .collect::<Vec<_>>()
                .join("\n");
        let target = 200;
        for chunk in segment(&doc, target) {
            // No single line exceeds the target here, so every chunk must fit.
            assert!(chunk.text.chars().count() <= target, "{:?}", chunk.title);
        }
    }

    // ---- content preservation ---

    #[test]
    fn concatenated_chunks_reproduce_normalized_document() {
        let doc = "Preamble text.\n\nAbstract\n\nWe study X.\n\nMethods\n\nStep one.\nStep two.\n\nResults\n\nIt worked.";
        let chunks = segment(doc, 3_500);
        let rejoined = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        assert_eq!(rejoined, doc);
    }

    #[test]
    fn no_content_loss_when_sections_split() {
        let line = "e".repeat(30);
        let body = (0..10).map(|_| line.clone()).collect::<Vec<_>>().join("\n");
        let doc = format!("Discussion\n\n{body}");
        let chunks = segment(&doc, 80);
        let rejoined = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        // Within a section, parts re-join on single newlines; the blank line
        // after the header paragraph survives the split.
        assert_eq!(rejoined, format!("Discussion\n\n{body}"));
    }

    #[test]
    fn headerless_document_is_still_size_bounded() {
        let line = "f".repeat(45);
        let doc = format!("{line}\n{line}\n{line}");
        let chunks = segment(&doc, 50);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].title, "Start of document (Part 1)");
    }
}
