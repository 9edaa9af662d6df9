//! Paragraph-boundary text splitting.

/// A paragraph candidate before embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphCandidate {
    /// Paragraph ordinal in the source document (pre-filter), the chunk's
    /// stable origin reference.
    pub position: u32,

    /// Paragraph text, trimmed.
    pub text: String,
}

/// Split text strictly on blank-line-delimited paragraph breaks.
///
/// Whitespace-only paragraphs (from consecutive blank lines) are dropped
/// rather than indexed as empty chunks; positions still count them so the
/// origin reference stays stable.
pub fn split_paragraphs(text: &str) -> Vec<ParagraphCandidate> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .enumerate()
        .filter_map(|(i, paragraph)| {
            let trimmed = paragraph.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(ParagraphCandidate {
                    position: i as u32,
                    text: trimmed.to_string(),
                })
            }
        })
        .collect()
}
