//! Document source loading and text extraction.
//!
//! A source is either a local file or an http(s) URL. Raw bytes live only
//! in memory, so a failed load leaves no artifacts behind. Cleanup is
//! careful to preserve blank-line paragraph boundaries, which the
//! splitter depends on.

use refdesk_core::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the reference document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Local file path
    Path(PathBuf),
    /// http(s) URL
    Url(String),
}

impl DocumentSource {
    /// Parse a configured source string into a path or URL.
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            Self::Url(source.to_string())
        } else {
            Self::Path(PathBuf::from(source))
        }
    }

    /// Describe the source for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => format!("{:?}", path),
            Self::Url(url) => url.clone(),
        }
    }

    /// Load and clean the document text.
    ///
    /// Fails with `Ingestion` if the source is unreachable or unparsable.
    pub async fn load(&self, timeout: Duration) -> AppResult<String> {
        let (raw, kind) = match self {
            Self::Path(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    AppError::Ingestion(format!("Failed to read document {:?}: {}", path, e))
                })?;
                (raw, ContentKind::from_path(path))
            }
            Self::Url(url) => {
                let client = reqwest::Client::builder()
                    .timeout(timeout)
                    .build()
                    .map_err(|e| AppError::Ingestion(format!("Failed to build HTTP client: {}", e)))?;

                let response = client.get(url).send().await.map_err(|e| {
                    AppError::Ingestion(format!("Failed to fetch document from {}: {}", url, e))
                })?;

                if !response.status().is_success() {
                    return Err(AppError::Ingestion(format!(
                        "Failed to fetch document from {}: status {}",
                        url,
                        response.status()
                    )));
                }

                let kind = ContentKind::from_url(url);
                let raw = response.text().await.map_err(|e| {
                    AppError::Ingestion(format!("Failed to read document body: {}", e))
                })?;
                (raw, kind)
            }
        };

        if raw.contains('\0') {
            return Err(AppError::Ingestion(
                "Document appears to be binary, not text".to_string(),
            ));
        }

        let cleaned = match kind {
            ContentKind::Markdown => clean_markdown(&raw),
            ContentKind::Html => clean_html(&raw),
            ContentKind::PlainText => normalize_newlines(&raw),
        };

        tracing::debug!(
            source = %self.describe(),
            bytes = cleaned.len(),
            "Loaded document"
        );

        Ok(cleaned)
    }
}

/// Content kind classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentKind {
    Markdown,
    Html,
    PlainText,
}

impl ContentKind {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("md") | Some("markdown") => Self::Markdown,
            Some("html") | Some("htm") => Self::Html,
            _ => Self::PlainText,
        }
    }

    fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        match path.rsplit('.').next() {
            Some("md") | Some("markdown") => Self::Markdown,
            Some("html") | Some("htm") => Self::Html,
            _ => Self::PlainText,
        }
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Strip markdown syntax while keeping paragraph structure intact.
///
/// Heading markers and code fences are removed; blank lines pass through
/// untouched so paragraph breaks survive.
fn clean_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in normalize_newlines(text).lines() {
        let trimmed = line.trim_start_matches('#').trim();

        // Drop horizontal rules and code fences, keep their line breaks
        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            result.push('\n');
            continue;
        }

        result.push_str(trimmed);
        result.push('\n');
    }

    result.trim().to_string()
}

/// Strip HTML tags, turning block-level boundaries into paragraph breaks.
fn clean_html(text: &str) -> String {
    // Turn paragraph-ish closers into blank lines before stripping tags
    let mut with_breaks = String::with_capacity(text.len());
    let mut rest = 0;
    for (i, _) in text.match_indices('<') {
        with_breaks.push_str(&text[rest..i]);
        let tail = &text[i..];
        if starts_with_ignore_case(tail, "</p>")
            || starts_with_ignore_case(tail, "<br")
            || starts_with_ignore_case(tail, "</div>")
            || starts_with_ignore_case(tail, "</h")
            || starts_with_ignore_case(tail, "</li>")
        {
            with_breaks.push_str("\n\n");
        }
        rest = i;
    }
    with_breaks.push_str(&text[rest..]);

    let mut result = String::with_capacity(with_breaks.len());
    let mut in_tag = false;
    for ch in with_breaks.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    // Collapse whitespace within paragraphs, keep the breaks
    result
        .split("\n\n")
        .map(|para| para.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|para| !para.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}
