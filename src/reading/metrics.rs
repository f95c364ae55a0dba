//! Story text analytics
//!
//! Word, sentence and page counts are derived from the story body by a pure
//! function that callers run before persisting a story. Storage never touches
//! these fields on its own.

use once_cell::sync::Lazy;
use regex::Regex;

use super::paginator;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static SENTENCE_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("valid sentence regex"));

/// Derived counts for a story body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryMetrics {
    pub word_count: u32,
    pub sentence_count: u32,
    pub total_pages: u32,
}

impl StoryMetrics {
    /// Compute the metrics of a (possibly HTML) story body.
    pub fn from_content(content: &str) -> Self {
        let text = plain_text(content);
        let word_count = text.split_whitespace().count();
        let sentence_count = SENTENCE_END_RE
            .split(&text)
            .filter(|segment| !segment.trim().is_empty())
            .count();

        Self {
            word_count: saturating_u32(word_count),
            sentence_count: saturating_u32(sentence_count),
            total_pages: paginator::total_pages(word_count),
        }
    }
}

/// Strip markup from an editor body, leaving readable text.
///
/// Tags become spaces so that adjacent block elements never glue words
/// together; a handful of common entities are decoded.
pub fn plain_text(content: &str) -> String {
    let stripped = TAG_RE.replace_all(content, " ");
    stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
