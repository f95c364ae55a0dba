//! Word-based story pagination
//!
//! A story is read one page at a time, where a page is a fixed number of
//! whitespace-separated words. Requested page numbers are clamped into the
//! valid range rather than rejected, so a client holding a stale page number
//! (for example after the story was shortened) still gets a sensible page.

use serde::Serialize;

/// Number of words shown on one reading page
pub const WORDS_PER_PAGE: usize = 150;

/// One page of a story, ready to be rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Words of this page joined by single spaces
    pub content: String,
    /// Page number after clamping, always in `1..=total_pages`
    pub current_page: u32,
    /// Total number of pages, never less than 1
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
    /// Words left after the end of this page
    pub words_remaining: usize,
}

/// Total pages needed for `word_count` words.
///
/// An empty story still has one (empty) page.
pub fn total_pages(word_count: usize) -> u32 {
    let pages = word_count.div_ceil(WORDS_PER_PAGE).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Clamp a requested page number into `1..=total_pages`.
pub fn clamp_page(requested: i64, total_pages: u32) -> u32 {
    let upper = i64::from(total_pages.max(1));
    // The clamped value is within u32 range by construction
    requested.clamp(1, upper) as u32
}

/// Parse a raw `page` query value; anything missing or non-numeric is page 1.
pub fn parse_page_param(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(1)
}

/// Slice `text` into the requested page.
pub fn paginate(text: &str, requested_page: i64) -> Page {
    let words: Vec<&str> = text.split_whitespace().collect();
    let total = total_pages(words.len());
    let current = clamp_page(requested_page, total);

    let start = (current as usize - 1) * WORDS_PER_PAGE;
    let end = start + WORDS_PER_PAGE;
    let content = words
        .get(start..end.min(words.len()))
        .map(|slice| slice.join(" "))
        .unwrap_or_default();

    Page {
        content,
        current_page: current,
        total_pages: total,
        has_next: current < total,
        has_previous: current > 1,
        words_remaining: words.len().saturating_sub(end),
    }
}
