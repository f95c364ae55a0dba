//! Reader achievement levels derived from the books-read counter

use serde::Serialize;

/// Books needed to reach each level, indexed by level
const LEVEL_THRESHOLDS: [u32; 6] = [0, 5, 10, 15, 20, 30];

const LEVEL_TITLES: [&str; 6] = [
    "Novice Reader",
    "Beginner Reader",
    "Word Explorer",
    "Story Adventurer",
    "Book Champion",
    "Reading Master",
];

pub const MAX_LEVEL: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Achievement {
    pub total_books_read: u32,
    pub level: u8,
    pub title: &'static str,
    /// Percent of the way from the current level to the next, one decimal
    pub next_level_progress: f64,
}

impl Achievement {
    pub fn from_books_read(total_books_read: u32) -> Self {
        let level = level_for(total_books_read);
        Self {
            total_books_read,
            level,
            title: LEVEL_TITLES[usize::from(level)],
            next_level_progress: next_level_progress(total_books_read, level),
        }
    }
}

fn level_for(books: u32) -> u8 {
    LEVEL_THRESHOLDS
        .iter()
        .rposition(|&threshold| books >= threshold)
        .map(|index| index as u8)
        .unwrap_or(0)
}

fn next_level_progress(books: u32, level: u8) -> f64 {
    if level >= MAX_LEVEL {
        return 100.0;
    }
    let previous = LEVEL_THRESHOLDS[usize::from(level)];
    let next = LEVEL_THRESHOLDS[usize::from(level) + 1];
    let ratio = f64::from(books - previous) / f64::from(next - previous) * 100.0;
    (ratio * 10.0).round() / 10.0
}
