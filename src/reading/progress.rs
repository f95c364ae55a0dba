//! Per-student reading progress
//!
//! A [`ReadingTrack`] follows one student through one story. Its state
//! machine has two states, in progress and completed, and the only transition
//! is in progress → completed when the last page is reached. Completed is
//! terminal: going back to an earlier page lowers the percentage again but the
//! completed flag stays set, so the completion side effects (books-read
//! counter, activity log) can never fire twice for the same track.
//!
//! `total_pages` is a snapshot taken when the track starts. Page positions
//! and the completion check follow the story as it is now, so an edited
//! story completes on its real last page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reading progress of one student through one story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingTrack {
    pub student_id: i64,
    pub story_id: i64,
    pub current_page: u32,
    /// Page count of the story when the student started reading
    pub total_pages: u32,
    /// 0.0 to 100.0; `current_page / total_pages` capped at 100, or 100 on
    /// the story's last page
    pub completion_percentage: f64,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub last_read_at: DateTime<Utc>,
}

/// State of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackState {
    InProgress,
    Completed,
}

/// Emitted exactly once per track, on the in progress → completed transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion;

/// Percentage of `current_page` over `total_pages`.
pub fn completion_percentage(current_page: u32, total_pages: u32) -> f64 {
    let total = total_pages.max(1);
    f64::from(current_page.min(total)) / f64::from(total) * 100.0
}

impl ReadingTrack {
    /// Open a new track, snapshotting the story's current page count.
    pub fn start(student_id: i64, story_id: i64, total_pages: u32, now: DateTime<Utc>) -> Self {
        Self {
            student_id,
            story_id,
            current_page: 1,
            total_pages: total_pages.max(1),
            completion_percentage: 0.0,
            is_completed: false,
            created_at: now,
            last_read_at: now,
        }
    }

    pub fn state(&self) -> TrackState {
        if self.is_completed {
            TrackState::Completed
        } else {
            TrackState::InProgress
        }
    }

    /// Record a view of `page` of a story that currently has `last_page`
    /// pages.
    ///
    /// The page is clamped to the story. Returns `Some(Completion)` only when
    /// this view reaches the last page and completes the track for the first
    /// time.
    pub fn view_page(
        &mut self,
        page: u32,
        last_page: u32,
        now: DateTime<Utc>,
    ) -> Option<Completion> {
        let last_page = last_page.max(1);
        self.current_page = page.clamp(1, last_page);
        self.last_read_at = now;

        if self.current_page == last_page {
            self.completion_percentage = 100.0;
            self.complete()
        } else {
            self.completion_percentage = completion_percentage(self.current_page, self.total_pages);
            None
        }
    }

    /// Jump straight to the end of a story that currently has `last_page`
    /// pages.
    pub fn finish(&mut self, last_page: u32, now: DateTime<Utc>) -> Option<Completion> {
        self.current_page = last_page.max(1);
        self.completion_percentage = 100.0;
        self.last_read_at = now;
        self.complete()
    }

    fn complete(&mut self) -> Option<Completion> {
        if self.is_completed {
            return None;
        }
        self.is_completed = true;
        Some(Completion)
    }
}
