//! Records persisted by the reading store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reading::metrics::StoryMetrics;
use crate::reading::progress::ReadingTrack;

pub const DEFAULT_GRADE: i32 = 3;
pub const DEFAULT_RATING: f64 = 4.5;

/// An authored story with its derived analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub author_name: String,
    pub content: String,
    pub grade: i32,
    pub rating: f64,
    pub is_draft: bool,
    pub word_count: u32,
    pub sentence_count: u32,
    pub total_pages: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Story {
    /// Overwrite the analytics fields from freshly computed metrics
    pub fn apply_metrics(&mut self, metrics: StoryMetrics) {
        self.word_count = metrics.word_count;
        self.sentence_count = metrics.sentence_count;
        self.total_pages = metrics.total_pages;
    }
}

/// A story about to be inserted; the store assigns id and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct NewStory {
    pub author_id: i64,
    pub title: String,
    pub author_name: String,
    pub content: String,
    pub grade: i32,
    pub is_draft: bool,
    pub metrics: StoryMetrics,
}

/// Reader-side profile of a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_id: i64,
    pub display_name: String,
    pub grade_level: i32,
    pub total_books_read: u32,
    pub words_learned: u32,
}

impl StudentProfile {
    pub fn new(student_id: i64, display_name: impl Into<String>, grade_level: i32) -> Self {
        Self {
            student_id,
            display_name: display_name.into(),
            grade_level,
            total_books_read: 0,
            words_learned: 0,
        }
    }
}

/// Kind of entry in the student activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    StoryCreate,
    StoryUpdate,
    ReadStart,
    ReadComplete,
    VocabSearch,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::StoryCreate => "STORY_CREATE",
            ActivityKind::StoryUpdate => "STORY_UPDATE",
            ActivityKind::ReadStart => "READ_START",
            ActivityKind::ReadComplete => "READ_COMPLETE",
            ActivityKind::VocabSearch => "VOCAB_SEARCH",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "STORY_CREATE" => Some(ActivityKind::StoryCreate),
            "STORY_UPDATE" => Some(ActivityKind::StoryUpdate),
            "READ_START" => Some(ActivityKind::ReadStart),
            "READ_COMPLETE" => Some(ActivityKind::ReadComplete),
            "VOCAB_SEARCH" => Some(ActivityKind::VocabSearch),
            _ => None,
        }
    }
}

/// Activity to append to the log
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub student_id: i64,
    pub kind: ActivityKind,
    pub description: String,
}

impl NewActivity {
    pub fn new(student_id: i64, kind: ActivityKind, description: impl Into<String>) -> Self {
        Self {
            student_id,
            kind,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub student_id: i64,
    pub kind: ActivityKind,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Everything a page view wants persisted, applied atomically by the store
#[derive(Debug, Clone)]
pub struct TrackUpdate {
    pub track: ReadingTrack,
    /// The track did not exist before this update
    pub started: bool,
    /// The view reached the last page while the track was not yet completed
    pub completed: bool,
    /// Used in activity descriptions
    pub story_title: String,
}

/// What the store actually did for a [`TrackUpdate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackSaveOutcome {
    /// The completed flag flipped in storage and the side effects were applied
    pub completion_recorded: bool,
}

/// An unfinished track together with the story title
#[derive(Debug, Clone, PartialEq)]
pub struct TrackWithStory {
    pub track: ReadingTrack,
    pub story_title: String,
}

/// Global lookup statistics for one word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub word: String,
    pub definition: String,
    pub search_count: u32,
    pub last_searched: DateTime<Utc>,
}

/// A word a student saved to their list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedWord {
    pub student_id: i64,
    pub word: String,
    pub definition: String,
    pub saved_at: DateTime<Utc>,
}
