//! Persistence for stories, reading progress, profiles, activity and vocabulary
//!
//! The reading service talks to storage only through [`ReadingStore`]. Two
//! implementations ship with the crate: [`MemoryStore`] for tests and
//! single-process development, and [`PgStore`] backed by PostgreSQL.
//!
//! Progress writes go through [`ReadingStore::save_track`], which applies the
//! track row, the completed-flag flip, the books-read increment and the
//! activity entries as one atomic unit. The flip is conditional on the stored
//! flag, so completion side effects happen at most once per track even if two
//! writers race.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod types;

use async_trait::async_trait;

use crate::reading::progress::ReadingTrack;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::{PgConfig, PgStore};
pub use types::{
    ActivityEntry, ActivityKind, NewActivity, NewStory, SavedWord, Story, StudentProfile,
    TrackSaveOutcome, TrackUpdate, TrackWithStory, VocabularyEntry,
};

#[async_trait]
pub trait ReadingStore: Send + Sync {
    // --- stories ---

    async fn story(&self, id: i64) -> Result<Option<Story>>;

    async fn insert_story(&self, story: NewStory) -> Result<Story>;

    /// Overwrite an existing story. Returns `None` if it no longer exists.
    async fn update_story(&self, story: &Story) -> Result<Option<Story>>;

    /// Returns true if the story existed
    async fn delete_story(&self, id: i64) -> Result<bool>;

    /// Published stories, newest first, optionally restricted to one grade
    async fn published_stories(&self, grade: Option<i32>) -> Result<Vec<Story>>;

    /// Every story written by `author_id`, newest first
    async fn stories_by_author(&self, author_id: i64) -> Result<Vec<Story>>;

    // --- profiles ---

    async fn profile(&self, student_id: i64) -> Result<Option<StudentProfile>>;

    async fn upsert_profile(&self, profile: &StudentProfile) -> Result<()>;

    // --- reading progress ---

    async fn track(&self, student_id: i64, story_id: i64) -> Result<Option<ReadingTrack>>;

    /// Persist a page view atomically.
    ///
    /// Writes the track's page and percentage (page count only on insert),
    /// appends `READ_START` when `started`, and when `completed` flips the
    /// stored flag if it is still false. Only when that flip happens does the
    /// student's books-read counter go up and a `READ_COMPLETE` entry get
    /// appended.
    async fn save_track(&self, update: TrackUpdate) -> Result<TrackSaveOutcome>;

    /// Unfinished tracks of a student, most recently read first
    async fn unfinished_tracks(&self, student_id: i64) -> Result<Vec<TrackWithStory>>;

    // --- activity log ---

    async fn append_activity(&self, activity: NewActivity) -> Result<ActivityEntry>;

    /// Newest first
    async fn recent_activity(&self, student_id: i64, limit: usize) -> Result<Vec<ActivityEntry>>;

    // --- vocabulary ---

    /// Bump the search counter of `word` (lower-cased), creating it if needed
    async fn record_word_search(&self, word: &str) -> Result<VocabularyEntry>;

    async fn set_word_definition(&self, word: &str, definition: &str) -> Result<()>;

    /// Save a word to a student's list; an existing entry is returned unchanged
    async fn save_word(&self, student_id: i64, word: &str, definition: &str) -> Result<SavedWord>;

    /// Newest first
    async fn saved_words(&self, student_id: i64) -> Result<Vec<SavedWord>>;
}

/// Description used for the completion activity entry
pub(crate) fn read_complete_description(title: &str) -> String {
    format!("Finished reading '{}'", title)
}

pub(crate) fn read_start_description(title: &str) -> String {
    format!("Started reading '{}'", title)
}
