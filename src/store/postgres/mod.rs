//! PostgreSQL-backed [`ReadingStore`]
//!
//! Tables are created on [`PgStore::connect`] from the embedded `schema.sql`.
//! `save_track` runs inside an explicit transaction and completes a track
//! with `UPDATE ... WHERE NOT is_completed`, so only the writer whose update
//! matched a row applies the completion side effects.

pub mod connection;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{Object, Pool};
use tokio_postgres::Row;
use tracing::{debug, warn};
use uuid::Uuid;

pub use connection::PgConfig;

use super::{
    read_complete_description, read_start_description, ActivityEntry, ActivityKind, NewActivity,
    NewStory, ReadingStore, Result, SavedWord, Story, StoreError, StudentProfile,
    TrackSaveOutcome, TrackUpdate, TrackWithStory, VocabularyEntry,
};
use crate::reading::progress::ReadingTrack;

const SCHEMA: &str = include_str!("schema.sql");

const STORY_COLUMNS: &str = "id, author_id, title, author_name, content, grade, rating, \
    is_draft, word_count, sentence_count, total_pages, created_at, updated_at";

const TRACK_COLUMNS: &str = "student_id, story_id, current_page, total_pages, \
    completion_percentage, is_completed, created_at, last_read_at";

#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Build a pool, check connectivity and create missing tables.
    pub async fn connect(config: PgConfig) -> Result<Self> {
        let pool = config.build_pool()?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        let conn = self.pool.get().await?;
        conn.batch_execute(SCHEMA).await?;
        debug!("reading store schema ready");
        Ok(())
    }
}

fn count(row: &Row, column: &str) -> Result<u32> {
    let value: i32 = row.try_get(column)?;
    u32::try_from(value).map_err(|_| StoreError::CorruptRow(format!("{} = {}", column, value)))
}

fn to_sql_count(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn story_from_row(row: &Row) -> Result<Story> {
    Ok(Story {
        id: row.try_get("id")?,
        author_id: row.try_get("author_id")?,
        title: row.try_get("title")?,
        author_name: row.try_get("author_name")?,
        content: row.try_get("content")?,
        grade: row.try_get("grade")?,
        rating: row.try_get("rating")?,
        is_draft: row.try_get("is_draft")?,
        word_count: count(row, "word_count")?,
        sentence_count: count(row, "sentence_count")?,
        total_pages: count(row, "total_pages")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn track_from_row(row: &Row) -> Result<ReadingTrack> {
    Ok(ReadingTrack {
        student_id: row.try_get("student_id")?,
        story_id: row.try_get("story_id")?,
        current_page: count(row, "current_page")?,
        total_pages: count(row, "total_pages")?,
        completion_percentage: row.try_get("completion_percentage")?,
        is_completed: row.try_get("is_completed")?,
        created_at: row.try_get("created_at")?,
        last_read_at: row.try_get("last_read_at")?,
    })
}

fn profile_from_row(row: &Row) -> Result<StudentProfile> {
    Ok(StudentProfile {
        student_id: row.try_get("student_id")?,
        display_name: row.try_get("display_name")?,
        grade_level: row.try_get("grade_level")?,
        total_books_read: count(row, "total_books_read")?,
        words_learned: count(row, "words_learned")?,
    })
}

fn activity_from_row(row: &Row) -> Result<ActivityEntry> {
    let kind: String = row.try_get("kind")?;
    Ok(ActivityEntry {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        kind: ActivityKind::parse(&kind)
            .ok_or_else(|| StoreError::CorruptRow(format!("activity kind '{}'", kind)))?,
        description: row.try_get("description")?,
        timestamp: row.try_get("created_at")?,
    })
}

fn vocabulary_from_row(row: &Row) -> Result<VocabularyEntry> {
    Ok(VocabularyEntry {
        word: row.try_get("word")?,
        definition: row.try_get("definition")?,
        search_count: count(row, "search_count")?,
        last_searched: row.try_get("last_searched")?,
    })
}

fn saved_word_from_row(row: &Row) -> Result<SavedWord> {
    Ok(SavedWord {
        student_id: row.try_get("student_id")?,
        word: row.try_get("word")?,
        definition: row.try_get("definition")?,
        saved_at: row.try_get("saved_at")?,
    })
}

async fn insert_activity(conn: &Object, activity: NewActivity) -> Result<ActivityEntry> {
    let id = Uuid::new_v4();
    let row = conn
        .query_one(
            "INSERT INTO activities (id, student_id, kind, description) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, student_id, kind, description, created_at",
            &[
                &id,
                &activity.student_id,
                &activity.kind.as_str(),
                &activity.description,
            ],
        )
        .await?;
    activity_from_row(&row)
}

/// Body of `save_track`; the caller owns BEGIN/COMMIT.
async fn save_track_in_transaction(conn: &Object, update: TrackUpdate) -> Result<TrackSaveOutcome> {
    let TrackUpdate {
        track,
        started,
        completed,
        story_title,
    } = update;

    conn.execute(
        "INSERT INTO reading_tracks \
             (student_id, story_id, current_page, total_pages, completion_percentage, \
              is_completed, created_at, last_read_at) \
         VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7) \
         ON CONFLICT (student_id, story_id) DO UPDATE SET \
             current_page = EXCLUDED.current_page, \
             completion_percentage = EXCLUDED.completion_percentage, \
             last_read_at = EXCLUDED.last_read_at",
        &[
            &track.student_id,
            &track.story_id,
            &to_sql_count(track.current_page),
            &to_sql_count(track.total_pages),
            &track.completion_percentage,
            &track.created_at,
            &track.last_read_at,
        ],
    )
    .await?;

    if started {
        insert_activity(
            conn,
            NewActivity::new(
                track.student_id,
                ActivityKind::ReadStart,
                read_start_description(&story_title),
            ),
        )
        .await?;
    }

    let mut outcome = TrackSaveOutcome::default();
    if completed {
        let flipped = conn
            .execute(
                "UPDATE reading_tracks SET is_completed = TRUE \
                 WHERE student_id = $1 AND story_id = $2 AND NOT is_completed",
                &[&track.student_id, &track.story_id],
            )
            .await?;
        outcome.completion_recorded = flipped == 1;
    }

    if outcome.completion_recorded {
        conn.execute(
            "UPDATE student_profiles SET total_books_read = total_books_read + 1 \
             WHERE student_id = $1",
            &[&track.student_id],
        )
        .await?;
        insert_activity(
            conn,
            NewActivity::new(
                track.student_id,
                ActivityKind::ReadComplete,
                read_complete_description(&story_title),
            ),
        )
        .await?;
    }

    Ok(outcome)
}

#[async_trait]
impl ReadingStore for PgStore {
    async fn story(&self, id: i64) -> Result<Option<Story>> {
        let conn = self.pool.get().await?;
        let sql = format!("SELECT {} FROM stories WHERE id = $1", STORY_COLUMNS);
        conn.query_opt(&sql, &[&id])
            .await?
            .map(|row| story_from_row(&row))
            .transpose()
    }

    async fn insert_story(&self, story: NewStory) -> Result<Story> {
        let conn = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO stories \
                 (author_id, title, author_name, content, grade, rating, is_draft, \
                  word_count, sentence_count, total_pages) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {}",
            STORY_COLUMNS
        );
        let row = conn
            .query_one(
                &sql,
                &[
                    &story.author_id,
                    &story.title,
                    &story.author_name,
                    &story.content,
                    &story.grade,
                    &super::types::DEFAULT_RATING,
                    &story.is_draft,
                    &to_sql_count(story.metrics.word_count),
                    &to_sql_count(story.metrics.sentence_count),
                    &to_sql_count(story.metrics.total_pages),
                ],
            )
            .await?;
        story_from_row(&row)
    }

    async fn update_story(&self, story: &Story) -> Result<Option<Story>> {
        let conn = self.pool.get().await?;
        let sql = format!(
            "UPDATE stories SET \
                 title = $2, author_name = $3, content = $4, grade = $5, rating = $6, \
                 is_draft = $7, word_count = $8, sentence_count = $9, total_pages = $10, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {}",
            STORY_COLUMNS
        );
        conn.query_opt(
            &sql,
            &[
                &story.id,
                &story.title,
                &story.author_name,
                &story.content,
                &story.grade,
                &story.rating,
                &story.is_draft,
                &to_sql_count(story.word_count),
                &to_sql_count(story.sentence_count),
                &to_sql_count(story.total_pages),
            ],
        )
        .await?
        .map(|row| story_from_row(&row))
        .transpose()
    }

    async fn delete_story(&self, id: i64) -> Result<bool> {
        let conn = self.pool.get().await?;
        let deleted = conn.execute("DELETE FROM stories WHERE id = $1", &[&id]).await?;
        Ok(deleted > 0)
    }

    async fn published_stories(&self, grade: Option<i32>) -> Result<Vec<Story>> {
        let conn = self.pool.get().await?;
        let sql = format!(
            "SELECT {} FROM stories \
             WHERE NOT is_draft AND ($1::INTEGER IS NULL OR grade = $1) \
             ORDER BY created_at DESC, id DESC",
            STORY_COLUMNS
        );
        let rows = conn.query(&sql, &[&grade]).await?;
        rows.iter().map(story_from_row).collect()
    }

    async fn stories_by_author(&self, author_id: i64) -> Result<Vec<Story>> {
        let conn = self.pool.get().await?;
        let sql = format!(
            "SELECT {} FROM stories WHERE author_id = $1 ORDER BY created_at DESC, id DESC",
            STORY_COLUMNS
        );
        let rows = conn.query(&sql, &[&author_id]).await?;
        rows.iter().map(story_from_row).collect()
    }

    async fn profile(&self, student_id: i64) -> Result<Option<StudentProfile>> {
        let conn = self.pool.get().await?;
        conn.query_opt(
            "SELECT student_id, display_name, grade_level, total_books_read, words_learned \
             FROM student_profiles WHERE student_id = $1",
            &[&student_id],
        )
        .await?
        .map(|row| profile_from_row(&row))
        .transpose()
    }

    async fn upsert_profile(&self, profile: &StudentProfile) -> Result<()> {
        let conn = self.pool.get().await?;
        conn.execute(
            "INSERT INTO student_profiles \
                 (student_id, display_name, grade_level, total_books_read, words_learned) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (student_id) DO UPDATE SET \
                 display_name = EXCLUDED.display_name, \
                 grade_level = EXCLUDED.grade_level, \
                 total_books_read = EXCLUDED.total_books_read, \
                 words_learned = EXCLUDED.words_learned",
            &[
                &profile.student_id,
                &profile.display_name,
                &profile.grade_level,
                &to_sql_count(profile.total_books_read),
                &to_sql_count(profile.words_learned),
            ],
        )
        .await?;
        Ok(())
    }

    async fn track(&self, student_id: i64, story_id: i64) -> Result<Option<ReadingTrack>> {
        let conn = self.pool.get().await?;
        let sql = format!(
            "SELECT {} FROM reading_tracks WHERE student_id = $1 AND story_id = $2",
            TRACK_COLUMNS
        );
        conn.query_opt(&sql, &[&student_id, &story_id])
            .await?
            .map(|row| track_from_row(&row))
            .transpose()
    }

    async fn save_track(&self, update: TrackUpdate) -> Result<TrackSaveOutcome> {
        let conn = self.pool.get().await?;
        conn.batch_execute("BEGIN").await?;

        match save_track_in_transaction(&conn, update).await {
            Ok(outcome) => {
                conn.batch_execute("COMMIT").await?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback) = conn.batch_execute("ROLLBACK").await {
                    warn!(error = %rollback, "rollback after failed track save also failed");
                }
                Err(e)
            }
        }
    }

    async fn unfinished_tracks(&self, student_id: i64) -> Result<Vec<TrackWithStory>> {
        let conn = self.pool.get().await?;
        let rows = conn
            .query(
                "SELECT t.student_id, t.story_id, t.current_page, t.total_pages, \
                        t.completion_percentage, t.is_completed, t.created_at, t.last_read_at, \
                        s.title AS story_title \
                 FROM reading_tracks t JOIN stories s ON s.id = t.story_id \
                 WHERE t.student_id = $1 AND NOT t.is_completed \
                 ORDER BY t.last_read_at DESC",
                &[&student_id],
            )
            .await?;
        rows.iter()
            .map(|row| {
                Ok(TrackWithStory {
                    track: track_from_row(row)?,
                    story_title: row.try_get("story_title")?,
                })
            })
            .collect()
    }

    async fn append_activity(&self, activity: NewActivity) -> Result<ActivityEntry> {
        let conn = self.pool.get().await?;
        insert_activity(&conn, activity).await
    }

    async fn recent_activity(&self, student_id: i64, limit: usize) -> Result<Vec<ActivityEntry>> {
        let conn = self.pool.get().await?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = conn
            .query(
                "SELECT id, student_id, kind, description, created_at FROM activities \
                 WHERE student_id = $1 ORDER BY seq DESC LIMIT $2",
                &[&student_id, &limit],
            )
            .await?;
        rows.iter().map(activity_from_row).collect()
    }

    async fn record_word_search(&self, word: &str) -> Result<VocabularyEntry> {
        let conn = self.pool.get().await?;
        let now: DateTime<Utc> = Utc::now();
        let row = conn
            .query_one(
                "INSERT INTO vocabulary (word, definition, search_count, last_searched) \
                 VALUES ($1, '', 1, $2) \
                 ON CONFLICT (word) DO UPDATE SET \
                     search_count = vocabulary.search_count + 1, \
                     last_searched = EXCLUDED.last_searched \
                 RETURNING word, definition, search_count, last_searched",
                &[&word.to_lowercase(), &now],
            )
            .await?;
        vocabulary_from_row(&row)
    }

    async fn set_word_definition(&self, word: &str, definition: &str) -> Result<()> {
        let conn = self.pool.get().await?;
        conn.execute(
            "UPDATE vocabulary SET definition = $2 WHERE word = $1",
            &[&word.to_lowercase(), &definition],
        )
        .await?;
        Ok(())
    }

    async fn save_word(&self, student_id: i64, word: &str, definition: &str) -> Result<SavedWord> {
        let conn = self.pool.get().await?;
        // The no-op update makes RETURNING yield the existing row on conflict
        let row = conn
            .query_one(
                "INSERT INTO saved_words (student_id, word, definition) VALUES ($1, $2, $3) \
                 ON CONFLICT (student_id, word) DO UPDATE SET word = saved_words.word \
                 RETURNING student_id, word, definition, saved_at",
                &[&student_id, &word, &definition],
            )
            .await?;
        saved_word_from_row(&row)
    }

    async fn saved_words(&self, student_id: i64) -> Result<Vec<SavedWord>> {
        let conn = self.pool.get().await?;
        let rows = conn
            .query(
                "SELECT student_id, word, definition, saved_at FROM saved_words \
                 WHERE student_id = $1 ORDER BY saved_at DESC, word",
                &[&student_id],
            )
            .await?;
        rows.iter().map(saved_word_from_row).collect()
    }
}
