//! Story library and the author's editor
//!
//! Analytics are recomputed with [`StoryMetrics::from_content`] before every
//! write that carries content; the store persists whatever it is handed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use super::error::{ReadingError, Result};
use super::metrics::StoryMetrics;
use crate::store::types::DEFAULT_GRADE;
use crate::store::{ActivityKind, NewActivity, NewStory, ReadingStore, Story};

/// Placeholder author names replaced by the author's display name
const ANONYMOUS_AUTHOR: &str = "Admin";

/// Fields accepted when starting a story
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryDraft {
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    pub grade: Option<i32>,
    pub is_draft: Option<bool>,
    pub author_name: Option<String>,
}

/// Partial update; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub grade: Option<i32>,
    pub is_draft: Option<bool>,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorStats {
    pub total_stories: usize,
    pub total_pages: u64,
    pub edited_today: usize,
    pub stories: Vec<Story>,
}

pub struct LibraryService {
    store: Arc<dyn ReadingStore>,
}

impl LibraryService {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    /// Published stories, restricted to the reader's grade when they have a profile.
    pub async fn library(&self, reader_id: i64) -> Result<Vec<Story>> {
        let grade = self
            .store
            .profile(reader_id)
            .await?
            .map(|profile| profile.grade_level);
        Ok(self.store.published_stories(grade).await?)
    }

    async fn resolve_author_name(&self, author_id: i64, requested: Option<&str>) -> Result<String> {
        match requested.map(str::trim) {
            Some(name) if !name.is_empty() && name != ANONYMOUS_AUTHOR => Ok(name.to_string()),
            _ => Ok(self
                .store
                .profile(author_id)
                .await?
                .map(|profile| profile.display_name)
                .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string())),
        }
    }

    pub async fn create(&self, author_id: i64, draft: StoryDraft) -> Result<Story> {
        let title = draft
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .ok_or(ReadingError::MissingField("title"))?
            .to_string();
        let author_name = self
            .resolve_author_name(author_id, draft.author_name.as_deref())
            .await?;

        let story = self
            .store
            .insert_story(NewStory {
                author_id,
                metrics: StoryMetrics::from_content(&draft.content),
                title,
                author_name,
                content: draft.content,
                grade: draft.grade.unwrap_or(DEFAULT_GRADE),
                is_draft: draft.is_draft.unwrap_or(true),
            })
            .await?;

        self.store
            .append_activity(NewActivity::new(
                author_id,
                ActivityKind::StoryCreate,
                format!("Created story '{}'", story.title),
            ))
            .await?;
        info!(story_id = story.id, author_id, "story created");
        Ok(story)
    }

    /// Fetch one of the caller's own stories. Other authors' stories look missing.
    pub async fn get(&self, author_id: i64, story_id: i64) -> Result<Story> {
        match self.store.story(story_id).await? {
            Some(story) if story.author_id == author_id => Ok(story),
            _ => Err(ReadingError::StoryNotFound(story_id)),
        }
    }

    pub async fn update(&self, author_id: i64, story_id: i64, patch: StoryPatch) -> Result<Story> {
        let mut story = self.get(author_id, story_id).await?;

        if let Some(title) = patch.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(ReadingError::MissingField("title"));
            }
            story.title = title.to_string();
        }
        if let Some(content) = patch.content {
            story.apply_metrics(StoryMetrics::from_content(&content));
            story.content = content;
        }
        if let Some(grade) = patch.grade {
            story.grade = grade;
        }
        if let Some(is_draft) = patch.is_draft {
            story.is_draft = is_draft;
        }
        if patch.author_name.is_some() {
            story.author_name = self
                .resolve_author_name(author_id, patch.author_name.as_deref())
                .await?;
        }

        let story = self
            .store
            .update_story(&story)
            .await?
            .ok_or(ReadingError::StoryNotFound(story_id))?;

        self.store
            .append_activity(NewActivity::new(
                author_id,
                ActivityKind::StoryUpdate,
                format!("Updated story '{}'", story.title),
            ))
            .await?;
        info!(story_id, author_id, words = story.word_count, "story updated");
        Ok(story)
    }

    pub async fn delete(&self, author_id: i64, story_id: i64) -> Result<()> {
        self.get(author_id, story_id).await?;
        if !self.store.delete_story(story_id).await? {
            return Err(ReadingError::StoryNotFound(story_id));
        }
        info!(story_id, author_id, "story deleted");
        Ok(())
    }

    pub async fn stats(&self, author_id: i64) -> Result<AuthorStats> {
        self.stats_at(author_id, Utc::now()).await
    }

    async fn stats_at(&self, author_id: i64, now: DateTime<Utc>) -> Result<AuthorStats> {
        let stories = self.store.stories_by_author(author_id).await?;
        let today = now.date_naive();

        Ok(AuthorStats {
            total_stories: stories.len(),
            total_pages: stories.iter().map(|s| u64::from(s.total_pages)).sum(),
            edited_today: stories
                .iter()
                .filter(|s| s.updated_at.date_naive() == today)
                .count(),
            stories,
        })
    }

    /// Overwrite a story's rating with a whole number of stars.
    pub async fn rate(&self, story_id: i64, rating: u8) -> Result<Story> {
        let mut story = self
            .store
            .story(story_id)
            .await?
            .ok_or(ReadingError::StoryNotFound(story_id))?;
        story.rating = f64::from(rating);

        self.store
            .update_story(&story)
            .await?
            .ok_or(ReadingError::StoryNotFound(story_id))
    }
}

/// Parse a star rating from a JSON value: an integer (or integer string) in 1..=5.
pub fn parse_rating(value: &serde_json::Value) -> Result<u8> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| ReadingError::Validation("Invalid rating".to_string()))?;

    match u8::try_from(parsed) {
        Ok(stars @ 1..=5) => Ok(stars),
        _ => Err(ReadingError::Validation(
            "Rating must be between 1 and 5".to_string(),
        )),
    }
}
