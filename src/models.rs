// Request and response bodies of the reading service API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reading::{AchievementView, AuthorStats, ReadView};
use crate::store::{ActivityEntry, ActivityKind, SavedWord, Story, TrackWithStory};

// --- reading ---

#[derive(Debug, Default, PartialEq)]
pub struct ReadQuery {
    /// Kept as text so that a non-numeric page falls back to page 1
    pub page: Option<String>,
}

impl From<Vec<(String, String)>> for ReadQuery {
    /// A repeated `page` is ambiguous and counts as absent.
    fn from(pairs: Vec<(String, String)>) -> Self {
        let mut pages = pairs.into_iter().filter(|(key, _)| key == "page");
        let page = match (pages.next(), pages.next()) {
            (Some((_, value)), None) => Some(value),
            _ => None,
        };
        Self { page }
    }
}

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    pub story_id: Option<i64>,
    pub action: Option<String>,
    /// Number or numeric string
    #[serde(default)]
    pub current_page: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PageResponse {
    pub id: i64,
    pub title: String,
    pub page_content: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
    pub words_remaining: usize,
}

impl From<ReadView> for PageResponse {
    fn from(view: ReadView) -> Self {
        Self {
            id: view.story_id,
            title: view.title,
            page_content: view.page.content,
            current_page: view.page.current_page,
            total_pages: view.page.total_pages,
            has_next: view.page.has_next,
            has_previous: view.page.has_previous,
            words_remaining: view.page.words_remaining,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    pub completion: f64,
}

#[derive(Debug, Serialize)]
pub struct ContinueReadingItem {
    pub story_id: i64,
    pub title: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub completion_percentage: f64,
    pub last_read_at: DateTime<Utc>,
}

impl From<TrackWithStory> for ContinueReadingItem {
    fn from(item: TrackWithStory) -> Self {
        Self {
            story_id: item.track.story_id,
            title: item.story_title,
            current_page: item.track.current_page,
            total_pages: item.track.total_pages,
            completion_percentage: item.track.completion_percentage,
            last_read_at: item.track.last_read_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContinueReadingResponse {
    pub count: usize,
    pub reading_list: Vec<ContinueReadingItem>,
}

// --- library and editor ---

/// A story without its body, as listed in the library
#[derive(Debug, Serialize)]
pub struct StorySummary {
    pub id: i64,
    pub title: String,
    pub author_name: String,
    pub grade: i32,
    pub rating: f64,
    pub is_draft: bool,
    pub word_count: u32,
    pub sentence_count: u32,
    pub total_pages: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Story> for StorySummary {
    fn from(story: Story) -> Self {
        Self {
            id: story.id,
            title: story.title,
            author_name: story.author_name,
            grade: story.grade,
            rating: story.rating,
            is_draft: story.is_draft,
            word_count: story.word_count,
            sentence_count: story.sentence_count,
            total_pages: story.total_pages,
            created_at: story.created_at,
            updated_at: story.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LibraryResponse {
    pub count: usize,
    pub library: Vec<StorySummary>,
}

#[derive(Debug, Serialize)]
pub struct CreateStoryResponse {
    pub id: i64,
    pub message: &'static str,
    pub story: StorySummary,
}

#[derive(Debug, Serialize)]
pub struct UpdateStoryResponse {
    pub message: &'static str,
    pub word_count: u32,
    pub total_pages: u32,
    pub story: StorySummary,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_stories: usize,
    pub total_pages: u64,
    pub edited_today: usize,
    pub story_list: Vec<StorySummary>,
}

impl From<AuthorStats> for StatsResponse {
    fn from(stats: AuthorStats) -> Self {
        Self {
            total_stories: stats.total_stories,
            total_pages: stats.total_pages,
            edited_today: stats.edited_today,
            story_list: stats.stories.into_iter().map(StorySummary::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub story_id: Option<i64>,
    pub rating: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub message: &'static str,
    pub new_rating: f64,
}

// --- vocabulary and writing help ---

#[derive(Debug, Deserialize)]
pub struct DictionaryRequest {
    #[serde(default)]
    pub word: String,
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DefinitionResponse {
    pub word: String,
    pub definition: String,
    pub audio: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct StoryChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default)]
    pub story_context: String,
}

#[derive(Debug, Deserialize)]
pub struct RealtimeCheckRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct RealtimeCheckResponse {
    pub original: String,
    pub corrected: String,
    pub has_errors: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TipResponse {
    pub tip: String,
}

// --- students ---

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub display_name: String,
    pub grade_level: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct AchievementsResponse {
    pub username: String,
    pub current_reading_level: u8,
    pub reading_level_name: &'static str,
    pub next_level_progress: f64,
    pub books_read_total: u32,
    pub words_discovered_total: usize,
}

impl From<AchievementView> for AchievementsResponse {
    fn from(view: AchievementView) -> Self {
        Self {
            username: view.display_name,
            current_reading_level: view.achievement.level,
            reading_level_name: view.achievement.title,
            next_level_progress: view.achievement.next_level_progress,
            books_read_total: view.achievement.total_books_read,
            words_discovered_total: view.words_discovered,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SavedWordItem {
    pub word: String,
    pub definition: String,
    pub saved_at: DateTime<Utc>,
}

impl From<SavedWord> for SavedWordItem {
    fn from(saved: SavedWord) -> Self {
        Self {
            word: saved.word,
            definition: saved.definition,
            saved_at: saved.saved_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VocabularyListResponse {
    pub count: usize,
    pub words: Vec<SavedWordItem>,
}

#[derive(Debug, Serialize)]
pub struct ActivityItem {
    pub id: Uuid,
    pub action: ActivityKind,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl From<ActivityEntry> for ActivityItem {
    fn from(entry: ActivityEntry) -> Self {
        Self {
            id: entry.id,
            action: entry.kind,
            description: entry.description,
            timestamp: entry.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub count: usize,
    pub activities: Vec<ActivityItem>,
}
