//! Reading: page views, progress tracking and the reader's own records
//!
//! Every progress write for a (student, story) pair runs under that pair's
//! [`KeyedLocks`] entry, so the load → update → save cycle never interleaves
//! with another request for the same pair. The store's conditional
//! completion flip backs this up across processes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::achievement::Achievement;
use super::error::{ReadingError, Result};
use super::locks::KeyedLocks;
use super::metrics::plain_text;
use super::paginator::{clamp_page, paginate, Page};
use super::progress::{Completion, ReadingTrack};
use crate::store::{
    ActivityEntry, ReadingStore, Story, StudentProfile, TrackSaveOutcome, TrackUpdate,
    TrackWithStory,
};

/// Default number of entries returned by the activity feed
pub const DEFAULT_ACTIVITY_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackAction {
    Next,
    Finish,
}

impl TrackAction {
    /// A missing action means `next`.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw {
            None | Some("next") => Ok(TrackAction::Next),
            Some("finish") => Ok(TrackAction::Finish),
            Some(other) => Err(ReadingError::InvalidAction(other.to_string())),
        }
    }
}

/// A rendered page of a story
#[derive(Debug, Clone, PartialEq)]
pub struct ReadView {
    pub story_id: i64,
    pub title: String,
    pub page: Page,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackResult {
    pub action: TrackAction,
    pub track: ReadingTrack,
    /// This request completed the story
    pub completion_recorded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AchievementView {
    pub display_name: String,
    pub achievement: Achievement,
    pub words_discovered: usize,
}

pub struct ReadingService {
    store: Arc<dyn ReadingStore>,
    locks: KeyedLocks<(i64, i64)>,
}

impl ReadingService {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    async fn story(&self, story_id: i64) -> Result<Story> {
        self.store
            .story(story_id)
            .await?
            .ok_or(ReadingError::StoryNotFound(story_id))
    }

    /// Load or open the track, apply `step`, and persist it as one unit.
    async fn step_track<F>(
        &self,
        student_id: i64,
        story: &Story,
        step: F,
    ) -> Result<(ReadingTrack, TrackSaveOutcome)>
    where
        F: FnOnce(&mut ReadingTrack, DateTime<Utc>) -> Option<Completion>,
    {
        let _guard = self.locks.lock((student_id, story.id)).await;
        let now = Utc::now();

        let existing = self.store.track(student_id, story.id).await?;
        let started = existing.is_none();
        let mut track = existing
            .unwrap_or_else(|| ReadingTrack::start(student_id, story.id, story.total_pages, now));

        let completed = step(&mut track, now).is_some();
        let outcome = self
            .store
            .save_track(TrackUpdate {
                track: track.clone(),
                started,
                completed,
                story_title: story.title.clone(),
            })
            .await?;

        if outcome.completion_recorded {
            info!(student_id, story_id = story.id, "story completed");
        } else if completed {
            debug!(student_id, story_id = story.id, "completion already recorded elsewhere");
        }

        // The stored flag is authoritative once set
        track.is_completed = track.is_completed || outcome.completion_recorded;
        Ok((track, outcome))
    }

    /// Render page `requested_page` of a story and record the view.
    pub async fn read_page(
        &self,
        student_id: i64,
        story_id: i64,
        requested_page: i64,
    ) -> Result<ReadView> {
        let story = self.story(story_id).await?;
        let page = paginate(&plain_text(&story.content), requested_page);

        let (current, last) = (page.current_page, page.total_pages);
        self.step_track(student_id, &story, |track, now| {
            track.view_page(current, last, now)
        })
        .await?;

        Ok(ReadView {
            story_id: story.id,
            title: story.title,
            page,
        })
    }

    /// Explicit progress update from the reader UI.
    pub async fn track(
        &self,
        student_id: i64,
        story_id: Option<i64>,
        action: Option<&str>,
        current_page: i64,
    ) -> Result<TrackResult> {
        let story_id = story_id.ok_or(ReadingError::MissingField("story_id"))?;
        let action = TrackAction::parse(action)?;
        let story = self.story(story_id).await?;

        let last_page = story.total_pages.max(1);

        let (track, outcome) = self
            .step_track(student_id, &story, |track, now| match action {
                TrackAction::Next => {
                    let page = clamp_page(current_page, last_page);
                    track.view_page(page, last_page, now)
                }
                TrackAction::Finish => track.finish(last_page, now),
            })
            .await?;

        Ok(TrackResult {
            action,
            track,
            completion_recorded: outcome.completion_recorded,
        })
    }

    /// Unfinished stories, most recently read first.
    pub async fn continue_reading(&self, student_id: i64) -> Result<Vec<TrackWithStory>> {
        Ok(self.store.unfinished_tracks(student_id).await?)
    }

    pub async fn profile(&self, student_id: i64) -> Result<StudentProfile> {
        self.store
            .profile(student_id)
            .await?
            .ok_or(ReadingError::ProfileNotFound)
    }

    /// Create or rename the caller's reader profile; counters are kept.
    pub async fn set_profile(
        &self,
        student_id: i64,
        display_name: &str,
        grade_level: i32,
    ) -> Result<StudentProfile> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ReadingError::Validation("display_name is required".to_string()));
        }

        let profile = match self.store.profile(student_id).await? {
            Some(mut existing) => {
                existing.display_name = display_name.to_string();
                existing.grade_level = grade_level;
                existing
            }
            None => StudentProfile::new(student_id, display_name, grade_level),
        };
        self.store.upsert_profile(&profile).await?;
        Ok(profile)
    }

    pub async fn achievements(&self, student_id: i64) -> Result<AchievementView> {
        let profile = self.profile(student_id).await?;
        let words_discovered = self.store.saved_words(student_id).await?.len();

        Ok(AchievementView {
            display_name: profile.display_name,
            achievement: Achievement::from_books_read(profile.total_books_read),
            words_discovered,
        })
    }

    pub async fn recent_activity(&self, student_id: i64, limit: usize) -> Result<Vec<ActivityEntry>> {
        Ok(self.store.recent_activity(student_id, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::metrics::StoryMetrics;
    use crate::store::{ActivityKind, MemoryStore, NewStory};

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    async fn setup(word_count: usize) -> (ReadingService, Arc<MemoryStore>, i64) {
        let store = Arc::new(MemoryStore::new());
        let content = words(word_count);
        let story = store
            .insert_story(NewStory {
                author_id: 1,
                title: "The Owl".to_string(),
                author_name: "Admin".to_string(),
                metrics: StoryMetrics::from_content(&content),
                content,
                grade: 3,
                is_draft: false,
            })
            .await
            .unwrap();
        store
            .upsert_profile(&StudentProfile::new(7, "Ada", 3))
            .await
            .unwrap();
        (ReadingService::new(store.clone()), store, story.id)
    }

    async fn books_read(store: &MemoryStore) -> u32 {
        store.profile(7).await.unwrap().unwrap().total_books_read
    }

    #[tokio::test]
    async fn test_read_page_clamps_and_tracks() {
        let (service, store, story_id) = setup(310).await;

        let view = service.read_page(7, story_id, 5).await.unwrap();
        assert_eq!(view.page.current_page, 3);
        assert_eq!(view.page.total_pages, 3);
        assert!(!view.page.has_next);
        assert!(view.page.has_previous);
        assert_eq!(view.page.words_remaining, 0);
        assert_eq!(view.page.content.split_whitespace().count(), 10);

        let track = store.track(7, story_id).await.unwrap().unwrap();
        assert_eq!(track.current_page, 3);
        assert!(track.is_completed);
        assert_eq!(books_read(&store).await, 1);
    }

    #[tokio::test]
    async fn test_unknown_story() {
        let (service, _, _) = setup(10).await;
        assert!(matches!(
            service.read_page(7, 999, 1).await,
            Err(ReadingError::StoryNotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_final_page_counts_once() {
        let (service, store, story_id) = setup(310).await;
        for _ in 0..4 {
            service.read_page(7, story_id, 3).await.unwrap();
        }
        assert_eq!(books_read(&store).await, 1);

        let log = store.recent_activity(7, 50).await.unwrap();
        let completes = log.iter().filter(|a| a.kind == ActivityKind::ReadComplete).count();
        let starts = log.iter().filter(|a| a.kind == ActivityKind::ReadStart).count();
        assert_eq!(completes, 1);
        assert_eq!(starts, 1);
    }

    #[tokio::test]
    async fn test_same_page_twice_is_idempotent() {
        let (service, store, story_id) = setup(310).await;
        let first = service.read_page(7, story_id, 2).await.unwrap();
        let track_a = store.track(7, story_id).await.unwrap().unwrap();
        let second = service.read_page(7, story_id, 2).await.unwrap();
        let track_b = store.track(7, story_id).await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(track_a.current_page, track_b.current_page);
        assert_eq!(track_a.completion_percentage, track_b.completion_percentage);
        assert_eq!(books_read(&store).await, 0);
    }

    #[tokio::test]
    async fn test_revisit_lowers_percentage_but_stays_completed() {
        let (service, store, story_id) = setup(310).await;
        service.read_page(7, story_id, 3).await.unwrap();
        service.read_page(7, story_id, 1).await.unwrap();

        let track = store.track(7, story_id).await.unwrap().unwrap();
        assert!(track.is_completed);
        assert!(track.completion_percentage < 100.0);
        assert!(service.continue_reading(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_track_requires_story_id_and_known_action() {
        let (service, _, story_id) = setup(10).await;
        assert!(matches!(
            service.track(7, None, Some("next"), 1).await,
            Err(ReadingError::MissingField("story_id"))
        ));
        assert!(matches!(
            service.track(7, Some(story_id), Some("skip"), 1).await,
            Err(ReadingError::InvalidAction(_))
        ));
    }

    #[tokio::test]
    async fn test_track_next_clamps_to_story() {
        let (service, _, story_id) = setup(310).await;
        let result = service.track(7, Some(story_id), None, 2).await.unwrap();
        assert_eq!(result.action, TrackAction::Next);
        assert_eq!(result.track.current_page, 2);
        assert!(!result.completion_recorded);

        let result = service.track(7, Some(story_id), Some("next"), -4).await.unwrap();
        assert_eq!(result.track.current_page, 1);
    }

    #[tokio::test]
    async fn test_finish_completes_once() {
        let (service, store, story_id) = setup(310).await;

        let first = service.track(7, Some(story_id), Some("finish"), 1).await.unwrap();
        assert_eq!(first.track.current_page, 3);
        assert_eq!(first.track.completion_percentage, 100.0);
        assert!(first.completion_recorded);

        let again = service.track(7, Some(story_id), Some("finish"), 1).await.unwrap();
        assert_eq!(again.track.completion_percentage, 100.0);
        assert!(!again.completion_recorded);
        assert_eq!(books_read(&store).await, 1);
    }

    async fn rewrite(store: &MemoryStore, story_id: i64, word_count: usize) {
        let mut story = store.story(story_id).await.unwrap().unwrap();
        story.content = words(word_count);
        story.apply_metrics(StoryMetrics::from_content(&story.content));
        store.update_story(&story).await.unwrap();
    }

    #[tokio::test]
    async fn test_grown_story_completes_on_new_last_page() {
        let (service, store, story_id) = setup(310).await;
        service.read_page(7, story_id, 1).await.unwrap();
        rewrite(&store, story_id, 900).await;

        let view = service.read_page(7, story_id, 4).await.unwrap();
        assert_eq!(view.page.total_pages, 6);
        assert!(view.page.has_next);

        let track = store.track(7, story_id).await.unwrap().unwrap();
        assert_eq!(track.total_pages, 3);
        assert_eq!(track.current_page, 4);
        assert!(track.completion_percentage <= 100.0);
        assert!(!track.is_completed);
        assert_eq!(books_read(&store).await, 0);

        service.read_page(7, story_id, 6).await.unwrap();
        let track = store.track(7, story_id).await.unwrap().unwrap();
        assert_eq!(track.current_page, 6);
        assert_eq!(track.completion_percentage, 100.0);
        assert!(track.is_completed);
        assert_eq!(books_read(&store).await, 1);
    }

    #[tokio::test]
    async fn test_shrunk_story_completes_on_its_last_page() {
        let (service, store, story_id) = setup(310).await;
        service.read_page(7, story_id, 1).await.unwrap();
        rewrite(&store, story_id, 100).await;

        let view = service.read_page(7, story_id, 1).await.unwrap();
        assert_eq!(view.page.total_pages, 1);
        assert!(!view.page.has_next);

        let track = store.track(7, story_id).await.unwrap().unwrap();
        assert_eq!(track.total_pages, 3);
        assert_eq!(track.current_page, 1);
        assert_eq!(track.completion_percentage, 100.0);
        assert!(track.is_completed);
        assert_eq!(books_read(&store).await, 1);
    }

    #[tokio::test]
    async fn test_finish_after_growth_lands_on_new_last_page() {
        let (service, store, story_id) = setup(310).await;
        service.read_page(7, story_id, 1).await.unwrap();
        rewrite(&store, story_id, 900).await;

        let result = service.track(7, Some(story_id), Some("finish"), 1).await.unwrap();
        assert_eq!(result.track.current_page, 6);
        assert_eq!(result.track.total_pages, 3);
        assert_eq!(result.track.completion_percentage, 100.0);
        assert!(result.completion_recorded);
    }

    #[tokio::test]
    async fn test_concurrent_final_views_increment_once() {
        let (service, store, story_id) = setup(310).await;
        let service = Arc::new(service);

        let handles: Vec<_> = (0..24)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.read_page(7, story_id, 3).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(books_read(&store).await, 1);
    }

    #[tokio::test]
    async fn test_continue_reading_lists_unfinished() {
        let (service, _, story_id) = setup(310).await;
        service.read_page(7, story_id, 2).await.unwrap();

        let list = service.continue_reading(7).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].story_title, "The Owl");
        assert_eq!(list[0].track.current_page, 2);
    }

    #[tokio::test]
    async fn test_achievements_need_profile() {
        let (service, _, story_id) = setup(10).await;
        assert!(matches!(
            service.achievements(8).await,
            Err(ReadingError::ProfileNotFound)
        ));

        service.read_page(7, story_id, 1).await.unwrap();
        let view = service.achievements(7).await.unwrap();
        assert_eq!(view.display_name, "Ada");
        assert_eq!(view.achievement.total_books_read, 1);
        assert_eq!(view.achievement.title, "Novice Reader");
    }

    #[tokio::test]
    async fn test_set_profile_keeps_counters() {
        let (service, _, story_id) = setup(10).await;
        service.read_page(7, story_id, 1).await.unwrap();

        let profile = service.set_profile(7, "Ada L.", 4).await.unwrap();
        assert_eq!(profile.grade_level, 4);
        assert_eq!(profile.total_books_read, 1);

        assert!(matches!(
            service.set_profile(7, "  ", 4).await,
            Err(ReadingError::Validation(_))
        ));
    }
}
