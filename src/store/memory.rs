//! In-process store
//!
//! All state sits behind one `RwLock`, so each trait method is atomic with
//! respect to the others.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    read_complete_description, read_start_description, ActivityEntry, ActivityKind, NewActivity,
    NewStory, ReadingStore, Result, SavedWord, Story, StudentProfile, TrackSaveOutcome,
    TrackUpdate, TrackWithStory, VocabularyEntry,
};
use crate::reading::progress::ReadingTrack;

#[derive(Default)]
struct State {
    next_story_id: i64,
    stories: HashMap<i64, Story>,
    profiles: HashMap<i64, StudentProfile>,
    tracks: HashMap<(i64, i64), ReadingTrack>,
    activities: Vec<ActivityEntry>,
    vocabulary: HashMap<String, VocabularyEntry>,
    saved_words: HashMap<(i64, String), SavedWord>,
}

impl State {
    fn append(&mut self, activity: NewActivity) -> ActivityEntry {
        let entry = ActivityEntry {
            id: Uuid::new_v4(),
            student_id: activity.student_id,
            kind: activity.kind,
            description: activity.description,
            timestamp: Utc::now(),
        };
        self.activities.push(entry.clone());
        entry
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(stories: &mut [Story]) {
    stories.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn story(&self, id: i64) -> Result<Option<Story>> {
        Ok(self.state.read().await.stories.get(&id).cloned())
    }

    async fn insert_story(&self, story: NewStory) -> Result<Story> {
        let mut state = self.state.write().await;
        state.next_story_id += 1;
        let now = Utc::now();
        let mut stored = Story {
            id: state.next_story_id,
            author_id: story.author_id,
            title: story.title,
            author_name: story.author_name,
            content: story.content,
            grade: story.grade,
            rating: super::types::DEFAULT_RATING,
            is_draft: story.is_draft,
            word_count: 0,
            sentence_count: 0,
            total_pages: 1,
            created_at: now,
            updated_at: now,
        };
        stored.apply_metrics(story.metrics);
        state.stories.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_story(&self, story: &Story) -> Result<Option<Story>> {
        let mut state = self.state.write().await;
        match state.stories.get_mut(&story.id) {
            Some(existing) => {
                let created_at = existing.created_at;
                *existing = story.clone();
                existing.created_at = created_at;
                existing.updated_at = Utc::now();
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_story(&self, id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        let existed = state.stories.remove(&id).is_some();
        if existed {
            state.tracks.retain(|(_, story_id), _| *story_id != id);
        }
        Ok(existed)
    }

    async fn published_stories(&self, grade: Option<i32>) -> Result<Vec<Story>> {
        let state = self.state.read().await;
        let mut stories: Vec<Story> = state
            .stories
            .values()
            .filter(|s| !s.is_draft)
            .filter(|s| grade.map_or(true, |g| s.grade == g))
            .cloned()
            .collect();
        newest_first(&mut stories);
        Ok(stories)
    }

    async fn stories_by_author(&self, author_id: i64) -> Result<Vec<Story>> {
        let state = self.state.read().await;
        let mut stories: Vec<Story> = state
            .stories
            .values()
            .filter(|s| s.author_id == author_id)
            .cloned()
            .collect();
        newest_first(&mut stories);
        Ok(stories)
    }

    async fn profile(&self, student_id: i64) -> Result<Option<StudentProfile>> {
        Ok(self.state.read().await.profiles.get(&student_id).cloned())
    }

    async fn upsert_profile(&self, profile: &StudentProfile) -> Result<()> {
        self.state
            .write()
            .await
            .profiles
            .insert(profile.student_id, profile.clone());
        Ok(())
    }

    async fn track(&self, student_id: i64, story_id: i64) -> Result<Option<ReadingTrack>> {
        Ok(self
            .state
            .read()
            .await
            .tracks
            .get(&(student_id, story_id))
            .cloned())
    }

    async fn save_track(&self, update: TrackUpdate) -> Result<TrackSaveOutcome> {
        let mut state = self.state.write().await;
        let TrackUpdate {
            track,
            started,
            completed,
            story_title,
        } = update;
        let student_id = track.student_id;
        let key = (track.student_id, track.story_id);

        let stored = state.tracks.entry(key).or_insert_with(|| ReadingTrack {
            is_completed: false,
            ..track.clone()
        });
        stored.current_page = track.current_page;
        stored.completion_percentage = track.completion_percentage;
        stored.last_read_at = track.last_read_at;

        let mut outcome = TrackSaveOutcome::default();
        if completed && !stored.is_completed {
            stored.is_completed = true;
            outcome.completion_recorded = true;
        }

        if started {
            state.append(NewActivity::new(
                student_id,
                ActivityKind::ReadStart,
                read_start_description(&story_title),
            ));
        }

        if outcome.completion_recorded {
            if let Some(profile) = state.profiles.get_mut(&student_id) {
                profile.total_books_read += 1;
            }
            state.append(NewActivity::new(
                student_id,
                ActivityKind::ReadComplete,
                read_complete_description(&story_title),
            ));
        }

        Ok(outcome)
    }

    async fn unfinished_tracks(&self, student_id: i64) -> Result<Vec<TrackWithStory>> {
        let state = self.state.read().await;
        let mut tracks: Vec<TrackWithStory> = state
            .tracks
            .values()
            .filter(|t| t.student_id == student_id && !t.is_completed)
            .filter_map(|t| {
                state.stories.get(&t.story_id).map(|story| TrackWithStory {
                    track: t.clone(),
                    story_title: story.title.clone(),
                })
            })
            .collect();
        tracks.sort_by(|a, b| b.track.last_read_at.cmp(&a.track.last_read_at));
        Ok(tracks)
    }

    async fn append_activity(&self, activity: NewActivity) -> Result<ActivityEntry> {
        Ok(self.state.write().await.append(activity))
    }

    async fn recent_activity(&self, student_id: i64, limit: usize) -> Result<Vec<ActivityEntry>> {
        let state = self.state.read().await;
        Ok(state
            .activities
            .iter()
            .rev()
            .filter(|a| a.student_id == student_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn record_word_search(&self, word: &str) -> Result<VocabularyEntry> {
        let mut state = self.state.write().await;
        let key = word.to_lowercase();
        let now = Utc::now();
        let entry = state
            .vocabulary
            .entry(key.clone())
            .or_insert_with(|| VocabularyEntry {
                word: key,
                definition: String::new(),
                search_count: 0,
                last_searched: now,
            });
        entry.search_count += 1;
        entry.last_searched = now;
        Ok(entry.clone())
    }

    async fn set_word_definition(&self, word: &str, definition: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(entry) = state.vocabulary.get_mut(&word.to_lowercase()) {
            entry.definition = definition.to_string();
        }
        Ok(())
    }

    async fn save_word(&self, student_id: i64, word: &str, definition: &str) -> Result<SavedWord> {
        let mut state = self.state.write().await;
        let saved = state
            .saved_words
            .entry((student_id, word.to_string()))
            .or_insert_with(|| SavedWord {
                student_id,
                word: word.to_string(),
                definition: definition.to_string(),
                saved_at: Utc::now(),
            });
        Ok(saved.clone())
    }

    async fn saved_words(&self, student_id: i64) -> Result<Vec<SavedWord>> {
        let state = self.state.read().await;
        let mut words: Vec<SavedWord> = state
            .saved_words
            .values()
            .filter(|w| w.student_id == student_id)
            .cloned()
            .collect();
        words.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then(a.word.cmp(&b.word)));
        Ok(words)
    }
}
