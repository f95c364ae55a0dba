//! Dictionary helper and saved-word lists

use std::sync::Arc;

use tracing::{info, warn};

use super::error::{ReadingError, Result};
use crate::gateway::GatewayClient;
use crate::store::{ActivityKind, NewActivity, ReadingStore, SavedWord};

pub const DEFINITION_UNAVAILABLE: &str = "Definition unavailable at the moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryAction {
    Lookup,
    Save,
}

impl DictionaryAction {
    /// Anything other than `save` is a lookup.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("save") => DictionaryAction::Save,
            _ => DictionaryAction::Lookup,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DictionaryOutcome {
    Saved(SavedWord),
    Definition {
        word: String,
        definition: String,
        /// Base64 pronunciation, present only when freshly fetched
        audio: Option<String>,
    },
}

pub struct VocabularyService {
    store: Arc<dyn ReadingStore>,
    gateway: GatewayClient,
}

impl VocabularyService {
    pub fn new(store: Arc<dyn ReadingStore>, gateway: GatewayClient) -> Self {
        Self { store, gateway }
    }

    pub async fn dictionary(
        &self,
        student_id: i64,
        word: &str,
        action: DictionaryAction,
    ) -> Result<DictionaryOutcome> {
        let word = word.trim();
        if word.is_empty() {
            return Err(ReadingError::Validation("Word required".to_string()));
        }

        let entry = self.store.record_word_search(word).await?;
        self.store
            .append_activity(NewActivity::new(
                student_id,
                ActivityKind::VocabSearch,
                format!("Searched: {}", word),
            ))
            .await?;

        if action == DictionaryAction::Save {
            let saved = self
                .store
                .save_word(student_id, word, &entry.definition)
                .await?;
            info!(student_id, word, "word saved");
            return Ok(DictionaryOutcome::Saved(saved));
        }

        if !entry.definition.is_empty() {
            return Ok(DictionaryOutcome::Definition {
                word: word.to_string(),
                definition: entry.definition,
                audio: None,
            });
        }

        match self.gateway.learn(word).await {
            Ok(learned) => {
                self.store
                    .set_word_definition(&entry.word, &learned.description)
                    .await?;
                Ok(DictionaryOutcome::Definition {
                    word: word.to_string(),
                    definition: learned.description,
                    audio: learned.pronunciation_audio,
                })
            }
            Err(err) => {
                warn!(word, error = %err, "definition lookup failed");
                Ok(DictionaryOutcome::Definition {
                    word: word.to_string(),
                    definition: DEFINITION_UNAVAILABLE.to_string(),
                    audio: None,
                })
            }
        }
    }

    pub async fn saved_words(&self, student_id: i64) -> Result<Vec<SavedWord>> {
        Ok(self.store.saved_words(student_id).await?)
    }
}
