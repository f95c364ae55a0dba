//! Writing help forwarded to the assistant gateway

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde_json::json;
use tracing::{debug, warn};

use super::error::Result;
use super::metrics::plain_text;
use crate::assistant::schemas::{ChatRequest, ChatResponse};
use crate::gateway::GatewayClient;
use crate::store::ReadingStore;

/// Reply used when the gateway cannot be reached for chat
pub const CHAT_UNAVAILABLE: &str = "I'm having trouble connecting to my owl-brain!";

/// Shorter texts are not worth a grammar round trip
pub const MIN_CHECK_LEN: usize = 3;

const TIP_PROMPT: &str = "Give me a short, fun reading tip for a grade 3 student.";

pub const FALLBACK_TIPS: [&str; 4] = [
    "Try to picture the story in your mind like a movie!",
    "If you don't know a word, click it to see what it means.",
    "Read out loud to practice your pronunciation.",
    "Ask yourself: 'What do I think will happen next?'",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarCheck {
    TooShort,
    Checked {
        original: String,
        corrected: String,
        has_errors: bool,
    },
}

impl GrammarCheck {
    pub fn message(&self) -> &'static str {
        match self {
            GrammarCheck::Checked {
                has_errors: true, ..
            } => "Owlbert found some improvements!",
            _ => "Looking good!",
        }
    }
}

pub struct AssistService {
    store: Arc<dyn ReadingStore>,
    gateway: GatewayClient,
}

impl AssistService {
    pub fn new(store: Arc<dyn ReadingStore>, gateway: GatewayClient) -> Self {
        Self { store, gateway }
    }

    /// Forward a chat turn with the student's context attached.
    ///
    /// Gateway failures are returned to the caller, which answers with
    /// [`CHAT_UNAVAILABLE`].
    pub async fn chat(
        &self,
        student_id: i64,
        message: String,
        history: Vec<String>,
        story_context: String,
    ) -> Result<ChatResponse> {
        let profile = self.store.profile(student_id).await?;
        let context = json!({
            "student_name": profile
                .as_ref()
                .map(|p| p.display_name.clone())
                .unwrap_or_else(|| format!("Student {}", student_id)),
            "grade": profile.as_ref().map(|p| p.grade_level),
            "current_writing": story_context,
        });

        let request = ChatRequest {
            message,
            conversation_history: history,
            context: Some(context.to_string()),
        };
        debug!(student_id, "forwarding chat");
        Ok(self.gateway.chat(&request).await?)
    }

    pub async fn realtime_check(&self, text: &str) -> Result<GrammarCheck> {
        if text.chars().count() < MIN_CHECK_LEN {
            return Ok(GrammarCheck::TooShort);
        }

        let original = plain_text(text);
        let corrected = self.gateway.grammar(&original).await?.corrected_text;
        let has_errors = original.trim() != corrected.trim();

        Ok(GrammarCheck::Checked {
            original,
            corrected,
            has_errors,
        })
    }

    /// A reading tip from the assistant, or a built-in one if it is unavailable.
    pub async fn tip(&self) -> String {
        let request = ChatRequest {
            message: TIP_PROMPT.to_string(),
            conversation_history: Vec::new(),
            context: None,
        };

        match self.gateway.quick_chat(&request).await {
            Ok(reply) if !reply.chat_response.trim().is_empty() => reply.chat_response,
            Ok(_) => random_tip(),
            Err(err) => {
                warn!(error = %err, "tip request failed, using a built-in tip");
                random_tip()
            }
        }
    }
}

fn random_tip() -> String {
    FALLBACK_TIPS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_TIPS[0])
        .to_string()
}
