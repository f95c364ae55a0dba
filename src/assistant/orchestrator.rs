//! Request handling for the assistant gateway
//!
//! Every operation degrades instead of failing: a model error becomes an
//! apology or the caller's own text, and a speech error becomes "no audio".

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, warn};

use super::grammar::GrammarService;
use super::guardrails::validate_response;
use super::prompt::{build_system_prompt, build_user_message};
use super::schemas::{
    ChatRequest, ChatResponse, GrammarRequest, GrammarResponse, LearnRequest, LearnResponse,
};
use super::settings::SettingsStore;
use crate::llm::{EventStream, GenerateRequest, GenerationConfig, LlmError, LlmProvider};
use crate::tts::SpeechSynthesizer;

pub const LLM_APOLOGY: &str = "I'm sorry, I'm having trouble connecting to my brain right now.";

const DESCRIPTION_SYSTEM_PROMPT: &str = "You are a metadata assistant.";

fn description_prompt(word: &str) -> String {
    format!(
        "Provide a very brief (one sentence) categorization or description of this text: '{}'",
        word
    )
}

pub struct Orchestrator {
    llm: Arc<dyn LlmProvider>,
    tts: Arc<dyn SpeechSynthesizer>,
    settings: SettingsStore,
    grammar: GrammarService,
    generation: GenerationConfig,
    speak_chat: bool,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        tts: Arc<dyn SpeechSynthesizer>,
        settings: SettingsStore,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            grammar: GrammarService::new(llm.clone(), generation.clone()),
            llm,
            tts,
            settings,
            generation,
            speak_chat: false,
        }
    }

    /// Also return synthesized speech for chat replies.
    pub fn with_chat_speech(mut self, enabled: bool) -> Self {
        self.speak_chat = enabled;
        self
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    async fn chat_request(&self, request: &ChatRequest) -> GenerateRequest {
        let config = self.settings.load().await;
        let system = build_system_prompt(&config.behavior_settings, request.context.as_deref());
        let user = build_user_message(&request.conversation_history, &request.message);
        GenerateRequest::single_turn(system, user, self.generation.clone())
    }

    async fn complete(&self, request: GenerateRequest) -> String {
        match self.llm.generate(request).await {
            Ok(response) => response.text,
            Err(e) => {
                warn!(error = %e, "LLM call failed");
                LLM_APOLOGY.to_string()
            }
        }
    }

    /// Base64 WAV for `text`, or `None` when synthesis fails.
    async fn speak(&self, text: &str) -> Option<String> {
        match self.tts.synthesize(text).await {
            Ok(audio) if !audio.is_empty() => Some(STANDARD.encode(audio)),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "no speech output");
                None
            }
        }
    }

    pub async fn handle_chat(&self, request: ChatRequest) -> ChatResponse {
        let generate = self.chat_request(&request).await;
        let reply = validate_response(&self.complete(generate).await);

        let speech_output = if self.speak_chat {
            self.speak(&reply).await
        } else {
            None
        };

        ChatResponse {
            chat_response: reply,
            speech_output,
        }
    }

    /// Raw model events for a chat turn; guardrails apply to the assembled text.
    pub async fn stream_chat(&self, request: ChatRequest) -> Result<EventStream, LlmError> {
        let generate = self.chat_request(&request).await;
        self.llm.stream_generate(generate).await
    }

    /// One-sentence description plus spoken pronunciation, fetched concurrently.
    pub async fn handle_learn(&self, request: LearnRequest) -> LearnResponse {
        let word = request.word.trim();
        let describe = GenerateRequest::single_turn(
            DESCRIPTION_SYSTEM_PROMPT,
            description_prompt(word),
            self.generation.clone(),
        );

        let (description, pronunciation_audio) =
            tokio::join!(self.complete(describe), self.speak(word));

        LearnResponse {
            description,
            pronunciation_audio,
        }
    }

    pub async fn handle_grammar(&self, request: GrammarRequest) -> GrammarResponse {
        GrammarResponse {
            corrected_text: self.grammar.correct(&request.text).await,
        }
    }
}
