//! Assistant gateway: chat, word learning and grammar correction on top of
//! an LLM provider and a speech synthesizer.

pub mod grammar;
pub mod guardrails;
pub mod orchestrator;
pub mod prompt;
pub mod schemas;
pub mod settings;

pub use orchestrator::Orchestrator;
pub use schemas::{
    ChatRequest, ChatResponse, GrammarRequest, GrammarResponse, LearnRequest, LearnResponse,
};
pub use settings::{AssistantConfig, SettingsStore};

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm::{
        EventStream, FinishReason, GenerateRequest, GenerateResponse, LlmError, LlmProvider,
        StreamEvent,
    };
    use crate::tts::{SpeechSynthesizer, TtsError};

    /// LLM that answers every request with the same text, or fails
    pub struct ScriptedLlm {
        reply: Option<String>,
        requests: Mutex<Vec<GenerateRequest>>,
    }

    impl ScriptedLlm {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<GenerateRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn record(&self, request: GenerateRequest) -> Result<String, LlmError> {
            self.requests.lock().unwrap().push(request);
            self.reply.clone().ok_or(LlmError::HttpError {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
            Ok(GenerateResponse {
                text: self.record(request)?,
                finish_reason: FinishReason::Stop,
                usage: None,
            })
        }

        async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
            let text = self.record(request)?;
            let mut events: Vec<Result<StreamEvent, LlmError>> = text
                .split_inclusive(' ')
                .map(|word| {
                    Ok(StreamEvent::TextDelta {
                        text: word.to_string(),
                    })
                })
                .collect();
            events.push(Ok(StreamEvent::MessageEnd {
                finish_reason: FinishReason::Stop,
                usage: None,
            }));
            Ok(Box::pin(futures::stream::iter(events)))
        }
    }

    pub struct FakeSynth {
        audio: Option<Vec<u8>>,
    }

    impl FakeSynth {
        pub fn speaking(audio: &[u8]) -> Self {
            Self {
                audio: Some(audio.to_vec()),
            }
        }

        pub fn silent() -> Self {
            Self { audio: None }
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSynth {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, TtsError> {
            self.audio.clone().ok_or(TtsError::Disabled)
        }
    }
}
