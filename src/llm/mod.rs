//! LLM abstraction layer
//!
//! The assistant talks to language models only through [`LlmProvider`].
//! [`OpenAiClient`] implements it for any OpenAI-compatible chat completions
//! endpoint (OpenAI itself, a local llama.cpp/Ollama server, a proxy).

pub mod core;
pub mod openai;

use std::sync::Arc;

pub use core::{
    config::GenerationConfig,
    error::LlmError,
    provider::{EventStream, LlmProvider},
    types::{
        FinishReason, GenerateRequest, GenerateResponse, Message, MessageRole, StreamEvent,
        UsageMetadata,
    },
};
pub use openai::{OpenAiClient, OpenAiConfig};

/// Create the configured provider.
pub fn create_provider(config: OpenAiConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    Ok(Arc::new(OpenAiClient::new(config)?))
}
