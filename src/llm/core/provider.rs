//! Provider trait for LLM implementations

use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;

use super::{
    error::LlmError,
    types::{GenerateRequest, GenerateResponse, StreamEvent},
};

/// Stream of events produced by [`LlmProvider::stream_generate`]
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + Sync>>;

/// Main interface that all LLM provider implementations must satisfy
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a complete reply in one round trip
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError>;

    /// Stream a reply as incremental events
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError>;
}
