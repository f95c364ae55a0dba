//! Mapping between abstraction types and chat completions types

use crate::llm::core::{
    error::LlmError,
    types::{FinishReason, GenerateRequest, GenerateResponse, MessageRole, StreamEvent, UsageMetadata},
};

use super::types::{ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Usage};

/// Build the wire request; the system prompt becomes the first message.
pub fn to_chat_request(request: GenerateRequest, model: &str, stream: bool) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if let Some(system) = request.system {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: system,
        });
    }
    messages.extend(request.messages.into_iter().map(|m| ChatMessage {
        role: match m.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
        .to_string(),
        content: m.content,
    }));

    ChatCompletionRequest {
        model: model.to_string(),
        messages,
        max_tokens: request.config.max_tokens,
        temperature: request.config.temperature,
        top_p: request.config.top_p,
        stop: request.config.stop_sequences,
        stream,
    }
}

fn to_usage(usage: Usage) -> UsageMetadata {
    UsageMetadata::new(usage.prompt_tokens, usage.completion_tokens)
}

/// Take the first choice of a complete response.
pub fn from_response(response: ChatCompletionResponse) -> Result<GenerateResponse, LlmError> {
    let usage = response.usage.map(to_usage);
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyResponse)?;

    Ok(GenerateResponse {
        text: choice.message.content.unwrap_or_default(),
        finish_reason: choice
            .finish_reason
            .as_deref()
            .map(FinishReason::from_provider)
            .unwrap_or(FinishReason::Stop),
        usage,
    })
}

/// Events carried by one streamed chunk.
pub fn from_chunk(chunk: ChatCompletionChunk) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    let usage = chunk.usage.map(to_usage);

    for choice in chunk.choices.into_iter().filter(|c| c.index == 0) {
        if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
            events.push(StreamEvent::TextDelta { text });
        }
        if let Some(reason) = choice.finish_reason {
            events.push(StreamEvent::MessageEnd {
                finish_reason: FinishReason::from_provider(&reason),
                usage,
            });
        }
    }

    events
}
