//! Chat completions client

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;

use crate::llm::core::{
    error::LlmError,
    provider::{EventStream, LlmProvider},
    types::{GenerateRequest, GenerateResponse, StreamEvent},
};

use super::mapper::{from_chunk, from_response, to_chat_request};
use super::sse::parse_sse_stream;
use super::types::{ChatCompletionResponse, ErrorEnvelope, SseItem};

/// Where and how to reach the chat completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// e.g. `https://api.openai.com/v1`; `/chat/completions` is appended
    pub base_url: String,
    /// Sent as a bearer token when present
    pub api_key: Option<String>,
    pub model: String,
    /// Whole-request timeout for non-streamed calls
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4.1-nano".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct OpenAiClient {
    http_client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        if config.base_url.trim().is_empty() {
            return Err(LlmError::Configuration("LLM base URL is empty".to_string()));
        }

        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                LlmError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn post(&self) -> RequestBuilder {
        let builder = self.http_client.post(self.endpoint_url());
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

/// Turn a non-success response into the matching error
async fn error_from_response(response: Response) -> LlmError {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);
        return LlmError::RateLimitExceeded { retry_after };
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => LlmError::ProviderError {
            code: envelope
                .error
                .code
                .or(envelope.error.error_type)
                .unwrap_or_else(|| status.as_u16().to_string()),
            message: envelope.error.message,
        },
        Err(_) => LlmError::HttpError {
            status: status.as_u16(),
            body,
        },
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let body = to_chat_request(request, &self.config.model, false);
        debug!(model = %self.config.model, messages = body.messages.len(), "chat completion");

        let response = self
            .post()
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        from_response(parsed)
    }

    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        let body = to_chat_request(request, &self.config.model, true);
        debug!(model = %self.config.model, "streaming chat completion");

        let response = self.post().json(&body).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let sse_stream = parse_sse_stream(Box::pin(response.bytes_stream()));

        let event_stream = sse_stream
            .take_while(|item| futures::future::ready(!matches!(item, Ok(SseItem::Done))))
            .flat_map(|item| {
                let events: Vec<Result<StreamEvent, LlmError>> = match item {
                    Ok(SseItem::Chunk(chunk)) => from_chunk(chunk).into_iter().map(Ok).collect(),
                    Ok(SseItem::Done) => Vec::new(),
                    Err(e) => vec![Err(e)],
                };
                futures::stream::iter(events)
            });

        Ok(Box::pin(event_stream))
    }
}
