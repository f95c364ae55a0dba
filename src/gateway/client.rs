//! HTTP client for the assistant gateway

use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::assistant::schemas::{
    ChatRequest, ChatResponse, GrammarRequest, GrammarResponse, LearnRequest, LearnResponse,
};

/// Timeout for chat and grammar calls
pub const DEFAULT_CHAT_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for word lookups and tips
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway request timed out")]
    Timeout,

    #[error("Gateway returned status {0}")]
    Status(u16),

    #[error("Gateway unreachable: {0}")]
    Transport(String),

    #[error("Invalid gateway response: {0}")]
    Decode(String),

    #[error("Gateway client configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            GatewayError::Status(status.as_u16())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

#[derive(Clone)]
pub struct GatewayClient {
    http_client: Client,
    base_url: String,
    chat_timeout: Duration,
    lookup_timeout: Duration,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| GatewayError::Configuration(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chat_timeout: DEFAULT_CHAT_TIMEOUT,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        })
    }

    pub fn with_timeouts(mut self, chat: Duration, lookup: Duration) -> Self {
        self.chat_timeout = chat;
        self.lookup_timeout = lookup;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, R>(&self, path: &str, body: &B, timeout: Duration) -> Result<R, GatewayError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "forwarding to assistant gateway");

        let response = self
            .http_client
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        Ok(response.json::<R>().await?)
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        self.post_json("/chat", request, self.chat_timeout).await
    }

    /// Chat call with the short lookup timeout, for non-interactive prompts.
    pub async fn quick_chat(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        self.post_json("/chat", request, self.lookup_timeout).await
    }

    pub async fn learn(&self, word: &str) -> Result<LearnResponse, GatewayError> {
        let body = LearnRequest {
            word: word.to_string(),
        };
        self.post_json("/learn", &body, self.lookup_timeout).await
    }

    pub async fn grammar(&self, text: &str) -> Result<GrammarResponse, GatewayError> {
        let body = GrammarRequest {
            text: text.to_string(),
        };
        self.post_json("/grammar", &body, self.chat_timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = GatewayClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_transport_error() {
        // Port 9 (discard) is closed on loopback in test environments
        let client = GatewayClient::new("http://127.0.0.1:9")
            .unwrap()
            .with_timeouts(Duration::from_secs(2), Duration::from_secs(2));
        let result = client.learn("owl").await;
        assert!(matches!(
            result,
            Err(GatewayError::Transport(_)) | Err(GatewayError::Timeout)
        ));
    }
}
