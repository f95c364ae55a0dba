//! Text-to-speech
//!
//! Synthesis is best effort: callers treat a failure as "no audio" and carry
//! on, so [`TtsError`] only ever reaches a log line.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

pub use http::{HttpSynthesizer, HttpSynthesizerConfig};

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Text-to-speech is disabled")]
    Disabled,

    #[error("Nothing to synthesize")]
    EmptyInput,

    #[error("HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for TtsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return TtsError::Timeout;
        }
        TtsError::Http {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            body: err.to_string(),
        }
    }
}

/// Something that turns text into WAV audio
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError>;
}

/// Synthesizer used when no TTS engine is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSynthesizer;

#[async_trait]
impl SpeechSynthesizer for DisabledSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, TtsError> {
        Err(TtsError::Disabled)
    }
}
