//! Request and response bodies of the assistant gateway
//!
//! The reading service's gateway client uses the same types, so both sides
//! of the wire agree by construction.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Previous messages, oldest first
    #[serde(default)]
    pub conversation_history: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub chat_response: String,
    /// Base64 WAV of the reply, when chat speech is enabled
    #[serde(default)]
    pub speech_output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnRequest {
    pub word: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnResponse {
    pub description: String,
    /// Base64 WAV pronunciation of the word
    #[serde(default)]
    pub pronunciation_audio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarResponse {
    pub corrected_text: String,
}
