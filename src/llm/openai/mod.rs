//! OpenAI-compatible chat completions provider
//!
//! Works against any server exposing `POST {base_url}/chat/completions`
//! with the OpenAI request/response shapes, streamed or not.

pub mod client;
pub mod mapper;
pub mod sse;
pub mod types;

pub use client::{OpenAiClient, OpenAiConfig};
