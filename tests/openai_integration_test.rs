//! Integration tests against a live OpenAI-compatible endpoint
//!
//! These tests make real API calls. To run them:
//! 1. Put `LLM_API_KEY` (and optionally `LLM_BASE_URL`, `LLM_MODEL`) in `.env`
//! 2. Run: `cargo test --test openai_integration_test -- --ignored`

use std::env;
use std::time::Duration;

use futures::StreamExt;
use owlbert::llm::{
    FinishReason, GenerateRequest, GenerationConfig, LlmProvider, OpenAiClient, OpenAiConfig,
    StreamEvent,
};

fn create_test_client() -> OpenAiClient {
    dotenvy::dotenv().ok();

    let defaults = OpenAiConfig::default();
    let config = OpenAiConfig {
        base_url: env::var("LLM_BASE_URL").unwrap_or(defaults.base_url),
        api_key: Some(env::var("LLM_API_KEY").expect("LLM_API_KEY required in .env")),
        model: env::var("LLM_MODEL").unwrap_or(defaults.model),
        timeout: Duration::from_secs(60),
    };

    OpenAiClient::new(config).expect("Failed to create client")
}

#[tokio::test]
#[ignore] // Run with --ignored flag
async fn test_openai_simple_generation() {
    let client = create_test_client();

    let request = GenerateRequest::single_turn(
        "You are a terse assistant.",
        "What is 2+2? Answer with just the number.",
        GenerationConfig::new(20),
    );

    let response = client.generate(request).await.expect("Generation failed");

    assert!(response.text.contains('4'), "got: {}", response.text);
    assert_eq!(response.finish_reason, FinishReason::Stop);
}

#[tokio::test]
#[ignore]
async fn test_openai_streaming_generation() {
    let client = create_test_client();

    let request = GenerateRequest::single_turn(
        "You are a terse assistant.",
        "Count from 1 to 5, separated by spaces.",
        GenerationConfig::new(50),
    );

    let mut stream = client
        .stream_generate(request)
        .await
        .expect("Failed to start stream");

    let mut text = String::new();
    let mut finished = false;
    while let Some(event) = stream.next().await {
        match event.expect("Stream error") {
            StreamEvent::TextDelta { text: t } => text.push_str(&t),
            StreamEvent::MessageEnd { .. } => finished = true,
            StreamEvent::Error { error } => panic!("stream error: {}", error),
        }
    }

    assert!(finished);
    assert!(text.contains('5'), "got: {}", text);
}

#[tokio::test]
#[ignore]
async fn test_openai_bad_key_is_reported() {
    dotenvy::dotenv().ok();

    let client = OpenAiClient::new(OpenAiConfig {
        api_key: Some("sk-invalid".to_string()),
        ..OpenAiConfig::default()
    })
    .expect("Failed to create client");

    let result = client
        .generate(GenerateRequest::single_turn(
            "system",
            "hello",
            GenerationConfig::new(5),
        ))
        .await;

    assert!(result.is_err());
}
