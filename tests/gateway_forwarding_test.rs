mod common;

use pretty_assertions::assert_eq;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

async fn post(base: &str, user: i64, path: &str, body: Value) -> (StatusCode, Value) {
    let response = Client::new()
        .post(format!("{}/api/v1{}", base, path))
        .header("x-user-id", user.to_string())
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap_or(Value::Null))
}

async fn get(base: &str, user: i64, path: &str) -> (StatusCode, Value) {
    let response = Client::new()
        .get(format!("{}/api/v1{}", base, path))
        .header("x-user-id", user.to_string())
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_dictionary_lookup_is_cached() {
    let (gateway, recorded) = common::spawn_fake_gateway().await;
    let (base, _) = common::spawn_reading_service(&gateway).await;

    let (status, body) = post(&base, 7, "/stories/dictionary", json!({"word": " Owl "})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"word": "Owl", "definition": "Owl is a word.", "audio": "UklGRg=="})
    );

    let (_, body) = post(&base, 8, "/stories/dictionary", json!({"word": "owl"})).await;
    assert_eq!(body["definition"], "Owl is a word.");
    assert_eq!(body["audio"], Value::Null);

    assert_eq!(recorded.calls("/learn"), vec![json!({"word": "Owl"})]);
}

#[tokio::test]
async fn test_dictionary_requires_word() {
    let (gateway, _) = common::spawn_fake_gateway().await;
    let (base, _) = common::spawn_reading_service(&gateway).await;

    let (status, body) = post(&base, 7, "/stories/dictionary", json!({"word": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Word required");
}

#[tokio::test]
async fn test_saved_words_are_listed() {
    let (gateway, _) = common::spawn_fake_gateway().await;
    let (base, _) = common::spawn_reading_service(&gateway).await;

    post(&base, 7, "/stories/dictionary", json!({"word": "hoot"})).await;
    let (status, body) = post(
        &base,
        7,
        "/stories/dictionary",
        json!({"word": "hoot", "action": "save"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Word saved to your vocabulary list"}));

    let (_, list) = get(&base, 7, "/students/vocabulary").await;
    assert_eq!(list["count"], 1);
    assert_eq!(list["words"][0]["word"], "hoot");
    assert_eq!(list["words"][0]["definition"], "hoot is a word.");

    let (_, feed) = get(&base, 7, "/students/activity").await;
    assert_eq!(feed["count"], 2);
    assert_eq!(feed["activities"][0]["action"], "VOCAB_SEARCH");
    assert_eq!(feed["activities"][0]["description"], "Searched: hoot");
}

#[tokio::test]
async fn test_dictionary_survives_gateway_outage() {
    let (base, _) = common::spawn_reading_service(&common::offline_gateway_url()).await;

    let (status, body) = post(&base, 7, "/stories/dictionary", json!({"word": "owl"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["definition"], "Definition unavailable at the moment.");
}

#[tokio::test]
async fn test_chat_forwards_student_context() {
    let (gateway, recorded) = common::spawn_fake_gateway().await;
    let (base, _) = common::spawn_reading_service(&gateway).await;

    let (status, body) = post(
        &base,
        7,
        "/stories/chat",
        json!({"message": "Help me start", "history": ["Hi"], "story_context": "Once upon"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chat_response"], "Echo: Help me start");

    let sent = &recorded.calls("/chat")[0];
    assert_eq!(sent["message"], "Help me start");
    assert_eq!(sent["conversation_history"], json!(["Hi"]));
    let context: Value = serde_json::from_str(sent["context"].as_str().unwrap()).unwrap();
    assert_eq!(
        context,
        json!({"student_name": "Student 7", "grade": null, "current_writing": "Once upon"})
    );
}

#[tokio::test]
async fn test_chat_outage_is_friendly() {
    let (base, _) = common::spawn_reading_service(&common::offline_gateway_url()).await;

    let (status, body) = post(&base, 7, "/stories/chat", json!({"message": "Hello"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "chat_response": "I'm having trouble connecting to my owl-brain!",
            "speech_output": null
        })
    );
}

#[tokio::test]
async fn test_realtime_check() {
    let (gateway, recorded) = common::spawn_fake_gateway().await;
    let (base, _) = common::spawn_reading_service(&gateway).await;

    let (status, body) = post(&base, 7, "/stories/realtime-check", json!({"text": "hi"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"suggestions": []}));
    assert!(recorded.calls("/grammar").is_empty());

    let (_, body) = post(
        &base,
        7,
        "/stories/realtime-check",
        json!({"text": "<p>the owl flew</p>"}),
    )
    .await;
    assert_eq!(body["original"], " the owl flew ");
    assert_eq!(body["corrected"], " the owl flew ");
    assert_eq!(body["has_errors"], false);
    assert_eq!(body["message"], "Looking good!");

    let (_, body) = post(&base, 7, "/stories/realtime-check", json!({"text": "the owl"})).await;
    assert_eq!(body["corrected"], "The owl");
    assert_eq!(body["has_errors"], true);
    assert_eq!(body["message"], "Owlbert found some improvements!");
}

#[tokio::test]
async fn test_realtime_check_gateway_failures() {
    let (gateway, _) = common::spawn_fake_gateway().await;
    let (base, _) = common::spawn_reading_service(&gateway).await;

    let (status, body) = post(&base, 7, "/stories/realtime-check", json!({"text": "please fail"})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"error": "AI service busy"}));

    let (status, body) = post(&base, 7, "/stories/realtime-check", json!({"text": "very slow"})).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body, json!({"error": "Timeout"}));
}

#[tokio::test]
async fn test_tips() {
    let (gateway, _) = common::spawn_fake_gateway().await;
    let (base, _) = common::spawn_reading_service(&gateway).await;

    let (status, body) = get(&base, 7, "/stories/tips").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["tip"],
        "Echo: Give me a short, fun reading tip for a grade 3 student."
    );

    let (offline, _) = common::spawn_reading_service(&common::offline_gateway_url()).await;
    let (status, body) = get(&offline, 7, "/stories/tips").await;
    assert_eq!(status, StatusCode::OK);
    assert!(owlbert::reading::assist::FALLBACK_TIPS.contains(&body["tip"].as_str().unwrap()));
}
