// Assistant gateway endpoints

use std::sync::Arc;

use futures::stream;
use serde_json::json;
use tracing::{error, info, warn};
use warp::http::StatusCode;
use warp::Reply;

use super::error::{reject, ApiError};
use crate::assistant::{
    AssistantConfig, ChatRequest, GrammarRequest, LearnRequest, Orchestrator,
};
use crate::llm::EventStream;
use crate::sse::chat_event_stream;

pub type SharedOrchestrator = Arc<Orchestrator>;

pub async fn chat_handler(
    request: ChatRequest,
    orchestrator: SharedOrchestrator,
) -> Result<impl Reply, warp::Rejection> {
    info!(history = request.conversation_history.len(), "chat request");
    let response = orchestrator.handle_chat(request).await;
    Ok(warp::reply::json(&response))
}

pub async fn chat_stream_handler(
    request: ChatRequest,
    orchestrator: SharedOrchestrator,
) -> Result<impl Reply, warp::Rejection> {
    info!("streamed chat request");
    let events: EventStream = match orchestrator.stream_chat(request).await {
        Ok(events) => events,
        Err(e) => {
            warn!(error = %e, "could not open model stream");
            Box::pin(stream::once(async move { Err(e) }))
        }
    };

    Ok(warp::sse::reply(
        warp::sse::keep_alive().stream(chat_event_stream(events)),
    ))
}

pub async fn learn_handler(
    request: LearnRequest,
    orchestrator: SharedOrchestrator,
) -> Result<impl Reply, warp::Rejection> {
    info!(word = %request.word, "learn request");
    let response = orchestrator.handle_learn(request).await;
    Ok(warp::reply::json(&response))
}

pub async fn grammar_handler(
    request: GrammarRequest,
    orchestrator: SharedOrchestrator,
) -> Result<impl Reply, warp::Rejection> {
    let response = orchestrator.handle_grammar(request).await;
    Ok(warp::reply::json(&response))
}

pub async fn get_settings_handler(
    orchestrator: SharedOrchestrator,
) -> Result<impl Reply, warp::Rejection> {
    let config = orchestrator.settings().load().await;
    Ok(warp::reply::json(&config))
}

pub async fn save_settings_handler(
    config: AssistantConfig,
    orchestrator: SharedOrchestrator,
) -> Result<impl Reply, warp::Rejection> {
    orchestrator.settings().save(&config).await.map_err(|e| {
        error!(error = %e, "saving assistant settings failed");
        reject(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Could not save settings",
        ))
    })?;
    info!(name = %config.name, "assistant settings updated");
    Ok(warp::reply::json(&config))
}

pub async fn health_handler() -> Result<impl Reply, warp::Rejection> {
    Ok(warp::reply::json(&json!({ "status": "ok" })))
}
