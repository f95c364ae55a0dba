// Dictionary helper and the assistant-backed writing endpoints

use tracing::warn;
use warp::http::StatusCode;
use warp::Reply;

use super::error::reject;
use super::SharedReadingApi;
use crate::assistant::ChatResponse;
use crate::models::{
    DefinitionResponse, DictionaryRequest, MessageResponse, RealtimeCheckRequest,
    RealtimeCheckResponse, StoryChatRequest, SuggestionsResponse, TipResponse,
};
use crate::reading::assist::CHAT_UNAVAILABLE;
use crate::reading::{DictionaryAction, DictionaryOutcome, GrammarCheck};

pub async fn dictionary_handler(
    student_id: i64,
    request: DictionaryRequest,
    api: SharedReadingApi,
) -> Result<warp::reply::Response, warp::Rejection> {
    let action = DictionaryAction::parse(request.action.as_deref());
    let outcome = api
        .vocabulary
        .dictionary(student_id, &request.word, action)
        .await
        .map_err(reject)?;

    let reply = match outcome {
        DictionaryOutcome::Saved(_) => warp::reply::json(&MessageResponse {
            message: "Word saved to your vocabulary list",
        })
        .into_response(),
        DictionaryOutcome::Definition {
            word,
            definition,
            audio,
        } => warp::reply::json(&DefinitionResponse {
            word,
            definition,
            audio,
        })
        .into_response(),
    };
    Ok(reply)
}

pub async fn story_chat_handler(
    student_id: i64,
    request: StoryChatRequest,
    api: SharedReadingApi,
) -> Result<warp::reply::Response, warp::Rejection> {
    let result = api
        .assist
        .chat(
            student_id,
            request.message,
            request.history,
            request.story_context,
        )
        .await;

    let reply = match result {
        Ok(response) => warp::reply::json(&response).into_response(),
        Err(e) => {
            warn!(student_id, error = %e, "chat forwarding failed");
            let fallback = ChatResponse {
                chat_response: CHAT_UNAVAILABLE.to_string(),
                speech_output: None,
            };
            warp::reply::with_status(
                warp::reply::json(&fallback),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
            .into_response()
        }
    };
    Ok(reply)
}

pub async fn realtime_check_handler(
    _student_id: i64,
    request: RealtimeCheckRequest,
    api: SharedReadingApi,
) -> Result<warp::reply::Response, warp::Rejection> {
    let check = api
        .assist
        .realtime_check(&request.text)
        .await
        .map_err(reject)?;

    let message = check.message();
    let reply = match check {
        GrammarCheck::TooShort => warp::reply::json(&SuggestionsResponse {
            suggestions: Vec::new(),
        })
        .into_response(),
        GrammarCheck::Checked {
            original,
            corrected,
            has_errors,
        } => warp::reply::json(&RealtimeCheckResponse {
            original,
            corrected,
            has_errors,
            message,
        })
        .into_response(),
    };
    Ok(reply)
}

pub async fn tips_handler(
    _student_id: i64,
    api: SharedReadingApi,
) -> Result<impl Reply, warp::Rejection> {
    let tip = api.assist.tip().await;
    Ok(warp::reply::json(&TipResponse { tip }))
}
