// JSON error replies and the warp rejection handler

use std::convert::Infallible;

use serde_json::json;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::gateway::GatewayError;
use crate::reading::ReadingError;

/// A request-local failure rendered as `{"error": message}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl warp::reject::Reject for ApiError {}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<ReadingError> for ApiError {
    fn from(err: ReadingError) -> Self {
        match &err {
            ReadingError::StoryNotFound(_) | ReadingError::ProfileNotFound => {
                ApiError::new(StatusCode::NOT_FOUND, err.to_string())
            }
            ReadingError::MissingField(_)
            | ReadingError::InvalidAction(_)
            | ReadingError::Validation(_) => ApiError::bad_request(err.to_string()),
            ReadingError::Gateway(GatewayError::Timeout) => {
                ApiError::new(StatusCode::REQUEST_TIMEOUT, "Timeout")
            }
            ReadingError::Gateway(e) => {
                warn!(error = %e, "assistant gateway unavailable");
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "AI service busy")
            }
            ReadingError::Store(e) => {
                error!(error = %e, "store failure");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

/// Turn an error into a rejection for `and_then` handlers.
pub fn reject(err: impl Into<ApiError>) -> Rejection {
    warp::reject::custom(err.into())
}

pub fn json_error(status: StatusCode, message: &str) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(&json!({ "error": message })), status)
        .into_response()
}

/// Render every rejection as a JSON error body.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(api) = err.find::<ApiError>() {
        (api.status, api.message.clone())
    } else if let Some(missing) = err.find::<warp::reject::MissingHeader>() {
        (
            StatusCode::UNAUTHORIZED,
            format!("{} header required", missing.name()),
        )
    } else if err.find::<warp::reject::InvalidHeader>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid x-user-id header".to_string())
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid query string".to_string())
    } else if let Some(body) = err.find::<warp::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", body))
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!(rejection = ?err, "unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(json_error(status, &message))
}
