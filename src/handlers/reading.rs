// GET /stories/read/{id}, POST /stories/track, GET /stories/continue-reading

use tracing::info;
use warp::Reply;

use super::error::reject;
use super::SharedReadingApi;
use crate::models::{
    ContinueReadingItem, ContinueReadingResponse, PageResponse, ReadQuery, TrackRequest,
    TrackResponse,
};
use crate::reading::paginator::parse_page_param;
use crate::reading::TrackAction;

/// Page number from a JSON number or numeric string; anything else is page 1.
fn page_from_value(value: Option<&serde_json::Value>) -> i64 {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().unwrap_or(1),
        Some(serde_json::Value::String(s)) => parse_page_param(Some(s.as_str())),
        _ => 1,
    }
}

pub async fn read_story_handler(
    story_id: i64,
    student_id: i64,
    query: ReadQuery,
    api: SharedReadingApi,
) -> Result<impl Reply, warp::Rejection> {
    let page = parse_page_param(query.page.as_deref());
    let view = api
        .reading
        .read_page(student_id, story_id, page)
        .await
        .map_err(reject)?;

    info!(
        student_id,
        story_id,
        page = view.page.current_page,
        total = view.page.total_pages,
        "page view"
    );
    Ok(warp::reply::json(&PageResponse::from(view)))
}

pub async fn track_handler(
    student_id: i64,
    request: TrackRequest,
    api: SharedReadingApi,
) -> Result<impl Reply, warp::Rejection> {
    let result = api
        .reading
        .track(
            student_id,
            request.story_id,
            request.action.as_deref(),
            page_from_value(request.current_page.as_ref()),
        )
        .await
        .map_err(reject)?;

    let response = match result.action {
        TrackAction::Next => TrackResponse {
            message: "Progress saved",
            current_page: Some(result.track.current_page),
            completion: result.track.completion_percentage,
        },
        TrackAction::Finish => TrackResponse {
            message: "Story completed!",
            current_page: None,
            completion: result.track.completion_percentage,
        },
    };
    Ok(warp::reply::json(&response))
}

pub async fn continue_reading_handler(
    student_id: i64,
    api: SharedReadingApi,
) -> Result<impl Reply, warp::Rejection> {
    let tracks = api
        .reading
        .continue_reading(student_id)
        .await
        .map_err(reject)?;

    let reading_list: Vec<ContinueReadingItem> =
        tracks.into_iter().map(ContinueReadingItem::from).collect();
    Ok(warp::reply::json(&ContinueReadingResponse {
        count: reading_list.len(),
        reading_list,
    }))
}
