// Library, editor, author stats and ratings

use warp::http::StatusCode;
use warp::Reply;

use super::error::{reject, ApiError};
use super::SharedReadingApi;
use crate::models::{
    CreateStoryResponse, LibraryResponse, RateRequest, RateResponse, StatsResponse, StorySummary,
    UpdateStoryResponse,
};
use crate::reading::library::parse_rating;
use crate::reading::{StoryDraft, StoryPatch};

pub async fn library_handler(
    reader_id: i64,
    api: SharedReadingApi,
) -> Result<impl Reply, warp::Rejection> {
    let stories = api.library.library(reader_id).await.map_err(reject)?;
    let library: Vec<StorySummary> = stories.into_iter().map(StorySummary::from).collect();
    Ok(warp::reply::json(&LibraryResponse {
        count: library.len(),
        library,
    }))
}

pub async fn create_story_handler(
    author_id: i64,
    draft: StoryDraft,
    api: SharedReadingApi,
) -> Result<impl Reply, warp::Rejection> {
    let story = api.library.create(author_id, draft).await.map_err(reject)?;
    let response = CreateStoryResponse {
        id: story.id,
        message: "Story started!",
        story: story.into(),
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::CREATED,
    ))
}

pub async fn get_story_handler(
    story_id: i64,
    author_id: i64,
    api: SharedReadingApi,
) -> Result<impl Reply, warp::Rejection> {
    let story = api.library.get(author_id, story_id).await.map_err(reject)?;
    Ok(warp::reply::json(&story))
}

pub async fn update_story_handler(
    story_id: i64,
    author_id: i64,
    patch: StoryPatch,
    api: SharedReadingApi,
) -> Result<impl Reply, warp::Rejection> {
    let story = api
        .library
        .update(author_id, story_id, patch)
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&UpdateStoryResponse {
        message: "Story saved successfully",
        word_count: story.word_count,
        total_pages: story.total_pages,
        story: story.into(),
    }))
}

pub async fn delete_story_handler(
    story_id: i64,
    author_id: i64,
    api: SharedReadingApi,
) -> Result<impl Reply, warp::Rejection> {
    api.library
        .delete(author_id, story_id)
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stats_handler(
    author_id: i64,
    api: SharedReadingApi,
) -> Result<impl Reply, warp::Rejection> {
    let stats = api.library.stats(author_id).await.map_err(reject)?;
    Ok(warp::reply::json(&StatsResponse::from(stats)))
}

pub async fn rate_handler(
    _student_id: i64,
    request: RateRequest,
    api: SharedReadingApi,
) -> Result<impl Reply, warp::Rejection> {
    let (story_id, rating) = match (request.story_id, request.rating.as_ref()) {
        (Some(story_id), Some(rating)) => (story_id, rating),
        _ => {
            return Err(reject(ApiError::bad_request(
                "story_id and rating are required",
            )))
        }
    };
    let stars = parse_rating(rating).map_err(reject)?;
    let story = api.library.rate(story_id, stars).await.map_err(reject)?;

    Ok(warp::reply::json(&RateResponse {
        message: "Rating submitted successfully",
        new_rating: story.rating,
    }))
}
