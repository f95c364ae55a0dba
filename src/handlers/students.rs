// Reader profile, achievements, saved words and the activity feed

use warp::Reply;

use super::error::reject;
use super::SharedReadingApi;
use crate::models::{
    AchievementsResponse, ActivityItem, ActivityResponse, ProfileRequest, SavedWordItem,
    VocabularyListResponse,
};
use crate::reading::service::DEFAULT_ACTIVITY_LIMIT;
use crate::store::types::DEFAULT_GRADE;

pub async fn upsert_profile_handler(
    student_id: i64,
    request: ProfileRequest,
    api: SharedReadingApi,
) -> Result<impl Reply, warp::Rejection> {
    let profile = api
        .reading
        .set_profile(
            student_id,
            &request.display_name,
            request.grade_level.unwrap_or(DEFAULT_GRADE),
        )
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&profile))
}

pub async fn achievements_handler(
    student_id: i64,
    api: SharedReadingApi,
) -> Result<impl Reply, warp::Rejection> {
    let view = api
        .reading
        .achievements(student_id)
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&AchievementsResponse::from(view)))
}

pub async fn vocabulary_handler(
    student_id: i64,
    api: SharedReadingApi,
) -> Result<impl Reply, warp::Rejection> {
    let words: Vec<SavedWordItem> = api
        .vocabulary
        .saved_words(student_id)
        .await
        .map_err(reject)?
        .into_iter()
        .map(SavedWordItem::from)
        .collect();

    Ok(warp::reply::json(&VocabularyListResponse {
        count: words.len(),
        words,
    }))
}

pub async fn activity_handler(
    student_id: i64,
    api: SharedReadingApi,
) -> Result<impl Reply, warp::Rejection> {
    let activities: Vec<ActivityItem> = api
        .reading
        .recent_activity(student_id, DEFAULT_ACTIVITY_LIMIT)
        .await
        .map_err(reject)?
        .into_iter()
        .map(ActivityItem::from)
        .collect();

    Ok(warp::reply::json(&ActivityResponse {
        count: activities.len(),
        activities,
    }))
}
