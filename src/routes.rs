// Route definitions for both services

use std::convert::Infallible;

use serde::de::DeserializeOwned;
use warp::{Filter, Rejection};

use crate::handlers::assistant::{self as gateway, SharedOrchestrator};
use crate::handlers::{handle_rejection, reading, stories, students, writing, SharedReadingApi};
use crate::models::ReadQuery;

/// Largest JSON body accepted; story bodies are the biggest payloads
const MAX_BODY_BYTES: u64 = 1024 * 1024;

/// Caller identity, set by the trusted proxy in front of the service
fn student_id() -> impl Filter<Extract = (i64,), Error = Rejection> + Clone {
    warp::header::<i64>("x-user-id")
}

fn with_api(
    api: SharedReadingApi,
) -> impl Filter<Extract = (SharedReadingApi,), Error = Infallible> + Clone {
    warp::any().map(move || api.clone())
}

fn with_orchestrator(
    orchestrator: SharedOrchestrator,
) -> impl Filter<Extract = (SharedOrchestrator,), Error = Infallible> + Clone {
    warp::any().map(move || orchestrator.clone())
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// Query of the reader page; never rejects, so a malformed query reads page 1
fn read_query() -> impl Filter<Extract = (ReadQuery,), Error = Rejection> + Clone {
    warp::query::<Vec<(String, String)>>().map(ReadQuery::from)
}

/// Reading service API under `/api/v1`
pub fn reading_routes(
    api: SharedReadingApi,
) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    let stories_api = warp::path("api")
        .and(warp::path("v1"))
        .and(warp::path("stories"));
    let students_api = warp::path("api")
        .and(warp::path("v1"))
        .and(warp::path("students"));

    // GET /stories/read/{id}?page=N
    let read = stories_api
        .and(warp::path("read"))
        .and(warp::path::param::<i64>())
        .and(warp::path::end())
        .and(warp::get())
        .and(student_id())
        .and(read_query())
        .and(with_api(api.clone()))
        .and_then(reading::read_story_handler);

    // POST /stories/track
    let track = stories_api
        .and(warp::path("track"))
        .and(warp::path::end())
        .and(warp::post())
        .and(student_id())
        .and(json_body())
        .and(with_api(api.clone()))
        .and_then(reading::track_handler);

    // GET /stories/continue-reading
    let continue_reading = stories_api
        .and(warp::path("continue-reading"))
        .and(warp::path::end())
        .and(warp::get())
        .and(student_id())
        .and(with_api(api.clone()))
        .and_then(reading::continue_reading_handler);

    // GET /stories/library
    let library = stories_api
        .and(warp::path("library"))
        .and(warp::path::end())
        .and(warp::get())
        .and(student_id())
        .and(with_api(api.clone()))
        .and_then(stories::library_handler);

    // POST /stories/editor
    let create_story = stories_api
        .and(warp::path("editor"))
        .and(warp::path::end())
        .and(warp::post())
        .and(student_id())
        .and(json_body())
        .and(with_api(api.clone()))
        .and_then(stories::create_story_handler);

    let editor_item = stories_api
        .and(warp::path("editor"))
        .and(warp::path::param::<i64>())
        .and(warp::path::end());

    // GET /stories/editor/{id}
    let get_story = editor_item
        .and(warp::get())
        .and(student_id())
        .and(with_api(api.clone()))
        .and_then(stories::get_story_handler);

    // PATCH /stories/editor/{id}
    let update_story = editor_item
        .and(warp::patch())
        .and(student_id())
        .and(json_body())
        .and(with_api(api.clone()))
        .and_then(stories::update_story_handler);

    // DELETE /stories/editor/{id}
    let delete_story = editor_item
        .and(warp::delete())
        .and(student_id())
        .and(with_api(api.clone()))
        .and_then(stories::delete_story_handler);

    // GET /stories/mine/stats
    let stats = stories_api
        .and(warp::path("mine"))
        .and(warp::path("stats"))
        .and(warp::path::end())
        .and(warp::get())
        .and(student_id())
        .and(with_api(api.clone()))
        .and_then(stories::stats_handler);

    // POST /stories/rate
    let rate = stories_api
        .and(warp::path("rate"))
        .and(warp::path::end())
        .and(warp::post())
        .and(student_id())
        .and(json_body())
        .and(with_api(api.clone()))
        .and_then(stories::rate_handler);

    // POST /stories/dictionary
    let dictionary = stories_api
        .and(warp::path("dictionary"))
        .and(warp::path::end())
        .and(warp::post())
        .and(student_id())
        .and(json_body())
        .and(with_api(api.clone()))
        .and_then(writing::dictionary_handler);

    // POST /stories/chat
    let chat = stories_api
        .and(warp::path("chat"))
        .and(warp::path::end())
        .and(warp::post())
        .and(student_id())
        .and(json_body())
        .and(with_api(api.clone()))
        .and_then(writing::story_chat_handler);

    // POST /stories/realtime-check
    let realtime_check = stories_api
        .and(warp::path("realtime-check"))
        .and(warp::path::end())
        .and(warp::post())
        .and(student_id())
        .and(json_body())
        .and(with_api(api.clone()))
        .and_then(writing::realtime_check_handler);

    // GET /stories/tips
    let tips = stories_api
        .and(warp::path("tips"))
        .and(warp::path::end())
        .and(warp::get())
        .and(student_id())
        .and(with_api(api.clone()))
        .and_then(writing::tips_handler);

    // PUT /students/profile
    let profile = students_api
        .and(warp::path("profile"))
        .and(warp::path::end())
        .and(warp::put())
        .and(student_id())
        .and(json_body())
        .and(with_api(api.clone()))
        .and_then(students::upsert_profile_handler);

    // GET /students/achievements
    let achievements = students_api
        .and(warp::path("achievements"))
        .and(warp::path::end())
        .and(warp::get())
        .and(student_id())
        .and(with_api(api.clone()))
        .and_then(students::achievements_handler);

    // GET /students/vocabulary
    let vocabulary = students_api
        .and(warp::path("vocabulary"))
        .and(warp::path::end())
        .and(warp::get())
        .and(student_id())
        .and(with_api(api.clone()))
        .and_then(students::vocabulary_handler);

    // GET /students/activity
    let activity = students_api
        .and(warp::path("activity"))
        .and(warp::path::end())
        .and(warp::get())
        .and(student_id())
        .and(with_api(api))
        .and_then(students::activity_handler);

    let reading_group = read.or(track).or(continue_reading);
    let story_group = library
        .or(create_story)
        .or(get_story)
        .or(update_story)
        .or(delete_story)
        .or(stats)
        .or(rate);
    let writing_group = dictionary.or(chat).or(realtime_check).or(tips);
    let student_group = profile.or(achievements).or(vocabulary).or(activity);

    reading_group
        .or(story_group)
        .or(writing_group)
        .or(student_group)
        .recover(handle_rejection)
}

/// Assistant gateway API
pub fn assistant_routes(
    orchestrator: SharedOrchestrator,
) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    // POST /chat
    let chat = warp::path("chat")
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_orchestrator(orchestrator.clone()))
        .and_then(gateway::chat_handler);

    // POST /chat/stream
    let chat_stream = warp::path("chat")
        .and(warp::path("stream"))
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_orchestrator(orchestrator.clone()))
        .and_then(gateway::chat_stream_handler);

    // POST /learn
    let learn = warp::path("learn")
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_orchestrator(orchestrator.clone()))
        .and_then(gateway::learn_handler);

    // POST /grammar
    let grammar = warp::path("grammar")
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_orchestrator(orchestrator.clone()))
        .and_then(gateway::grammar_handler);

    let settings = warp::path("settings")
        .and(warp::path("assistant"))
        .and(warp::path::end());

    // GET /settings/assistant
    let get_settings = settings
        .and(warp::get())
        .and(with_orchestrator(orchestrator.clone()))
        .and_then(gateway::get_settings_handler);

    // POST /settings/assistant
    let save_settings = settings
        .and(warp::post())
        .and(json_body())
        .and(with_orchestrator(orchestrator))
        .and_then(gateway::save_settings_handler);

    // GET /health
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(gateway::health_handler);

    chat.or(chat_stream)
        .or(learn)
        .or(grammar)
        .or(get_settings)
        .or(save_settings)
        .or(health)
        .recover(handle_rejection)
}
