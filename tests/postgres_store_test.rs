mod common;

use std::sync::Arc;

use chrono::Utc;
use owlbert::reading::{ReadingService, ReadingTrack, StoryMetrics};
use owlbert::store::{
    ActivityKind, NewStory, PgConfig, PgStore, ReadingStore, StudentProfile, TrackUpdate,
};
use testcontainers::clients::Cli;

/// Connect, retrying while the container finishes its init restart
async fn connect(connection_string: &str) -> PgStore {
    let config = PgConfig::from_connection_string(connection_string).unwrap();
    let mut last_error = None;
    for _ in 0..30 {
        match PgStore::connect(config.clone()).await {
            Ok(store) => return store,
            Err(e) => last_error = Some(e),
        }
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    }
    panic!("could not connect: {:?}", last_error);
}

fn new_story(title: &str, content: &str) -> NewStory {
    NewStory {
        author_id: 1,
        title: title.to_string(),
        author_name: "Admin".to_string(),
        metrics: StoryMetrics::from_content(content),
        content: content.to_string(),
        grade: 3,
        is_draft: false,
    }
}

#[tokio::test]
#[ignore] // Needs Docker; run with --ignored
async fn test_story_roundtrip_and_filters() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let port = container.get_host_port_ipv4(common::POSTGRES_PORT);
    let store = connect(&common::build_connection_string("127.0.0.1", port)).await;

    let story = store
        .insert_story(new_story("Owls", &common::words(310)))
        .await
        .unwrap();
    assert_eq!(story.total_pages, 3);
    assert_eq!(story.rating, 4.5);

    let mut draft = new_story("Draft", "hoot");
    draft.is_draft = true;
    store.insert_story(draft).await.unwrap();

    assert_eq!(store.published_stories(None).await.unwrap().len(), 1);
    assert_eq!(store.published_stories(Some(5)).await.unwrap().len(), 0);
    assert_eq!(store.stories_by_author(1).await.unwrap().len(), 2);

    let mut edited = story.clone();
    edited.title = "Night Owls".to_string();
    let updated = store.update_story(&edited).await.unwrap().unwrap();
    assert_eq!(updated.title, "Night Owls");
    assert!(updated.updated_at >= story.updated_at);

    assert!(store.delete_story(story.id).await.unwrap());
    assert!(store.story(story.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Needs Docker; run with --ignored
async fn test_completion_flip_is_conditional_across_pools() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let port = container.get_host_port_ipv4(common::POSTGRES_PORT);
    let connection_string = common::build_connection_string("127.0.0.1", port);

    // Two stores with separate pools stand in for two service processes
    let first = connect(&connection_string).await;
    let second = connect(&connection_string).await;

    let story = first
        .insert_story(new_story("Race", &common::words(310)))
        .await
        .unwrap();
    first
        .upsert_profile(&StudentProfile::new(7, "Ada", 3))
        .await
        .unwrap();

    let mut track = ReadingTrack::start(7, story.id, story.total_pages, Utc::now());
    track.view_page(3, story.total_pages, Utc::now());
    let update = TrackUpdate {
        track,
        started: true,
        completed: true,
        story_title: story.title.clone(),
    };

    let (a, b) = tokio::join!(first.save_track(update.clone()), second.save_track(update));
    let recorded = [a.unwrap(), b.unwrap()]
        .iter()
        .filter(|outcome| outcome.completion_recorded)
        .count();
    assert_eq!(recorded, 1);

    let profile = first.profile(7).await.unwrap().unwrap();
    assert_eq!(profile.total_books_read, 1);

    let completes = first
        .recent_activity(7, 50)
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.kind == ActivityKind::ReadComplete)
        .count();
    assert_eq!(completes, 1);
}

#[tokio::test]
#[ignore] // Needs Docker; run with --ignored
async fn test_reading_service_on_postgres() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let port = container.get_host_port_ipv4(common::POSTGRES_PORT);
    let store = Arc::new(connect(&common::build_connection_string("127.0.0.1", port)).await);

    let story = store
        .insert_story(new_story("Owls", &common::words(310)))
        .await
        .unwrap();
    store
        .upsert_profile(&StudentProfile::new(7, "Ada", 3))
        .await
        .unwrap();

    let service = ReadingService::new(store.clone());
    service.read_page(7, story.id, 2).await.unwrap();
    let unfinished = service.continue_reading(7).await.unwrap();
    assert_eq!(unfinished.len(), 1);
    assert_eq!(unfinished[0].story_title, "Owls");

    service.read_page(7, story.id, 3).await.unwrap();
    service.read_page(7, story.id, 3).await.unwrap();
    service.read_page(7, story.id, 1).await.unwrap();

    let track = store.track(7, story.id).await.unwrap().unwrap();
    assert!(track.is_completed);
    assert_eq!(track.current_page, 1);
    assert_eq!(store.profile(7).await.unwrap().unwrap().total_books_read, 1);
    assert!(service.continue_reading(7).await.unwrap().is_empty());

    // Deleting the story takes its tracks with it
    store.delete_story(story.id).await.unwrap();
    assert!(store.track(7, story.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Needs Docker; run with --ignored
async fn test_vocabulary_on_postgres() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let port = container.get_host_port_ipv4(common::POSTGRES_PORT);
    let store = connect(&common::build_connection_string("127.0.0.1", port)).await;

    store.record_word_search("Owl").await.unwrap();
    let entry = store.record_word_search("owl").await.unwrap();
    assert_eq!(entry.word, "owl");
    assert_eq!(entry.search_count, 2);

    store.set_word_definition("owl", "A bird.").await.unwrap();
    let saved = store.save_word(7, "owl", "A bird.").await.unwrap();
    let again = store.save_word(7, "owl", "Changed").await.unwrap();
    assert_eq!(again.definition, saved.definition);
    assert_eq!(store.saved_words(7).await.unwrap().len(), 1);
}
