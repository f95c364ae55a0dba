//! Wiring of configuration, storage and clients into the two HTTP services

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::assistant::settings::SettingsError;
use crate::assistant::{Orchestrator, SettingsStore};
use crate::config::{AppConfig, ConfigError};
use crate::gateway::{GatewayClient, GatewayError};
use crate::handlers::ReadingApi;
use crate::llm::{create_provider, LlmError};
use crate::routes::{assistant_routes, reading_routes};
use crate::store::{MemoryStore, PgStore, ReadingStore, StoreError};
use crate::tts::{DisabledSynthesizer, HttpSynthesizer, SpeechSynthesizer, TtsError};

/// Startup failures of either service
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Tts(#[from] TtsError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// PostgreSQL when a database is configured, otherwise the in-memory store.
pub async fn build_store(config: &AppConfig) -> Result<Arc<dyn ReadingStore>, ServeError> {
    match &config.database {
        Some(pg) => {
            info!(host = %pg.host, database = %pg.database, "using PostgreSQL store");
            Ok(Arc::new(PgStore::connect(pg.clone()).await?))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub async fn build_reading_api(config: &AppConfig) -> Result<ReadingApi, ServeError> {
    let store = build_store(config).await?;
    let gateway = GatewayClient::new(config.gateway_url.clone())?;
    Ok(ReadingApi::new(store, gateway))
}

pub async fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator, ServeError> {
    let llm = create_provider(config.llm.clone())?;
    let tts: Arc<dyn SpeechSynthesizer> = match &config.tts {
        Some(tts) => {
            info!(base_url = %tts.base_url, voice = %tts.voice, "speech synthesis enabled");
            Arc::new(HttpSynthesizer::new(tts.clone())?)
        }
        None => Arc::new(DisabledSynthesizer),
    };
    let settings = SettingsStore::open(config.settings_path.clone()).await?;

    Ok(Orchestrator::new(llm, tts, settings, config.generation.clone())
        .with_chat_speech(config.speak_chat))
}

pub async fn run_reading(config: AppConfig) -> Result<(), ServeError> {
    let api = Arc::new(build_reading_api(&config).await?);
    let routes = reading_routes(api);

    info!(addr = %config.reading_addr, gateway = %config.gateway_url, "reading service listening");
    warp::serve(routes).run(config.reading_addr).await;
    Ok(())
}

pub async fn run_assistant(config: AppConfig) -> Result<(), ServeError> {
    let orchestrator = Arc::new(build_orchestrator(&config).await?);
    let routes = assistant_routes(orchestrator);

    info!(addr = %config.assistant_addr, model = %config.llm.model, "assistant gateway listening");
    warp::serve(routes).run(config.assistant_addr).await;
    Ok(())
}
