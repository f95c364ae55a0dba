//! Process configuration read from the environment
//!
//! `.env` files are honoured through `dotenvy`. Every key has a default
//! except the credentials, so both services start with no configuration at
//! all: the reading service on an in-memory store, the gateway against the
//! public chat completions endpoint.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::llm::{GenerationConfig, OpenAiConfig};
use crate::store::{PgConfig, StoreError};
use crate::tts::http::HttpSynthesizerConfig;

pub const DEFAULT_READING_ADDR: &str = "127.0.0.1:3030";
pub const DEFAULT_ASSISTANT_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8000";
pub const DEFAULT_SETTINGS_PATH: &str = "assistant_config.json";
pub const DEFAULT_TEMPERATURE: f32 = 0.4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid DATABASE_URL: {0}")]
    Database(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub reading_addr: SocketAddr,
    pub assistant_addr: SocketAddr,
    /// `None` runs the reading service on the in-memory store
    pub database: Option<PgConfig>,
    /// Base URL of the assistant gateway, as seen from the reading service
    pub gateway_url: String,
    pub llm: OpenAiConfig,
    pub generation: GenerationConfig,
    /// `None` disables speech synthesis
    pub tts: Option<HttpSynthesizerConfig>,
    /// Attach synthesized speech to chat replies
    pub speak_chat: bool,
    pub settings_path: PathBuf,
}

impl AppConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database = match get("DATABASE_URL") {
            Some(url) => {
                let config = PgConfig::from_connection_string(&url)?;
                Some(match parse_opt::<usize>(&get, "DATABASE_POOL_SIZE")? {
                    Some(size) => config.with_max_pool_size(size),
                    None => config,
                })
            }
            None => None,
        };

        let llm_defaults = OpenAiConfig::default();
        let llm = OpenAiConfig {
            base_url: get("LLM_BASE_URL").unwrap_or(llm_defaults.base_url),
            api_key: get("LLM_API_KEY").or_else(|| get("OPENAI_API_KEY")),
            model: get("LLM_MODEL").unwrap_or(llm_defaults.model),
            timeout: parse_opt::<u64>(&get, "LLM_TIMEOUT")?
                .map(Duration::from_secs)
                .unwrap_or(llm_defaults.timeout),
        };

        let temperature = parse_opt::<f32>(&get, "LLM_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE);
        let generation = GenerationConfig::default().with_temperature(temperature);

        let tts = if parse_opt::<bool>(&get, "TTS_ENABLED")?.unwrap_or(false) {
            let defaults = HttpSynthesizerConfig::default();
            Some(HttpSynthesizerConfig {
                base_url: get("TTS_BASE_URL").unwrap_or(defaults.base_url),
                api_key: get("TTS_API_KEY"),
                model: get("TTS_MODEL").unwrap_or(defaults.model),
                voice: get("TTS_VOICE").unwrap_or(defaults.voice),
                timeout: defaults.timeout,
            })
        } else {
            None
        };

        Ok(Self {
            reading_addr: parse_or(&get, "READING_ADDR", DEFAULT_READING_ADDR)?,
            assistant_addr: parse_or(&get, "ASSISTANT_ADDR", DEFAULT_ASSISTANT_ADDR)?,
            database,
            gateway_url: get("AI_SERVICE_URL").unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
            llm,
            generation,
            tts,
            speak_chat: parse_opt::<bool>(&get, "TTS_SPEAK_CHAT")?.unwrap_or(false),
            settings_path: get("ASSISTANT_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH)),
        })
    }
}

fn parse_opt<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(key)
        .map(|value| {
            value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                key,
                value: value.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get(key).unwrap_or_else(|| default.to_string());
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })
}
