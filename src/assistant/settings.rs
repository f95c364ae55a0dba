//! Persistent assistant settings
//!
//! A small JSON file holds the assistant's name and behavior prompt. The file
//! is created with defaults on first use. A file that cannot be read or parsed
//! is reported and the defaults are used in its place; the broken file is left
//! alone until the next explicit save.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub const DEFAULT_NAME: &str = "Cindy";
pub const DEFAULT_BEHAVIOR: &str = "You are a helpful and friendly voice chat assistant. \
Keep your responses concise and conversational, suitable for speech output.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub name: String,
    /// Used verbatim as the base system prompt
    pub behavior_settings: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            behavior_settings: DEFAULT_BEHAVIOR.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub struct SettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SettingsStore {
    /// Open the settings file at `path`, writing defaults if it does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let store = Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        };

        if !tokio::fs::try_exists(&store.path).await? {
            info!(path = %store.path.display(), "creating default assistant settings");
            store.save(&AssistantConfig::default()).await?;
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings; defaults when the file is missing or corrupt.
    pub async fn load(&self) -> AssistantConfig {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "assistant settings unreadable, using defaults");
                return AssistantConfig::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "assistant settings corrupt, using defaults");
                AssistantConfig::default()
            }
        }
    }

    /// Replace the stored settings.
    ///
    /// Written to a sibling temp file and renamed over the original, so
    /// readers never observe a half-written file.
    pub async fn save(&self, config: &AssistantConfig) -> Result<(), SettingsError> {
        let _guard = self.write_lock.lock().await;

        let json = serde_json::to_string_pretty(config)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
