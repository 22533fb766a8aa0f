// ABOUTME: Settings persistence behind a store trait
// ABOUTME: TOML file store under the home directory plus an in-memory store for tests

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use crate::error::{SettingsError, SettingsResult};
use crate::types::Settings;

/// Where settings live and how they are read and written.
///
/// Components take the store explicitly so tests can swap in a
/// [`MemoryStore`] without touching the filesystem.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> SettingsResult<Settings>;
    async fn save(&self, settings: &Settings) -> SettingsResult<()>;
}

/// TOML-backed store, by default at `~/.edgecron/settings.toml`
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new() -> SettingsResult<Self> {
        let home_dir = dirs::home_dir().ok_or(SettingsError::HomeDir)?;
        Ok(Self {
            path: home_dir.join(".edgecron").join("settings.toml"),
        })
    }

    /// Use an explicit file path instead of the home directory default
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for FileStore {
    async fn load(&self) -> SettingsResult<Settings> {
        if !self.path.exists() {
            tracing::debug!("No settings file at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path).await?;
        toml::from_str(&content).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    async fn save(&self, settings: &Settings) -> SettingsResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = toml::to_string_pretty(settings)
            .map_err(|e| SettingsError::Serialize(e.to_string()))?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

/// Ephemeral store holding one settings value behind a lock
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Settings>,
}

impl MemoryStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Mutex::new(settings),
        }
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load(&self) -> SettingsResult<Settings> {
        Ok(self.inner.lock().await.clone())
    }

    async fn save(&self, settings: &Settings) -> SettingsResult<()> {
        *self.inner.lock().await = settings.clone();
        Ok(())
    }
}
