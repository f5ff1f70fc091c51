use crate::error::AppResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{info, warn};

/// Connection settings for the calendar collection
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// URL of the calendar collection events are written into
    pub server_url: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Owner of the persisted settings; consumers only read from it
pub trait SettingsProvider: Send + Sync {
    /// Current settings, if any have been saved
    fn get(&self) -> Option<Settings>;

    /// Replace the saved settings
    fn set(&self, settings: Settings) -> AppResult<()>;
}

/// Settings kept in a TOML file
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsProvider for FileSettingsStore {
    fn get(&self) -> Option<Settings> {
        let content = fs::read_to_string(&self.path).ok()?;
        match toml::from_str::<Settings>(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!("Ignoring unreadable settings file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set(&self, settings: Settings) -> AppResult<()> {
        // Create the parent directory if it doesn't exist
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_str = toml::to_string(&settings)?;
        fs::write(&self.path, toml_str)?;
        info!("Saved settings to {}", self.path.display());

        Ok(())
    }
}

/// In-memory settings, for tests and embedding hosts
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: RwLock<Option<Settings>>,
}

impl MemorySettingsStore {
    pub fn new(settings: Option<Settings>) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

impl SettingsProvider for MemorySettingsStore {
    fn get(&self) -> Option<Settings> {
        self.settings
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn set(&self, settings: Settings) -> AppResult<()> {
        let mut guard = self
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(settings);
        Ok(())
    }
}
