//! Shell configuration.
//!
//! Read from `<config_dir>/shell.json` when present, then overridden by
//! `TABSHELL_*` environment variables. Every field has a default, so an empty
//! or partial file is valid.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::managers::history_buffer::{DEFAULT_FLUSH_DELAY, DEFAULT_HISTORY_LIMIT};
use crate::managers::tab_manager::{LastTabPolicy, DEFAULT_CLOSED_TAB_LIMIT};
use crate::platform;
use crate::services::event_bus::DEFAULT_CAPACITY;
use crate::storage::{FallbackStore, FileStore, SharedStore, SqliteStore};
use crate::types::errors::{ConfigError, StoreError};

pub const CONFIG_FILE: &str = "shell.json";

pub const ENV_DATA_DIR: &str = "TABSHELL_DATA_DIR";
pub const ENV_LAST_TAB: &str = "TABSHELL_LAST_TAB";
pub const ENV_HISTORY_FLUSH_MS: &str = "TABSHELL_HISTORY_FLUSH_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Directory holding both stores.
    pub data_dir: PathBuf,
    /// Primary store file name, relative to `data_dir`.
    pub store_file: String,
    /// Secondary SQLite store file name, relative to `data_dir`.
    pub fallback_db: String,
    pub history_limit: usize,
    pub history_flush_ms: u64,
    pub closed_tab_limit: usize,
    pub last_tab_policy: LastTabPolicy,
    pub event_capacity: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            data_dir: platform::get_data_dir(),
            store_file: "store.json".to_string(),
            fallback_db: "fallback.db".to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            history_flush_ms: DEFAULT_FLUSH_DELAY.as_millis() as u64,
            closed_tab_limit: DEFAULT_CLOSED_TAB_LIMIT,
            last_tab_policy: LastTabPolicy::default(),
            event_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl ShellConfig {
    /// Loads the platform config file and applies process environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = platform::get_config_dir().join(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Like [`ShellConfig::load`], but falls back to defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default shell configuration");
            Self::default()
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Applies overrides looked up through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = var(ENV_DATA_DIR).filter(|d| !d.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(policy) = var(ENV_LAST_TAB) {
            self.last_tab_policy = match policy.as_str() {
                "quit" | "quit-application" => LastTabPolicy::QuitApplication,
                "replace" | "replace-with-new-tab" => LastTabPolicy::ReplaceWithNewTab,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: ENV_LAST_TAB.to_string(),
                        value: policy,
                    })
                }
            };
        }
        if let Some(ms) = var(ENV_HISTORY_FLUSH_MS) {
            self.history_flush_ms = ms.parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_HISTORY_FLUSH_MS.to_string(),
                value: ms,
            })?;
        }
        Ok(())
    }

    pub fn history_flush_delay(&self) -> Duration {
        Duration::from_millis(self.history_flush_ms)
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(&self.store_file)
    }

    pub fn fallback_db_path(&self) -> PathBuf {
        self.data_dir.join(&self.fallback_db)
    }

    /// Opens the file store with the SQLite store behind it.
    ///
    /// If only one of the two can be opened, that one is used alone.
    pub fn open_store(&self) -> Result<SharedStore, StoreError> {
        let primary = FileStore::open(self.store_path());
        let secondary = SqliteStore::open(self.fallback_db_path());
        match (primary, secondary) {
            (Ok(p), Ok(s)) => Ok(Arc::new(FallbackStore::new(Arc::new(p), Arc::new(s)))),
            (Ok(p), Err(e)) => {
                tracing::warn!(error = %e, "secondary store unavailable");
                Ok(Arc::new(p))
            }
            (Err(e), Ok(s)) => {
                tracing::warn!(error = %e, "primary store unavailable, using secondary");
                Ok(Arc::new(s))
            }
            (Err(e), Err(_)) => Err(e),
        }
    }
}
