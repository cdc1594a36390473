use thiserror::Error;

// === StoreError ===

/// Errors raised by key-value store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The SQLite backend rejected the operation.
    #[error("Store database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A value could not be encoded or decoded.
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The store worker is gone or its lock is poisoned.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

// === TabError ===

/// Errors related to tab management operations.
#[derive(Debug, Error)]
pub enum TabError {
    /// Tab with the given ID was not found.
    #[error("Tab not found: {0}")]
    NotFound(String),
    /// The provided tab index is out of bounds.
    #[error("Invalid tab index: {0}")]
    InvalidIndex(usize),
}

// === BookmarkError ===

/// Errors related to bookmark and quick-link collections.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// A link with the same URL already exists.
    #[error("Duplicate link URL: {0}")]
    DuplicateUrl(String),
    /// No link at the given position.
    #[error("Invalid link index: {0}")]
    InvalidIndex(usize),
    /// The URL is empty or not navigable.
    #[error("Invalid link URL: {0}")]
    InvalidUrl(String),
    /// Persisting the collection failed.
    #[error("Link store error: {0}")]
    Store(#[from] StoreError),
}

// === SettingsError ===

/// Errors related to settings updates.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The dot-notation key does not name a setting.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The value does not fit the setting's type.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    /// Settings could not be encoded or decoded.
    #[error("Settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Persisting the settings failed.
    #[error("Settings store error: {0}")]
    Store(#[from] StoreError),
}

// === ConfigError ===

/// Errors loading the shell configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },
}
