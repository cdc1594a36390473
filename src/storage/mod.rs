//! Durable key-value storage for session, history, bookmarks, and settings.
//!
//! Values are JSON-encoded strings keyed by name. Backends:
//! - [`FileStore`]: the primary store, a single JSON file.
//! - [`SqliteStore`]: the secondary local store.
//! - [`MemoryStore`]: process-local, for incognito windows and tests.
//!
//! [`FallbackStore`] composes a primary with a secondary, and [`StoreBridge`]
//! serves any store asynchronously from a dedicated worker.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::errors::StoreError;

pub mod bridge;
pub mod fallback;
pub mod file_store;
pub mod memory_store;
pub mod sqlite_store;

pub use bridge::StoreBridge;
pub use fallback::FallbackStore;
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;

/// Persisted state keys.
pub mod keys {
    pub const TABS: &str = "tabs";
    pub const CURRENT_TAB_ID: &str = "currentTabId";
    pub const BROWSER_HISTORY: &str = "browserHistory";
    pub const CLOSED_TABS: &str = "closedTabs";
    pub const LAST_SESSION_TABS: &str = "lastSessionTabs";
    pub const LAST_CURRENT_TAB_ID: &str = "lastCurrentTabId";
    pub const BOOKMARKS: &str = "bookmarks";
    pub const QUICK_LINKS: &str = "quickLinks";
    pub const SETTINGS: &str = "settings";
}

/// String-keyed storage of JSON-encoded values.
///
/// There are no transactions: concurrent writers to one key race and the last
/// write wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    fn list_keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Shared handle used by every component of a window.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Reads and decodes `key`, substituting `T::default()` when the key is
/// missing, unreadable, or malformed.
pub fn read_json<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "malformed persisted value, using default");
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "store read failed, using default");
            T::default()
        }
    }
}

/// Encodes `value` and writes it under `key`.
pub fn write_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
