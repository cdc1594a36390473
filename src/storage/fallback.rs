//! Primary/secondary store composition.

use std::collections::BTreeSet;

use super::{KeyValueStore, SharedStore};
use crate::types::errors::StoreError;

/// Writes go to the primary; when that fails the value is written to the
/// secondary instead. Reads prefer the primary and fall back the same way.
///
/// After a restart, a value that only reached the secondary is shadowed by an
/// older copy in the primary file.
pub struct FallbackStore {
    primary: SharedStore,
    secondary: SharedStore,
}

impl FallbackStore {
    pub fn new(primary: SharedStore, secondary: SharedStore) -> Self {
        Self { primary, secondary }
    }
}

impl KeyValueStore for FallbackStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.primary.get(key) {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => self.secondary.get(key).or(Ok(None)),
            Err(e) => {
                tracing::warn!(key, error = %e, "primary store read failed, using secondary");
                self.secondary.get(key)
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self.primary.set(key, value) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(key, error = %e, "primary store write failed, using secondary");
                self.secondary.set(key, value)
            }
        }
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let primary = self.primary.remove(key);
        let secondary = self.secondary.remove(key);
        primary.or(secondary)
    }

    fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = BTreeSet::new();
        let primary = self.primary.list_keys();
        let secondary = self.secondary.list_keys();
        if primary.is_err() && secondary.is_err() {
            return primary;
        }
        keys.extend(primary.unwrap_or_default());
        keys.extend(secondary.unwrap_or_default());
        Ok(keys.into_iter().collect())
    }
}
