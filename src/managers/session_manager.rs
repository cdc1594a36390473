//! Session Manager for Tabshell.
//!
//! Reads and writes the tab collection under its store keys: the live state
//! rewritten after every tab mutation, the snapshot taken at shutdown, and
//! the closed-tab undo stack. Write failures are logged and swallowed; read
//! failures and malformed values come back as empty defaults.

use crate::storage::{keys, read_json, write_json, SharedStore};
use crate::types::errors::StoreError;
use crate::types::session::SessionSnapshot;
use crate::types::tab::{ClosedTab, TabId, TabRecord};

/// Trait defining session persistence operations.
pub trait SessionManagerTrait {
    fn load_live(&self) -> SessionSnapshot;
    fn save_live(&self, tabs: &[TabRecord], current_tab_id: Option<&str>);
    fn load_last_session(&self) -> SessionSnapshot;
    fn save_snapshot(&self, snapshot: &SessionSnapshot);
    fn has_last_session(&self) -> bool;
    fn load_closed_tabs(&self) -> Vec<ClosedTab>;
    fn save_closed_tabs(&self, closed: &[ClosedTab]);
    fn clear(&self);
}

pub struct SessionManager {
    store: SharedStore,
}

impl SessionManager {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    fn load_pair(&self, tabs_key: &str, current_key: &str) -> SessionSnapshot {
        let tabs: Vec<TabRecord> = read_json(self.store.as_ref(), tabs_key);
        let current_tab_id: Option<TabId> = read_json(self.store.as_ref(), current_key);
        SessionSnapshot {
            tabs,
            current_tab_id,
        }
    }

    fn save_pair(
        &self,
        tabs_key: &str,
        current_key: &str,
        tabs: &[TabRecord],
        current_tab_id: Option<&str>,
    ) -> Result<(), StoreError> {
        write_json(self.store.as_ref(), tabs_key, tabs)?;
        write_json(self.store.as_ref(), current_key, &current_tab_id)
    }
}

impl SessionManagerTrait for SessionManager {
    fn load_live(&self) -> SessionSnapshot {
        self.load_pair(keys::TABS, keys::CURRENT_TAB_ID)
    }

    fn save_live(&self, tabs: &[TabRecord], current_tab_id: Option<&str>) {
        if let Err(e) = self.save_pair(keys::TABS, keys::CURRENT_TAB_ID, tabs, current_tab_id) {
            tracing::error!(error = %e, "failed to persist tabs");
        }
    }

    fn load_last_session(&self) -> SessionSnapshot {
        self.load_pair(keys::LAST_SESSION_TABS, keys::LAST_CURRENT_TAB_ID)
    }

    fn save_snapshot(&self, snapshot: &SessionSnapshot) {
        let result = self.save_pair(
            keys::LAST_SESSION_TABS,
            keys::LAST_CURRENT_TAB_ID,
            &snapshot.tabs,
            snapshot.current_tab_id.as_deref(),
        );
        match result {
            Ok(()) => tracing::info!(tabs = snapshot.tabs.len(), "session snapshot saved"),
            Err(e) => tracing::error!(error = %e, "failed to save session snapshot"),
        }
    }

    fn has_last_session(&self) -> bool {
        !self.load_last_session().is_empty()
    }

    fn load_closed_tabs(&self) -> Vec<ClosedTab> {
        read_json(self.store.as_ref(), keys::CLOSED_TABS)
    }

    fn save_closed_tabs(&self, closed: &[ClosedTab]) {
        if let Err(e) = write_json(self.store.as_ref(), keys::CLOSED_TABS, closed) {
            tracing::error!(error = %e, "failed to persist closed tabs");
        }
    }

    /// Removes every session key.
    fn clear(&self) {
        for key in [
            keys::TABS,
            keys::CURRENT_TAB_ID,
            keys::CLOSED_TABS,
            keys::LAST_SESSION_TABS,
            keys::LAST_CURRENT_TAB_ID,
        ] {
            if let Err(e) = self.store.remove(key) {
                tracing::error!(key, error = %e, "failed to clear session key");
            }
        }
    }
}
