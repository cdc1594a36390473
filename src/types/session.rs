use serde::{Deserialize, Serialize};

use super::tab::{TabId, TabRecord};

/// Tab collection plus the current tab, as saved for restore.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub tabs: Vec<TabRecord>,
    pub current_tab_id: Option<TabId>,
}

impl SessionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}
