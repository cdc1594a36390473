use serde::{Deserialize, Serialize};

/// Sentinel URL for the shell-drawn new-tab page.
pub const NEW_TAB_URL: &str = "newtab";

/// Scheme used by pages the shell serves itself (settings, history, ...).
pub const INTERNAL_SCHEME: &str = "tabshell://";

/// Opaque tab identifier, stable for the tab's lifetime.
pub type TabId = String;

/// Returns true for pages that never enter global history.
pub fn is_internal_url(url: &str) -> bool {
    url == NEW_TAB_URL || url.starts_with(INTERNAL_SCHEME) || url.starts_with("about:")
}

/// A logical browser tab with its own navigation stack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub id: TabId,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default = "no_index", with = "history_index")]
    pub history_index: Option<usize>,
    #[serde(default)]
    pub is_incognito: bool,
    #[serde(default)]
    pub pinned: bool,
}

fn no_index() -> Option<usize> {
    None
}

impl TabRecord {
    /// Builds a record for `url`; the placeholder page starts with empty history.
    pub fn new(id: TabId, url: Option<&str>, is_incognito: bool) -> Self {
        let (url, history, history_index) = match url {
            Some(u) if u != NEW_TAB_URL => (u.to_string(), vec![u.to_string()], Some(0)),
            _ => (NEW_TAB_URL.to_string(), Vec::new(), None),
        };
        Self {
            id,
            url,
            title: None,
            history,
            history_index,
            is_incognito,
            pinned: false,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.url == NEW_TAB_URL
    }

    /// URL at the history cursor, if any.
    pub fn current_entry(&self) -> Option<&str> {
        self.history_index
            .and_then(|i| self.history.get(i))
            .map(String::as_str)
    }

    /// The entry one step back or forward from the cursor.
    pub fn neighbor(&self, forward: bool) -> Option<&str> {
        let index = self.history_index?;
        let target = if forward { index + 1 } else { index.checked_sub(1)? };
        self.history.get(target).map(String::as_str)
    }

    pub fn can_go_back(&self) -> bool {
        matches!(self.history_index, Some(i) if i > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        matches!(self.history_index, Some(i) if i + 1 < self.history.len())
    }

    /// Records a committed navigation to `url`.
    ///
    /// Re-entering the URL under the cursor leaves history alone; anything else
    /// drops the forward branch before appending. The new-tab sentinel is never
    /// recorded. Returns whether history changed.
    pub fn push_history(&mut self, url: &str) -> bool {
        if url == NEW_TAB_URL {
            return false;
        }
        self.url = url.to_string();
        if self.current_entry() == Some(url) {
            return false;
        }
        let keep = self.history_index.map_or(0, |i| i + 1);
        self.history.truncate(keep);
        self.history.push(url.to_string());
        self.history_index = Some(self.history.len() - 1);
        true
    }

    /// Moves the cursor by one step; `false` at the bounds.
    pub fn step(&mut self, forward: bool) -> bool {
        let allowed = if forward {
            self.can_go_forward()
        } else {
            self.can_go_back()
        };
        let Some(index) = self.history_index.filter(|_| allowed) else {
            return false;
        };
        let index = if forward { index + 1 } else { index - 1 };
        self.history_index = Some(index);
        self.url = self.history[index].clone();
        true
    }

    /// Restores the cursor invariant on records loaded from disk.
    pub fn sanitize(&mut self) {
        self.history_index = match (self.history.is_empty(), self.history_index) {
            (true, _) => None,
            (false, Some(i)) if i < self.history.len() => Some(i),
            (false, _) => Some(self.history.len() - 1),
        };
        if self.url.is_empty() {
            self.url = self
                .current_entry()
                .map(str::to_string)
                .unwrap_or_else(|| NEW_TAB_URL.to_string());
        }
    }
}

/// A closed tab kept for undo, with the strip position it occupied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClosedTab {
    pub record: TabRecord,
    pub index: usize,
}

/// Serializes the cursor as an integer, `-1` meaning "no entry".
mod history_index {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(i) => serializer.serialize_i64(*i as i64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = Option::<i64>::deserialize(deserializer)?;
        Ok(raw.filter(|i| *i >= 0).map(|i| i as usize))
    }
}
