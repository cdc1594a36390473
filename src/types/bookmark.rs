use serde::{Deserialize, Serialize};

use super::history::host_of;

/// A bookmark or quick link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub url: String,
    pub label: String,
}

impl Link {
    pub fn new(url: &str, label: &str) -> Self {
        Self {
            url: url.to_string(),
            label: label.to_string(),
        }
    }
}

/// Persisted shape of a link: older builds stored bare URL strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredLink {
    Full(Link),
    Legacy(String),
}

impl StoredLink {
    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredLink::Legacy(_))
    }

    /// Converts to a `Link`, labelling legacy entries by host.
    pub fn into_link(self) -> Link {
        match self {
            StoredLink::Full(link) => link,
            StoredLink::Legacy(url) => {
                let label = host_of(&url).unwrap_or_else(|| url.clone());
                Link { url, label }
            }
        }
    }
}
