use serde::{Deserialize, Serialize};
use url::Url;

/// A single global history entry; visit order is its position in the log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub visited_at: i64,
}

impl HistoryEntry {
    /// Builds an entry for `url`, deriving `host` from it.
    pub fn new(url: &str, title: Option<&str>, visited_at: i64) -> Self {
        Self {
            url: url.to_string(),
            host: host_of(url),
            title: title.map(str::to_string),
            visited_at,
        }
    }
}

/// Extracts the lowercased host of `url`, without port, credentials, or IPv6
/// brackets. `None` for relative or host-less URLs.
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}
