use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::tab::NEW_TAB_URL;

/// Top-level browser settings container.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BrowserSettings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub appearance: AppearanceSettings,
    #[serde(default)]
    pub widgets: WidgetSettings,
}

/// General browser settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralSettings {
    pub startup_behavior: StartupBehavior,
    pub homepage: String,
    pub search_engine: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            startup_behavior: StartupBehavior::Restore,
            homepage: "https://duckduckgo.com".to_string(),
            search_engine: "duckduckgo".to_string(),
        }
    }
}

impl GeneralSettings {
    /// Query URL on the configured search engine. A `search_engine` holding
    /// `%s` is used as a template; unknown names fall back to DuckDuckGo.
    pub fn search_url(&self, query: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let engine = self.search_engine.trim();
        if engine.contains("%s") {
            return engine.replace("%s", &encoded);
        }
        let base = match engine.to_lowercase().as_str() {
            "google" => "https://www.google.com/search?q=",
            "bing" => "https://www.bing.com/search?q=",
            "startpage" => "https://www.startpage.com/do/search?q=",
            "brave" => "https://search.brave.com/search?q=",
            _ => "https://duckduckgo.com/?q=",
        };
        format!("{}{}", base, encoded)
    }

    /// Turns address-bar input into something to navigate to: URLs pass
    /// through, bare domains get `https://`, anything else is searched.
    pub fn resolve_address(&self, input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return NEW_TAB_URL.to_string();
        }
        if trimmed.contains("://") || trimmed.starts_with("about:") {
            return trimmed.to_string();
        }
        if trimmed.contains('.') && !trimmed.contains(char::is_whitespace) {
            return format!("https://{}", trimmed);
        }
        self.search_url(trimmed)
    }
}

/// What the browser does on startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum StartupBehavior {
    Restore,
    NewTab,
    Homepage,
}

/// Appearance settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppearanceSettings {
    pub theme: ThemeMode,
}

/// Theme mode selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum ThemeMode {
    Dark,
    Light,
    #[default]
    System,
}

/// Visibility of the new-tab page widgets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WidgetSettings {
    pub clock: bool,
    pub weather: bool,
    pub news: bool,
    pub quick_links: bool,
    pub bookmarks_bar: bool,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            clock: true,
            weather: false,
            news: false,
            quick_links: true,
            bookmarks_bar: true,
        }
    }
}
