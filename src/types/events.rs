use serde::{Deserialize, Serialize};

use super::settings::{ThemeMode, WidgetSettings};

/// Identifies one shell window (main, incognito, settings, ...).
pub type WindowId = String;

/// Everything windows tell each other. Handlers must be idempotent: delivery
/// is at most once and unordered across publishers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BrowserEvent {
    ThemeChanged { theme: ThemeMode },
    SettingsChanged { key: String, value: serde_json::Value },
    WidgetSettingsChanged { widgets: WidgetSettings },
    HistoryUpdated,
    HistoryClearRequested,
    TabDropped { target: WindowId, url: String },
}

/// A broadcast event stamped with the window that published it.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub origin: WindowId,
    pub event: BrowserEvent,
}
