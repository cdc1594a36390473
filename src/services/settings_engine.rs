// Tabshell Settings Engine
// Process-wide settings persisted in the key-value store and propagated to
// every open window: local persist, then broadcast, then apply-only remotely.

use serde_json::Value;

use crate::services::event_bus::Publisher;
use crate::storage::{keys, read_json, write_json, SharedStore};
use crate::types::errors::SettingsError;
use crate::types::events::BrowserEvent;
use crate::types::settings::{BrowserSettings, ThemeMode, WidgetSettings};

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> &BrowserSettings;
    fn get_settings(&self) -> &BrowserSettings;
    fn set_theme(&mut self, theme: ThemeMode);
    fn set_widgets(&mut self, widgets: WidgetSettings);
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self);
    fn apply_remote(&mut self, event: &BrowserEvent) -> bool;
}

/// Settings engine backed by the shared store.
pub struct SettingsEngine {
    store: SharedStore,
    publisher: Publisher,
    settings: BrowserSettings,
}

impl SettingsEngine {
    pub fn new(store: SharedStore, publisher: Publisher) -> Self {
        Self {
            store,
            publisher,
            settings: BrowserSettings::default(),
        }
    }

    /// Writes the current settings; failures are logged, never surfaced.
    fn persist(&self) {
        if let Err(e) = write_json(self.store.as_ref(), keys::SETTINGS, &self.settings) {
            tracing::error!(error = %e, "failed to persist settings");
        }
    }

    /// Returns a copy of `settings` with the dot-notation `key` replaced by `value`.
    ///
    /// The update goes through `serde_json::Value` and back, so a value of the
    /// wrong shape is rejected by deserialization.
    fn updated(
        settings: &BrowserSettings,
        key: &str,
        value: Value,
    ) -> Result<BrowserSettings, SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let parts: Vec<&str> = key.split('.').collect();
        let mut json_value = serde_json::to_value(settings)?;

        {
            let (last, path) = match parts.split_last() {
                Some(split) => split,
                None => return Err(SettingsError::InvalidKey(key.to_string())),
            };
            let mut current = &mut json_value;
            for part in path {
                current = current
                    .get_mut(*part)
                    .ok_or_else(|| SettingsError::InvalidKey(format!("Key '{}' not found in settings", key)))?;
            }
            match current {
                Value::Object(map) if map.contains_key(*last) => {
                    map.insert(last.to_string(), value);
                }
                _ => {
                    return Err(SettingsError::InvalidKey(format!(
                        "Key '{}' not found in settings",
                        key
                    )));
                }
            }
        }

        serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })
    }

    /// The event other windows need to mirror an update of `key`.
    fn event_for(&self, key: &str, value: Value) -> BrowserEvent {
        if key == "appearance.theme" {
            BrowserEvent::ThemeChanged {
                theme: self.settings.appearance.theme.clone(),
            }
        } else if key == "widgets" || key.starts_with("widgets.") {
            BrowserEvent::WidgetSettingsChanged {
                widgets: self.settings.widgets.clone(),
            }
        } else {
            BrowserEvent::SettingsChanged {
                key: key.to_string(),
                value,
            }
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the store; missing or malformed data yields defaults.
    fn load(&mut self) -> &BrowserSettings {
        self.settings = read_json(self.store.as_ref(), keys::SETTINGS);
        &self.settings
    }

    fn get_settings(&self) -> &BrowserSettings {
        &self.settings
    }

    fn set_theme(&mut self, theme: ThemeMode) {
        self.settings.appearance.theme = theme.clone();
        self.persist();
        self.publisher.publish(BrowserEvent::ThemeChanged { theme });
    }

    fn set_widgets(&mut self, widgets: WidgetSettings) {
        self.settings.widgets = widgets.clone();
        self.persist();
        self.publisher
            .publish(BrowserEvent::WidgetSettingsChanged { widgets });
    }

    /// Updates one setting by dot-notation key path, e.g. `general.homepage`,
    /// `appearance.theme`, or `widgets.weather`.
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.settings = Self::updated(&self.settings, key, value.clone())?;
        self.persist();
        let event = self.event_for(key, value);
        self.publisher.publish(event);
        Ok(())
    }

    fn reset(&mut self) {
        self.settings = BrowserSettings::default();
        self.persist();
        if let Ok(value) = serde_json::to_value(&self.settings.general) {
            self.publisher.publish(BrowserEvent::SettingsChanged {
                key: "general".to_string(),
                value,
            });
        }
        self.publisher.publish(BrowserEvent::ThemeChanged {
            theme: self.settings.appearance.theme.clone(),
        });
        self.publisher.publish(BrowserEvent::WidgetSettingsChanged {
            widgets: self.settings.widgets.clone(),
        });
    }

    /// Mirrors another window's change. Never persists or publishes, so a
    /// broadcast cannot bounce back and forth.
    fn apply_remote(&mut self, event: &BrowserEvent) -> bool {
        match event {
            BrowserEvent::ThemeChanged { theme } => {
                self.settings.appearance.theme = theme.clone();
                true
            }
            BrowserEvent::WidgetSettingsChanged { widgets } => {
                self.settings.widgets = widgets.clone();
                true
            }
            BrowserEvent::SettingsChanged { key, value } => {
                match Self::updated(&self.settings, key, value.clone()) {
                    Ok(settings) => {
                        self.settings = settings;
                        true
                    }
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "ignoring remote settings change");
                        false
                    }
                }
            }
            _ => false,
        }
    }
}
