//! Theme Engine: holds the theme applied to this window.
//!
//! The stored preference lives in `SettingsEngine`; this only tracks what is
//! currently on screen and resolves `System` to a concrete mode.

use crate::platform;
use crate::types::settings::ThemeMode;

pub struct ThemeEngine {
    current_theme: ThemeMode,
}

impl ThemeEngine {
    pub fn new(mode: ThemeMode) -> Self {
        Self {
            current_theme: mode,
        }
    }

    /// Applies `mode`; returns false when it was already applied.
    pub fn apply(&mut self, mode: ThemeMode) -> bool {
        if self.current_theme == mode {
            return false;
        }
        tracing::debug!(?mode, "applying theme");
        self.current_theme = mode;
        true
    }

    pub fn get_theme(&self) -> &ThemeMode {
        &self.current_theme
    }

    /// The concrete theme to render, resolving `System` via the desktop.
    pub fn effective_theme(&self) -> ThemeMode {
        match &self.current_theme {
            ThemeMode::System => Self::detect_system_theme(),
            other => other.clone(),
        }
    }

    pub fn detect_system_theme() -> ThemeMode {
        if platform::prefers_dark_theme() {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }
}
