// Tabshell platform abstraction
// Provides platform-specific paths and desktop queries for Windows, macOS, and Linux.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific configuration directory for Tabshell.
///
/// - **Linux**: `~/.config/tabshell` (or `$XDG_CONFIG_HOME/tabshell`)
/// - **macOS**: `~/Library/Application Support/Tabshell`
/// - **Windows**: `%APPDATA%/Tabshell`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the platform-specific data directory, where the session store lives.
///
/// - **Linux**: `~/.local/share/tabshell` (or `$XDG_DATA_HOME/tabshell`)
/// - **macOS**: `~/Library/Application Support/Tabshell`
/// - **Windows**: `%APPDATA%/Tabshell`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}

/// Whether the desktop asks for a dark color scheme.
///
/// Checks `GTK_THEME` first on every platform; without it, dark is assumed.
pub fn prefers_dark_theme() -> bool {
    match std::env::var("GTK_THEME") {
        Ok(theme) => theme.to_lowercase().contains("dark"),
        Err(_) => true,
    }
}
