// Tabshell platform paths for Linux
// Config: ~/.config/tabshell
// Data:   ~/.local/share/tabshell

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Uses `$XDG_CONFIG_HOME/tabshell` if set, otherwise `~/.config/tabshell`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("tabshell"),
        _ => home_dir().join(".config").join("tabshell"),
    }
}

/// Uses `$XDG_DATA_HOME/tabshell` if set, otherwise `~/.local/share/tabshell`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("tabshell"),
        _ => home_dir().join(".local").join("share").join("tabshell"),
    }
}
