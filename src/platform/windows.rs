// Tabshell platform paths for Windows
// Config: %APPDATA%/Tabshell
// Data:   %APPDATA%/Tabshell

use std::env;
use std::path::PathBuf;

fn roaming_dir() -> PathBuf {
    let appdata = env::var("APPDATA")
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("Tabshell")
}

pub fn get_config_dir() -> PathBuf {
    roaming_dir()
}

pub fn get_data_dir() -> PathBuf {
    roaming_dir()
}
