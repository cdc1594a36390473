// Tabshell state managers
// Managers handle stateful operations: tabs, sessions, history, bookmarks and quick links.

pub mod bookmark_manager;
pub mod debounce;
pub mod history_buffer;
pub mod session_manager;
pub mod tab_manager;
