// Tabshell services
// Services provide cross-window functionality: the event bus, settings, and themes.

pub mod event_bus;
pub mod settings_engine;
pub mod theme_engine;
