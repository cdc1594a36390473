use std::sync::Arc;

use rstest::rstest;
use serde_json::json;
use tabshell::services::event_bus::EventBus;
use tabshell::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use tabshell::storage::{keys, KeyValueStore, MemoryStore, SharedStore};
use tabshell::types::errors::SettingsError;
use tabshell::types::events::BrowserEvent;
use tabshell::types::settings::{BrowserSettings, StartupBehavior, ThemeMode, WidgetSettings};

fn setup() -> (SettingsEngine, SharedStore, EventBus) {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let bus = EventBus::default();
    let engine = SettingsEngine::new(store.clone(), bus.publisher("main"));
    (engine, store, bus)
}

#[test]
fn test_load_defaults_when_missing_or_malformed() {
    let (mut engine, store, _) = setup();
    assert_eq!(*engine.load(), BrowserSettings::default());
    store.set(keys::SETTINGS, "[1,2").unwrap();
    assert_eq!(*engine.load(), BrowserSettings::default());
}

#[test]
fn test_set_theme_persists_then_publishes() {
    let (mut engine, store, bus) = setup();
    let mut sub = bus.subscribe();
    engine.set_theme(ThemeMode::Dark);

    let mut reloaded = SettingsEngine::new(store, bus.publisher("other"));
    assert_eq!(reloaded.load().appearance.theme, ThemeMode::Dark);

    let events = sub.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].origin, "main");
    assert_eq!(events[0].event, BrowserEvent::ThemeChanged { theme: ThemeMode::Dark });
}

#[test]
fn test_set_widgets_publishes_widget_event() {
    let (mut engine, _, bus) = setup();
    let mut sub = bus.subscribe();
    let widgets = WidgetSettings {
        weather: true,
        ..WidgetSettings::default()
    };
    engine.set_widgets(widgets.clone());
    assert_eq!(
        sub.drain()[0].event,
        BrowserEvent::WidgetSettingsChanged { widgets }
    );
}

fn kind(event: &BrowserEvent) -> &'static str {
    match event {
        BrowserEvent::ThemeChanged { .. } => "theme",
        BrowserEvent::WidgetSettingsChanged { .. } => "widgets",
        BrowserEvent::SettingsChanged { .. } => "settings",
        _ => "other",
    }
}

#[rstest]
#[case::theme("appearance.theme", json!("Light"), "theme")]
#[case::widget("widgets.clock", json!(false), "widgets")]
#[case::homepage("general.homepage", json!("https://example.com"), "settings")]
fn test_set_value_publishes_matching_event(
    #[case] key: &str,
    #[case] value: serde_json::Value,
    #[case] expected: &str,
) {
    let (mut engine, _, bus) = setup();
    let mut sub = bus.subscribe();
    engine.set_value(key, value).unwrap();

    let events = sub.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(kind(&events[0].event), expected);
}

#[test]
fn test_set_value_updates_nested_field() {
    let (mut engine, _, _) = setup();
    engine
        .set_value("general.startup_behavior", json!("Homepage"))
        .unwrap();
    assert_eq!(
        engine.get_settings().general.startup_behavior,
        StartupBehavior::Homepage
    );
}

#[test]
fn test_set_value_rejects_bad_input_without_publishing() {
    let (mut engine, _, bus) = setup();
    let mut sub = bus.subscribe();
    assert!(matches!(
        engine.set_value("general.nope", json!(1)),
        Err(SettingsError::InvalidKey(_))
    ));
    assert!(matches!(
        engine.set_value("appearance.theme", json!("Purple")),
        Err(SettingsError::InvalidValue(_))
    ));
    assert!(sub.drain().is_empty());
    assert_eq!(*engine.get_settings(), BrowserSettings::default());
}

#[test]
fn test_apply_remote_never_publishes_or_persists() {
    let (mut engine, store, bus) = setup();
    let mut sub = bus.subscribe();

    assert!(engine.apply_remote(&BrowserEvent::ThemeChanged { theme: ThemeMode::Light }));
    assert!(engine.apply_remote(&BrowserEvent::SettingsChanged {
        key: "general.homepage".into(),
        value: json!("https://remote.test"),
    }));
    assert!(!engine.apply_remote(&BrowserEvent::HistoryUpdated));

    assert_eq!(engine.get_settings().appearance.theme, ThemeMode::Light);
    assert_eq!(engine.get_settings().general.homepage, "https://remote.test");
    assert!(sub.drain().is_empty());
    assert_eq!(store.get(keys::SETTINGS).unwrap(), None);
}

#[test]
fn test_reset_restores_defaults_and_announces() {
    let (mut engine, _, bus) = setup();
    engine.set_theme(ThemeMode::Light);
    let mut sub = bus.subscribe();

    engine.reset();
    assert_eq!(*engine.get_settings(), BrowserSettings::default());
    assert_eq!(sub.drain().len(), 3);
}

#[test]
fn test_load_partial_blob_keeps_stored_fields() {
    let (mut engine, store, _) = setup();
    store
        .set(
            keys::SETTINGS,
            r#"{"general":{"startup_behavior":"NewTab","homepage":"https://h.test"},"appearance":{"theme":"Light"}}"#,
        )
        .unwrap();
    let settings = engine.load();
    assert_eq!(settings.general.startup_behavior, StartupBehavior::NewTab);
    assert_eq!(settings.general.homepage, "https://h.test");
    assert_eq!(settings.general.search_engine, "duckduckgo");
    assert_eq!(settings.appearance.theme, ThemeMode::Light);
}

#[test]
fn test_search_engine_setting_drives_address_resolution() {
    let (mut engine, _, _) = setup();
    assert_eq!(
        engine.get_settings().general.resolve_address("rust async"),
        "https://duckduckgo.com/?q=rust+async"
    );
    engine
        .set_value("general.search_engine", json!("bing"))
        .unwrap();
    assert_eq!(
        engine.get_settings().general.resolve_address("rust async"),
        "https://www.bing.com/search?q=rust+async"
    );
}
