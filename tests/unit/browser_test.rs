//! Unit tests for the `Browser` window core: startup, shutdown, view
//! callbacks, and cross-window broadcasts.

use std::sync::Arc;

use rstest::rstest;
use tabshell::app::{Browser, ShellAction, WindowKind};
use tabshell::config::ShellConfig;
use tabshell::managers::session_manager::{SessionManager, SessionManagerTrait};
use tabshell::managers::tab_manager::{LastTabPolicy, TabManagerTrait};
use tabshell::services::event_bus::EventBus;
use tabshell::services::settings_engine::SettingsEngineTrait;
use tabshell::storage::{keys, write_json, MemoryStore, SharedStore};
use tabshell::types::events::BrowserEvent;
use tabshell::types::history::HistoryEntry;
use tabshell::types::session::SessionSnapshot;
use tabshell::types::settings::{BrowserSettings, StartupBehavior, ThemeMode};
use tabshell::types::tab::{TabRecord, NEW_TAB_URL};
use tabshell::view::{RecordingViewHost, ViewEvent};

fn window(id: &str, kind: WindowKind, store: &SharedStore, bus: &EventBus) -> Browser {
    Browser::new(
        id,
        kind,
        store.clone(),
        bus,
        Box::new(RecordingViewHost::new()),
        &ShellConfig::default(),
    )
}

fn setup() -> (Browser, SharedStore, EventBus) {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let bus = EventBus::default();
    let browser = window("main", WindowKind::Main, &store, &bus);
    (browser, store, bus)
}

fn with_startup(store: &SharedStore, behavior: StartupBehavior) {
    let mut settings = BrowserSettings::default();
    settings.general.startup_behavior = behavior;
    settings.general.homepage = "https://home.test".to_string();
    write_json(store.as_ref(), keys::SETTINGS, &settings).unwrap();
}

fn urls(browser: &Browser) -> Vec<String> {
    browser.tabs.tabs().iter().map(|t| t.url.clone()).collect()
}

// === Startup ===

#[test]
fn test_startup_restores_live_tabs() {
    let (_, store, bus) = setup();
    SessionManager::new(store.clone()).save_live(
        &[TabRecord::new("t1".into(), Some("https://a.test"), false)],
        Some("t1"),
    );
    let mut browser = window("main", WindowKind::Main, &store, &bus);
    browser.startup();
    assert_eq!(urls(&browser), vec!["https://a.test"]);
    assert_eq!(browser.tabs.current_tab_id(), Some("t1"));
}

#[test]
fn test_startup_falls_back_to_last_session() {
    let (_, store, bus) = setup();
    SessionManager::new(store.clone()).save_snapshot(&SessionSnapshot {
        tabs: vec![TabRecord::new("t9".into(), Some("https://last.test"), false)],
        current_tab_id: Some("t9".into()),
    });
    let mut browser = window("main", WindowKind::Main, &store, &bus);
    browser.startup();
    assert_eq!(urls(&browser), vec!["https://last.test"]);
}

#[rstest]
#[case::new_tab(StartupBehavior::NewTab, NEW_TAB_URL)]
#[case::homepage(StartupBehavior::Homepage, "https://home.test")]
fn test_startup_behavior_ignores_saved_tabs(#[case] behavior: StartupBehavior, #[case] url: &str) {
    let (_, store, bus) = setup();
    with_startup(&store, behavior);
    SessionManager::new(store.clone()).save_live(
        &[TabRecord::new("t1".into(), Some("https://a.test"), false)],
        Some("t1"),
    );
    let mut browser = window("main", WindowKind::Main, &store, &bus);
    browser.startup();
    assert_eq!(urls(&browser), vec![url]);
}

#[test]
fn test_incognito_startup_ignores_shared_session() {
    let (_, store, bus) = setup();
    SessionManager::new(store.clone()).save_live(
        &[TabRecord::new("t1".into(), Some("https://a.test"), false)],
        Some("t1"),
    );
    let mut private = window("incognito-1", WindowKind::Incognito, &store, &bus);
    private.startup();
    assert_eq!(urls(&private), vec![NEW_TAB_URL]);
    assert!(private.tabs.is_incognito());
}

// === History ===

#[test]
fn test_navigation_records_visits() {
    let (mut browser, _, _) = setup();
    browser.startup();
    let id = browser.create_tab(Some("https://a.test"));
    browser.navigate(&id, "https://b.test").unwrap();
    browser.handle_view_event(ViewEvent::Navigated {
        tab_id: id.clone(),
        url: "https://c.test".into(),
    });

    let visited: Vec<&str> = browser.history.entries().iter().map(|e| e.url.as_str()).collect();
    assert_eq!(visited, vec!["https://b.test", "https://c.test"]);
}

#[test]
fn test_incognito_never_feeds_history() {
    let (mut main, store, bus) = setup();
    let mut private = window("incognito-1", WindowKind::Incognito, &store, &bus);
    main.startup();
    private.startup();

    let id = private.create_tab(Some("https://secret.test"));
    private.navigate(&id, "https://secret.test/2").unwrap();
    private.handle_view_event(ViewEvent::Navigated {
        tab_id: id,
        url: "https://secret.test/3".into(),
    });
    private.shutdown();
    main.pump_broadcasts();

    assert!(private.history.is_empty());
    assert!(main.history.is_empty());
}

#[test]
fn test_internal_pages_are_not_recorded() {
    let (mut browser, _, _) = setup();
    let id = browser.create_tab(None);
    browser.navigate(&id, "tabshell://settings").unwrap();
    assert!(browser.history.is_empty());
}

#[test]
fn test_clear_history_reaches_other_windows() {
    let (mut main, store, bus) = setup();
    let mut other = window("second", WindowKind::Main, &store, &bus);
    let a = main.create_tab(Some("https://a.test"));
    main.navigate(&a, "https://b.test").unwrap();
    main.history.flush();
    other.pump_broadcasts();
    assert_eq!(other.history.len(), 1);

    main.clear_history();
    other.pump_broadcasts();
    assert!(main.history.is_empty());
    assert!(other.history.is_empty());
}

// === Tabs ===

#[test]
fn test_close_last_tab_asks_to_quit() {
    let (mut browser, _, _) = setup();
    browser.startup();
    let id = browser.tabs.tabs()[0].id.clone();
    assert_eq!(browser.close_tab(&id).unwrap(), ShellAction::Quit);
    assert_eq!(browser.tabs.tab_count(), 1);
}

#[test]
fn test_close_last_tab_replaced_when_configured() {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let bus = EventBus::default();
    let config = ShellConfig {
        last_tab_policy: LastTabPolicy::ReplaceWithNewTab,
        ..ShellConfig::default()
    };
    let mut browser = Browser::new(
        "main",
        WindowKind::Main,
        store,
        &bus,
        Box::new(RecordingViewHost::new()),
        &config,
    );
    let id = browser.create_tab(Some("https://a.test"));
    assert_eq!(browser.close_tab(&id).unwrap(), ShellAction::Continue);
    assert_eq!(urls(&browser), vec![NEW_TAB_URL]);
}

#[test]
fn test_unknown_tab_is_an_error_without_side_effects() {
    let (mut browser, _, _) = setup();
    let id = browser.create_tab(Some("https://a.test"));
    assert!(browser.navigate("nope", "https://b.test").is_err());
    assert!(browser.switch_tab("nope").is_err());
    assert!(browser.close_tab("nope").is_err());
    assert_eq!(browser.tabs.current_tab_id(), Some(id.as_str()));
    assert!(browser.history.is_empty());
}

#[test]
fn test_view_new_window_opens_tab() {
    let (mut browser, _, _) = setup();
    browser.create_tab(None);
    browser.handle_view_event(ViewEvent::NewWindow {
        url: "https://popup.test".into(),
    });
    browser.handle_view_event(ViewEvent::OpenInNewTab {
        url: "https://link.test".into(),
    });
    assert_eq!(urls(&browser), vec![NEW_TAB_URL, "https://popup.test", "https://link.test"]);
}

#[test]
fn test_view_title_updates_record() {
    let (mut browser, _, _) = setup();
    let id = browser.create_tab(Some("https://a.test"));
    browser.handle_view_event(ViewEvent::TitleUpdated {
        tab_id: id.clone(),
        title: "A".into(),
    });
    assert_eq!(browser.tabs.get_tab(&id).unwrap().title.as_deref(), Some("A"));
}

#[test]
fn test_host_back_needs_a_current_tab() {
    let (mut browser, _, _) = setup();
    assert!(!browser.host_back());
    let id = browser.create_tab(Some("https://a.test"));
    assert!(!browser.host_back());
    browser.navigate(&id, "https://b.test").unwrap();
    assert!(browser.host_back());
    assert!(!browser.host_forward());
}

#[test]
fn test_host_back_round_trip_keeps_forward_entry() {
    let (mut browser, _, _) = setup();
    let id = browser.create_tab(Some("https://a.test"));
    browser.navigate(&id, "https://b.test").unwrap();
    assert!(browser.host_back());
    browser.handle_view_event(ViewEvent::Navigated {
        tab_id: id.clone(),
        url: "https://a.test".into(),
    });

    let tab = browser.tabs.get_tab(&id).unwrap();
    assert_eq!(tab.history, vec!["https://a.test", "https://b.test"]);
    assert_eq!(tab.history_index, Some(0));
    assert!(browser.go_forward(&id).unwrap());
}

// === Session ===

#[test]
fn test_shutdown_snapshot_is_appended_by_restore_last_session() {
    let (mut first, store, bus) = setup();
    first.startup();
    let placeholder = first.tabs.tabs()[0].id.clone();
    first.navigate(&placeholder, "https://a.test").unwrap();
    first.create_tab(Some("https://b.test"));
    first.shutdown();

    with_startup(&store, StartupBehavior::NewTab);
    let mut second = window("main", WindowKind::Main, &store, &bus);
    second.startup();
    assert_eq!(second.restore_last_session(), 2);
    assert_eq!(urls(&second), vec![NEW_TAB_URL, "https://a.test", "https://b.test"]);
}

#[test]
fn test_restore_last_session_without_snapshot() {
    let (mut browser, _, _) = setup();
    browser.startup();
    assert_eq!(browser.restore_last_session(), 0);
    assert_eq!(browser.tabs.tab_count(), 1);
}

// === Broadcasts ===

#[test]
fn test_remote_theme_applied_without_rebroadcast() {
    let (mut main, store, bus) = setup();
    let mut other = window("second", WindowKind::Main, &store, &bus);
    let mut observer = bus.subscribe();

    main.set_theme(ThemeMode::Dark);
    assert_eq!(other.pump_broadcasts(), 1);
    assert_eq!(*other.theme.get_theme(), ThemeMode::Dark);
    assert_eq!(other.settings.get_settings().appearance.theme, ThemeMode::Dark);

    let seen = observer.drain();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].origin, "main");
}

#[test]
fn test_pump_skips_own_events() {
    let (mut main, _, _) = setup();
    main.set_theme(ThemeMode::Light);
    main.history.add_entry(HistoryEntry::new("https://a.test", None, 0));
    main.history.flush();
    assert_eq!(main.pump_broadcasts(), 0);
    assert_eq!(main.history.len(), 1);
}

#[test]
fn test_remote_setting_change_applied() {
    let (mut main, store, bus) = setup();
    let mut other = window("second", WindowKind::Main, &store, &bus);
    bus.publish(
        "settings",
        BrowserEvent::SettingsChanged {
            key: "general.homepage".into(),
            value: serde_json::json!("https://new.test"),
        },
    );
    main.pump_broadcasts();
    other.pump_broadcasts();
    assert_eq!(main.settings.get_settings().general.homepage, "https://new.test");
    assert_eq!(other.settings.get_settings().general.homepage, "https://new.test");
}

#[test]
fn test_tab_dropped_only_opens_in_target() {
    let (main, store, bus) = setup();
    let mut other = window("second", WindowKind::Main, &store, &bus);
    main.drop_tab_to("second", "https://dropped.test");

    assert_eq!(other.pump_broadcasts(), 1);
    assert_eq!(urls(&other), vec!["https://dropped.test"]);

    let mut third = window("third", WindowKind::Main, &store, &bus);
    main.drop_tab_to("second", "https://again.test");
    assert_eq!(third.pump_broadcasts(), 0);
    assert_eq!(third.tabs.tab_count(), 0);
}
