//! Tabshell: tab, session, and history core for a thin desktop browser shell.
//!
//! Entry point: opens a `wry` window when built with the `gui` feature.
//! Without it, runs a console demo against an in-memory store.

#[cfg(feature = "gui")]
fn main() {
    tabshell::logging::init();
    if let Err(e) = tabshell::ui::webview_app::run() {
        tracing::error!(error = %e, "failed to start window");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "gui"))]
fn main() {
    use std::sync::Arc;

    use tabshell::app::{Browser, ShellAction, WindowKind};
    use tabshell::config::ShellConfig;
    use tabshell::services::event_bus::EventBus;
    use tabshell::storage::{MemoryStore, SharedStore};
    use tabshell::view::LoggingViewHost;

    tabshell::logging::init();

    println!();
    println!("Tabshell v{} demo mode", env!("CARGO_PKG_VERSION"));
    println!("View commands are logged to stderr (TABSHELL_LOG=debug for more).");
    println!();

    let config = ShellConfig::default();
    let store: SharedStore = Arc::new(MemoryStore::new());
    let bus = EventBus::new(config.event_capacity);
    let mut main_window = Browser::new("main", WindowKind::Main, store.clone(), &bus, Box::new(LoggingViewHost), &config);
    let mut private_window = Browser::new("incognito-1", WindowKind::Incognito, store, &bus, Box::new(LoggingViewHost), &config);
    main_window.startup();
    private_window.startup();

    demo_tabs(&mut main_window);
    demo_history(&mut main_window, &mut private_window);
    demo_settings(&mut main_window, &mut private_window);
    demo_close(&mut main_window);

    main_window.shutdown();
    private_window.shutdown();

    println!();
    println!("Demo finished.");

    fn section(name: &str) {
        println!("───────────────────────────────────────────────────────────────");
        println!("  {}", name);
        println!("───────────────────────────────────────────────────────────────");
    }

    fn demo_tabs(browser: &mut Browser) {
        use tabshell::managers::tab_manager::TabManagerTrait;
        section("Tabs");

        let id = browser.create_tab(Some("https://example.com"));
        let _ = browser.navigate(&id, "https://example.com/page");
        let _ = browser.go_back(&id);
        if let Some(tab) = browser.tabs.get_tab(&id) {
            println!("  history {:?}, index {:?}, url {}", tab.history, tab.history_index, tab.url);
        }
        println!("  {} tabs open", browser.tabs.tab_count());
        println!();
    }

    fn demo_history(main: &mut Browser, private: &mut Browser) {
        use tabshell::managers::tab_manager::TabManagerTrait;
        section("History");

        let private_tab = private.create_tab(Some("https://private.example"));
        let _ = private.navigate(&private_tab, "https://private.example/secret");
        main.history.flush();
        println!("  main window has {} entries", main.history.len());
        println!("  incognito window recorded {} entries", private.history.len());
        println!("  private tab count: {}", private.tabs.tab_count());
        println!();
    }

    fn demo_settings(main: &mut Browser, private: &mut Browser) {
        use tabshell::types::settings::ThemeMode;
        section("Settings broadcast");

        main.set_theme(ThemeMode::Light);
        let applied = private.pump_broadcasts();
        println!("  incognito window applied {} broadcasts, theme now {:?}", applied, private.theme.get_theme());
        println!();
    }

    fn demo_close(browser: &mut Browser) {
        use tabshell::managers::tab_manager::TabManagerTrait;
        section("Closing tabs");

        let ids: Vec<String> = browser.tabs.tabs().iter().map(|t| t.id.clone()).collect();
        for id in ids {
            match browser.close_tab(&id) {
                Ok(ShellAction::Quit) => println!("  closing the last tab asks the shell to quit"),
                Ok(ShellAction::Continue) => println!("  closed {}", id),
                Err(e) => println!("  {}", e),
            }
        }
        println!();
    }
}
