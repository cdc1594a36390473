//! App Core for Tabshell.
//!
//! `Browser` owns one window's session state and wires the managers and
//! services together. Every handler runs to completion on the caller's
//! thread; other windows are reached only through the event bus.

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::config::ShellConfig;
use crate::managers::bookmark_manager::LinkCollection;
use crate::managers::history_buffer::HistoryBuffer;
use crate::managers::session_manager::{SessionManager, SessionManagerTrait};
use crate::managers::tab_manager::{CloseOutcome, TabManager, TabManagerTrait};
use crate::services::event_bus::{EventBus, Publisher, Subscription};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::theme_engine::ThemeEngine;
use crate::storage::{MemoryStore, SharedStore};
use crate::types::errors::TabError;
use crate::types::events::{BrowserEvent, WindowId};
use crate::types::history::HistoryEntry;
use crate::types::session::SessionSnapshot;
use crate::types::settings::{StartupBehavior, ThemeMode};
use crate::types::tab::{is_internal_url, TabId, TabRecord};
use crate::view::{ViewEvent, ViewHost};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Main,
    /// Tab state lives in a private in-memory store and no visit reaches
    /// global history.
    Incognito,
}

/// What the front end should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellAction {
    Continue,
    Quit,
}

/// One shell window.
pub struct Browser {
    id: WindowId,
    kind: WindowKind,
    pub tabs: TabManager,
    pub history: HistoryBuffer,
    pub bookmarks: LinkCollection,
    pub quick_links: LinkCollection,
    pub settings: SettingsEngine,
    pub theme: ThemeEngine,
    session: SessionManager,
    publisher: Publisher,
    subscription: Subscription,
}

impl Browser {
    /// Creates a window named `id` on the shared `store` and `bus`.
    pub fn new(
        id: &str,
        kind: WindowKind,
        store: SharedStore,
        bus: &EventBus,
        host: Box<dyn ViewHost>,
        config: &ShellConfig,
    ) -> Self {
        let publisher = bus.publisher(id);
        let subscription = bus.subscribe();

        let tab_store: SharedStore = match kind {
            WindowKind::Main => store.clone(),
            WindowKind::Incognito => Arc::new(MemoryStore::new()),
        };
        let tabs = TabManager::new(host, SessionManager::new(tab_store))
            .with_policy(config.last_tab_policy)
            .with_closed_tab_limit(config.closed_tab_limit)
            .incognito(kind == WindowKind::Incognito);

        Self {
            id: id.to_string(),
            kind,
            tabs,
            history: HistoryBuffer::new(
                store.clone(),
                publisher.clone(),
                config.history_limit,
                config.history_flush_delay(),
            ),
            bookmarks: LinkCollection::bookmarks(store.clone()),
            quick_links: LinkCollection::quick_links(store.clone()),
            settings: SettingsEngine::new(store.clone(), publisher.clone()),
            theme: ThemeEngine::new(ThemeMode::System),
            session: SessionManager::new(store),
            publisher,
            subscription,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    /// Unix time in milliseconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    /// Startup sequence: load settings, apply theme, load history, open tabs
    /// according to `general.startup_behavior`.
    pub fn startup(&mut self) {
        let settings = self.settings.load().clone();
        self.theme.apply(settings.appearance.theme.clone());
        self.history.load();

        if self.kind == WindowKind::Incognito {
            self.tabs.restore(SessionSnapshot::default());
            tracing::info!(window = %self.id, "incognito window started");
            return;
        }

        let snapshot = match settings.general.startup_behavior {
            StartupBehavior::Restore => {
                let live = self.session.load_live();
                if live.is_empty() {
                    self.session.load_last_session()
                } else {
                    live
                }
            }
            StartupBehavior::NewTab => SessionSnapshot::default(),
            StartupBehavior::Homepage => SessionSnapshot {
                tabs: vec![TabRecord::new(
                    Uuid::new_v4().to_string(),
                    Some(&settings.general.homepage),
                    false,
                )],
                current_tab_id: None,
            },
        };
        self.tabs.restore(snapshot);
        tracing::info!(
            window = %self.id,
            tabs = self.tabs.tab_count(),
            behavior = ?settings.general.startup_behavior,
            "window started"
        );
    }

    /// Shutdown sequence: snapshot the session, write pending history.
    pub fn shutdown(&mut self) {
        self.tabs.session().save_snapshot(&self.tabs.snapshot());
        if self.history.has_pending_flush() {
            self.history.flush();
        }
        tracing::info!(window = %self.id, "window shut down");
    }

    /// Drives the history debounce and applies pending broadcasts.
    pub fn tick(&mut self, now: Instant) {
        self.history.poll_flush(now);
        self.pump_broadcasts();
    }

    // === Tabs ===

    pub fn create_tab(&mut self, url: Option<&str>) -> TabId {
        self.tabs.create_tab(url)
    }

    pub fn navigate(&mut self, tab_id: &str, url: &str) -> Result<(), TabError> {
        self.tabs.navigate(tab_id, url).inspect_err(log_ignored)?;
        self.record_visit(tab_id, url);
        Ok(())
    }

    pub fn go_back(&mut self, tab_id: &str) -> Result<bool, TabError> {
        self.tabs.go_back(tab_id).inspect_err(log_ignored)
    }

    pub fn go_forward(&mut self, tab_id: &str) -> Result<bool, TabError> {
        self.tabs.go_forward(tab_id).inspect_err(log_ignored)
    }

    /// Closes a tab. Closing the last tab may ask the shell to quit, in
    /// which case nothing is closed and the caller is expected to call
    /// [`Browser::shutdown`].
    pub fn close_tab(&mut self, tab_id: &str) -> Result<ShellAction, TabError> {
        match self.tabs.close_tab(tab_id).inspect_err(log_ignored)? {
            CloseOutcome::Closed => Ok(ShellAction::Continue),
            CloseOutcome::QuitRequested => Ok(ShellAction::Quit),
        }
    }

    pub fn switch_tab(&mut self, tab_id: &str) -> Result<(), TabError> {
        self.tabs.switch_tab(tab_id).inspect_err(log_ignored)
    }

    /// Asks the current tab's view to step back in its own history.
    pub fn host_back(&mut self) -> bool {
        self.host_step(false)
    }

    pub fn host_forward(&mut self) -> bool {
        self.host_step(true)
    }

    fn host_step(&mut self, forward: bool) -> bool {
        let Some(id) = self.tabs.current_tab_id().map(str::to_string) else {
            return false;
        };
        matches!(self.tabs.host_step(&id, forward), Ok(true))
    }

    /// Appends the tabs saved at the end of the previous run.
    pub fn restore_last_session(&mut self) -> usize {
        let snapshot = self.session.load_last_session();
        if snapshot.is_empty() {
            return 0;
        }
        let count = self.tabs.append(snapshot);
        tracing::info!(window = %self.id, count, "last session restored");
        count
    }

    /// Hands a tab's URL to another window.
    pub fn drop_tab_to(&self, target: &str, url: &str) {
        self.publisher.publish(BrowserEvent::TabDropped {
            target: target.to_string(),
            url: url.to_string(),
        });
    }

    // === View callbacks ===

    pub fn handle_view_event(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::Navigated { tab_id, url } => {
                if self.tabs.on_navigated(&tab_id, &url).inspect_err(log_ignored).is_ok() {
                    self.record_visit(&tab_id, &url);
                }
            }
            ViewEvent::TitleUpdated { tab_id, title } => {
                let _ = self
                    .tabs
                    .on_title_updated(&tab_id, &title)
                    .inspect_err(log_ignored);
            }
            ViewEvent::NewWindow { url } | ViewEvent::OpenInNewTab { url } => {
                self.tabs.create_tab(Some(&url));
            }
        }
    }

    /// Adds a global history entry unless the visit is private or internal.
    fn record_visit(&mut self, tab_id: &str, url: &str) {
        if self.kind == WindowKind::Incognito || is_internal_url(url) {
            return;
        }
        let Some(tab) = self.tabs.get_tab(tab_id) else {
            return;
        };
        if tab.is_incognito {
            return;
        }
        let entry = HistoryEntry::new(url, tab.title.as_deref(), Self::now());
        self.history.add_entry(entry);
    }

    // === History ===

    /// Clears history here and asks every other window to drop its copy.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.publisher.publish(BrowserEvent::HistoryClearRequested);
    }

    // === Settings ===

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.theme.apply(theme.clone());
        self.settings.set_theme(theme);
    }

    /// Applies a theme chosen in another window without re-broadcasting it.
    pub fn on_theme_changed(&mut self, theme: ThemeMode) {
        self.settings.apply_remote(&BrowserEvent::ThemeChanged {
            theme: theme.clone(),
        });
        self.theme.apply(theme);
    }

    // === Broadcasts ===

    /// Applies every pending broadcast from other windows. Returns how many
    /// were applied.
    pub fn pump_broadcasts(&mut self) -> usize {
        let mut applied = 0;
        for envelope in self.subscription.drain() {
            if envelope.origin == self.id {
                continue;
            }
            applied += 1;
            match envelope.event {
                BrowserEvent::ThemeChanged { theme } => self.on_theme_changed(theme),
                event @ (BrowserEvent::SettingsChanged { .. }
                | BrowserEvent::WidgetSettingsChanged { .. }) => {
                    self.settings.apply_remote(&event);
                    let theme = self.settings.get_settings().appearance.theme.clone();
                    self.theme.apply(theme);
                }
                BrowserEvent::HistoryUpdated => self.history.reload(),
                BrowserEvent::HistoryClearRequested => self.history.discard(),
                BrowserEvent::TabDropped { target, url } => {
                    if target == self.id {
                        self.tabs.create_tab(Some(&url));
                    } else {
                        applied -= 1;
                    }
                }
            }
        }
        applied
    }
}

fn log_ignored(error: &TabError) {
    tracing::debug!(error = %error, "tab command ignored");
}
