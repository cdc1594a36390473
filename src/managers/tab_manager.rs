use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::managers::session_manager::{SessionManager, SessionManagerTrait};
use crate::types::errors::TabError;
use crate::types::session::SessionSnapshot;
use crate::types::tab::{ClosedTab, TabId, TabRecord, NEW_TAB_URL};
use crate::view::{ViewBridge, ViewHost};

/// How many closed tabs can be reopened.
pub const DEFAULT_CLOSED_TAB_LIMIT: usize = 10;

/// What closing the only remaining tab does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LastTabPolicy {
    /// The window is the application: closing its last tab quits.
    #[default]
    QuitApplication,
    /// The tab is replaced by a fresh new-tab page.
    ReplaceWithNewTab,
}

/// Result of a close request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// The tab was the last one and the policy says quit; nothing changed.
    QuitRequested,
}

/// Trait defining the tab management interface.
pub trait TabManagerTrait {
    fn create_tab(&mut self, url: Option<&str>) -> TabId;
    fn navigate(&mut self, tab_id: &str, url: &str) -> Result<(), TabError>;
    fn go_back(&mut self, tab_id: &str) -> Result<bool, TabError>;
    fn go_forward(&mut self, tab_id: &str) -> Result<bool, TabError>;
    fn close_tab(&mut self, tab_id: &str) -> Result<CloseOutcome, TabError>;
    fn switch_tab(&mut self, tab_id: &str) -> Result<(), TabError>;
    fn reopen_closed_tab(&mut self) -> Option<TabId>;
    fn reload_tab(&mut self, tab_id: &str) -> Result<(), TabError>;
    fn host_step(&mut self, tab_id: &str, forward: bool) -> Result<bool, TabError>;
    fn set_pinned(&mut self, tab_id: &str, pinned: bool) -> Result<(), TabError>;
    fn move_tab(&mut self, tab_id: &str, new_index: usize) -> Result<(), TabError>;
    fn on_navigated(&mut self, tab_id: &str, url: &str) -> Result<bool, TabError>;
    fn on_title_updated(&mut self, tab_id: &str, title: &str) -> Result<(), TabError>;
    fn get_tab(&self, tab_id: &str) -> Option<&TabRecord>;
    fn tabs(&self) -> &[TabRecord];
    fn current_tab(&self) -> Option<&TabRecord>;
    fn tab_count(&self) -> usize;
    fn closed_tab_count(&self) -> usize;
    fn restore(&mut self, snapshot: SessionSnapshot);
    fn append(&mut self, snapshot: SessionSnapshot) -> usize;
    fn snapshot(&self) -> SessionSnapshot;
    fn clear_session(&mut self);
}

/// Owns one window's tabs and keeps each one paired with a host view.
///
/// Every mutation writes the whole collection back through the session
/// manager before returning.
pub struct TabManager {
    tabs: Vec<TabRecord>,
    current_tab_id: Option<TabId>,
    closed_tabs: Vec<ClosedTab>,
    views: ViewBridge,
    session: SessionManager,
    incognito: bool,
    policy: LastTabPolicy,
    closed_tab_limit: usize,
    /// Direction of a back/forward the host was asked to perform and has not
    /// reported yet.
    host_steps: HashMap<TabId, bool>,
}

impl TabManager {
    /// Creates an empty manager. The closed-tab stack is loaded from the store.
    pub fn new(host: Box<dyn ViewHost>, session: SessionManager) -> Self {
        let closed_tabs = session.load_closed_tabs();
        Self {
            tabs: Vec::new(),
            current_tab_id: None,
            closed_tabs,
            views: ViewBridge::new(host),
            session,
            incognito: false,
            policy: LastTabPolicy::default(),
            closed_tab_limit: DEFAULT_CLOSED_TAB_LIMIT,
            host_steps: HashMap::new(),
        }
    }

    pub fn with_policy(mut self, policy: LastTabPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_closed_tab_limit(mut self, limit: usize) -> Self {
        self.closed_tab_limit = limit;
        self.closed_tabs.truncate(limit);
        self
    }

    /// Marks every tab this manager creates as incognito.
    pub fn incognito(mut self, incognito: bool) -> Self {
        self.incognito = incognito;
        self
    }

    pub fn is_incognito(&self) -> bool {
        self.incognito
    }

    pub fn policy(&self) -> LastTabPolicy {
        self.policy
    }

    pub fn current_tab_id(&self) -> Option<&str> {
        self.current_tab_id.as_deref()
    }

    pub fn can_go_back(&self, tab_id: &str) -> bool {
        self.get_tab(tab_id).is_some_and(TabRecord::can_go_back)
    }

    pub fn can_go_forward(&self, tab_id: &str) -> bool {
        self.get_tab(tab_id).is_some_and(TabRecord::can_go_forward)
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    fn find_tab_index(&self, tab_id: &str) -> Result<usize, TabError> {
        self.tabs
            .iter()
            .position(|t| t.id == tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))
    }

    fn is_current(&self, tab_id: &str) -> bool {
        self.current_tab_id.as_deref() == Some(tab_id)
    }

    fn fresh_id() -> TabId {
        Uuid::new_v4().to_string()
    }

    /// Shows the current tab's view, or hides all views when the current tab
    /// is the new-tab page the shell draws itself.
    fn present(&mut self) {
        let Some((id, placeholder)) = self
            .current_tab()
            .map(|tab| (tab.id.clone(), tab.is_placeholder()))
        else {
            return;
        };
        if placeholder {
            self.views.hide();
        } else {
            self.views.show(&id);
        }
    }

    fn persist(&self) {
        self.session
            .save_live(&self.tabs, self.current_tab_id.as_deref());
    }

    fn persist_closed(&self) {
        self.session.save_closed_tabs(&self.closed_tabs);
    }

    fn remember_closed(&mut self, record: TabRecord, index: usize) {
        if self.closed_tab_limit == 0 {
            return;
        }
        self.closed_tabs.push(ClosedTab { record, index });
        if self.closed_tabs.len() > self.closed_tab_limit {
            let excess = self.closed_tabs.len() - self.closed_tab_limit;
            self.closed_tabs.drain(..excess);
        }
    }

    /// Opens a view for `record` and inserts it at `index`. The record gets a
    /// fresh id when its own is already taken.
    fn adopt(&mut self, mut record: TabRecord, index: usize) -> TabId {
        if record.id.is_empty() || self.tabs.iter().any(|t| t.id == record.id) {
            record.id = Self::fresh_id();
        }
        record.sanitize();
        let id = record.id.clone();
        self.views.create(&id);
        if !record.is_placeholder() {
            self.views.navigate(&id, &record.url);
        }
        let index = index.min(self.tabs.len());
        self.tabs.insert(index, record);
        id
    }

    fn step(&mut self, tab_id: &str, forward: bool) -> Result<bool, TabError> {
        let idx = self.find_tab_index(tab_id)?;
        self.host_steps.remove(tab_id);
        if !self.tabs[idx].step(forward) {
            return Ok(false);
        }
        let url = self.tabs[idx].url.clone();
        self.views.navigate(tab_id, &url);
        self.persist();
        Ok(true)
    }
}

impl TabManagerTrait for TabManager {
    /// Opens a tab on `url` (or the new-tab page) and makes it current.
    fn create_tab(&mut self, url: Option<&str>) -> TabId {
        let record = TabRecord::new(Self::fresh_id(), url, self.incognito);
        let id = self.adopt(record, self.tabs.len());
        self.current_tab_id = Some(id.clone());
        self.present();
        self.persist();
        tracing::debug!(tab_id = %id, "tab created");
        id
    }

    /// User-initiated navigation. Re-entering the URL under the cursor does
    /// not touch history; anything else drops the forward branch first.
    fn navigate(&mut self, tab_id: &str, url: &str) -> Result<(), TabError> {
        let idx = self.find_tab_index(tab_id)?;
        if url == NEW_TAB_URL {
            tracing::debug!(tab_id, "ignoring navigation to the new-tab page");
            return Ok(());
        }
        self.host_steps.remove(tab_id);
        let was_placeholder = self.tabs[idx].is_placeholder();
        self.tabs[idx].push_history(url);
        self.views.navigate(tab_id, url);
        if was_placeholder && self.is_current(tab_id) {
            self.present();
        }
        self.persist();
        Ok(())
    }

    fn go_back(&mut self, tab_id: &str) -> Result<bool, TabError> {
        self.step(tab_id, false)
    }

    fn go_forward(&mut self, tab_id: &str) -> Result<bool, TabError> {
        self.step(tab_id, true)
    }

    /// Closes a tab, selecting the tab that slides into its place (or the new
    /// last tab) when it was current. The last open tab is handled by the
    /// configured [`LastTabPolicy`].
    fn close_tab(&mut self, tab_id: &str) -> Result<CloseOutcome, TabError> {
        let idx = self.find_tab_index(tab_id)?;

        if self.tabs.len() == 1 && self.policy == LastTabPolicy::QuitApplication {
            tracing::info!(tab_id, "last tab closed, quit requested");
            return Ok(CloseOutcome::QuitRequested);
        }

        let was_current = self.is_current(tab_id);
        let record = self.tabs.remove(idx);
        self.host_steps.remove(&record.id);
        self.views.destroy(&record.id);
        self.remember_closed(record, idx);
        self.persist_closed();

        if self.tabs.is_empty() {
            self.current_tab_id = None;
            self.create_tab(None);
            return Ok(CloseOutcome::Closed);
        }

        if was_current {
            let next = idx.min(self.tabs.len() - 1);
            self.current_tab_id = Some(self.tabs[next].id.clone());
            self.present();
        }
        self.persist();
        Ok(CloseOutcome::Closed)
    }

    fn switch_tab(&mut self, tab_id: &str) -> Result<(), TabError> {
        self.find_tab_index(tab_id)?;
        self.current_tab_id = Some(tab_id.to_string());
        self.present();
        self.persist();
        Ok(())
    }

    /// Re-creates the most recently closed tab at its old position.
    fn reopen_closed_tab(&mut self) -> Option<TabId> {
        let closed = self.closed_tabs.pop()?;
        let mut record = closed.record;
        record.id = Self::fresh_id();
        let id = self.adopt(record, closed.index);
        self.current_tab_id = Some(id.clone());
        self.present();
        self.persist();
        self.persist_closed();
        Some(id)
    }

    fn reload_tab(&mut self, tab_id: &str) -> Result<(), TabError> {
        self.find_tab_index(tab_id)?;
        self.views.reload(tab_id);
        Ok(())
    }

    /// Asks the host to walk its own history; the model moves its cursor when
    /// the resulting navigation is reported back. Returns `false` without a
    /// command when the tab has nothing in that direction.
    fn host_step(&mut self, tab_id: &str, forward: bool) -> Result<bool, TabError> {
        let idx = self.find_tab_index(tab_id)?;
        if self.tabs[idx].neighbor(forward).is_none() {
            return Ok(false);
        }
        self.host_steps.insert(tab_id.to_string(), forward);
        if forward {
            self.views.forward(tab_id);
        } else {
            self.views.back(tab_id);
        }
        Ok(true)
    }

    fn set_pinned(&mut self, tab_id: &str, pinned: bool) -> Result<(), TabError> {
        let idx = self.find_tab_index(tab_id)?;
        if self.tabs[idx].pinned != pinned {
            self.tabs[idx].pinned = pinned;
            self.persist();
        }
        Ok(())
    }

    /// Moves a tab to a new position in the strip.
    fn move_tab(&mut self, tab_id: &str, new_index: usize) -> Result<(), TabError> {
        let idx = self.find_tab_index(tab_id)?;
        if new_index >= self.tabs.len() {
            return Err(TabError::InvalidIndex(new_index));
        }
        let record = self.tabs.remove(idx);
        self.tabs.insert(new_index, record);
        self.persist();
        Ok(())
    }

    /// The host view moved on its own. Same history rules as `navigate`, but
    /// no command goes back out. A pending host back/forward that lands on the
    /// neighboring entry moves the cursor instead. Returns whether history or
    /// the cursor changed.
    fn on_navigated(&mut self, tab_id: &str, url: &str) -> Result<bool, TabError> {
        let idx = self.find_tab_index(tab_id)?;
        if let Some(forward) = self.host_steps.remove(tab_id) {
            if self.tabs[idx].neighbor(forward) == Some(url) {
                self.tabs[idx].step(forward);
                self.persist();
                return Ok(true);
            }
        }
        let was_placeholder = self.tabs[idx].is_placeholder();
        let changed = self.tabs[idx].push_history(url);
        if was_placeholder && self.is_current(tab_id) {
            self.present();
        }
        if changed || was_placeholder {
            self.persist();
        }
        Ok(changed)
    }

    fn on_title_updated(&mut self, tab_id: &str, title: &str) -> Result<(), TabError> {
        let idx = self.find_tab_index(tab_id)?;
        let tab = &mut self.tabs[idx];
        if tab.is_placeholder() || tab.title.as_deref() == Some(title) {
            return Ok(());
        }
        tab.title = Some(title.to_string());
        self.persist();
        Ok(())
    }

    fn get_tab(&self, tab_id: &str) -> Option<&TabRecord> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    fn tabs(&self) -> &[TabRecord] {
        &self.tabs
    }

    fn current_tab(&self) -> Option<&TabRecord> {
        self.current_tab_id
            .as_deref()
            .and_then(|id| self.get_tab(id))
    }

    fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    fn closed_tab_count(&self) -> usize {
        self.closed_tabs.len()
    }

    /// Replaces every open tab with the snapshot's tabs. An empty snapshot
    /// leaves a single new-tab page.
    fn restore(&mut self, snapshot: SessionSnapshot) {
        for tab in std::mem::take(&mut self.tabs) {
            self.views.destroy(&tab.id);
        }
        self.host_steps.clear();
        self.current_tab_id = None;
        self.append(snapshot);
        if self.tabs.is_empty() {
            self.create_tab(None);
        }
    }

    /// Opens the snapshot's tabs after the existing ones and selects its
    /// current tab (or the first restored one). Returns how many were opened.
    fn append(&mut self, snapshot: SessionSnapshot) -> usize {
        let SessionSnapshot {
            tabs,
            current_tab_id,
        } = snapshot;
        let count = tabs.len();
        let mut first = None;
        let mut matched = None;
        for mut record in tabs {
            record.is_incognito = record.is_incognito || self.incognito;
            let original = record.id.clone();
            let id = self.adopt(record, self.tabs.len());
            if current_tab_id.as_deref() == Some(original.as_str()) {
                matched = Some(id.clone());
            }
            first.get_or_insert(id);
        }
        if let Some(id) = matched.or(first) {
            self.current_tab_id = Some(id);
            self.present();
            self.persist();
        }
        count
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            tabs: self.tabs.clone(),
            current_tab_id: self.current_tab_id.clone(),
        }
    }

    /// Destroys every tab and the stored session, leaving one new-tab page.
    fn clear_session(&mut self) {
        for tab in std::mem::take(&mut self.tabs) {
            self.views.destroy(&tab.id);
        }
        self.closed_tabs.clear();
        self.host_steps.clear();
        self.current_tab_id = None;
        self.session.clear();
        self.create_tab(None);
        tracing::info!("session cleared");
    }
}
