//! View bridge: the seam between logical tabs and host-managed web views.
//!
//! The core never owns a rendering surface. It issues [`ViewCommand`]s to a
//! [`ViewHost`] and receives [`ViewEvent`]s back. Delivery is fire-and-forget;
//! the host is assumed to ignore commands for views it already destroyed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::tab::TabId;

pub mod json_host;
pub mod logging_host;
pub mod recording;

pub use json_host::JsonLineViewHost;
pub use logging_host::LoggingViewHost;
pub use recording::RecordingViewHost;

/// Outbound command to the view host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewCommand {
    #[serde(rename_all = "camelCase")]
    Create { tab_id: TabId },
    #[serde(rename_all = "camelCase")]
    Destroy { tab_id: TabId },
    #[serde(rename_all = "camelCase")]
    Navigate { tab_id: TabId, url: String },
    #[serde(rename_all = "camelCase")]
    Reload { tab_id: TabId },
    #[serde(rename_all = "camelCase")]
    Back { tab_id: TabId },
    #[serde(rename_all = "camelCase")]
    Forward { tab_id: TabId },
    #[serde(rename_all = "camelCase")]
    Show { tab_id: TabId },
    /// Hides every view so the shell can draw its own page.
    Hide,
}

impl ViewCommand {
    pub fn tab_id(&self) -> Option<&str> {
        match self {
            ViewCommand::Create { tab_id }
            | ViewCommand::Destroy { tab_id }
            | ViewCommand::Navigate { tab_id, .. }
            | ViewCommand::Reload { tab_id }
            | ViewCommand::Back { tab_id }
            | ViewCommand::Forward { tab_id }
            | ViewCommand::Show { tab_id } => Some(tab_id),
            ViewCommand::Hide => None,
        }
    }
}

/// Inbound callback from the view host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewEvent {
    /// The view committed a navigation on its own (link click, redirect, ...).
    #[serde(rename_all = "camelCase")]
    Navigated { tab_id: TabId, url: String },
    #[serde(rename_all = "camelCase")]
    TitleUpdated { tab_id: TabId, title: String },
    /// Page asked for a new window; the shell opens a tab instead.
    NewWindow { url: String },
    OpenInNewTab { url: String },
}

/// Something that renders tabs.
pub trait ViewHost {
    fn dispatch(&mut self, command: ViewCommand);
}

/// Keeps the 1:1 mapping between tab records and host views.
///
/// Commands aimed at a tab whose view was never created (or was already
/// destroyed) are dropped here instead of reaching the host.
pub struct ViewBridge {
    host: Box<dyn ViewHost>,
    live: HashSet<TabId>,
}

impl ViewBridge {
    pub fn new(host: Box<dyn ViewHost>) -> Self {
        Self {
            host,
            live: HashSet::new(),
        }
    }

    pub fn is_live(&self, tab_id: &str) -> bool {
        self.live.contains(tab_id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn create(&mut self, tab_id: &str) {
        if self.live.insert(tab_id.to_string()) {
            self.host.dispatch(ViewCommand::Create {
                tab_id: tab_id.to_string(),
            });
        }
    }

    pub fn destroy(&mut self, tab_id: &str) {
        if self.live.remove(tab_id) {
            self.host.dispatch(ViewCommand::Destroy {
                tab_id: tab_id.to_string(),
            });
        }
    }

    pub fn navigate(&mut self, tab_id: &str, url: &str) {
        self.send(ViewCommand::Navigate {
            tab_id: tab_id.to_string(),
            url: url.to_string(),
        });
    }

    pub fn reload(&mut self, tab_id: &str) {
        self.send(ViewCommand::Reload {
            tab_id: tab_id.to_string(),
        });
    }

    pub fn back(&mut self, tab_id: &str) {
        self.send(ViewCommand::Back {
            tab_id: tab_id.to_string(),
        });
    }

    pub fn forward(&mut self, tab_id: &str) {
        self.send(ViewCommand::Forward {
            tab_id: tab_id.to_string(),
        });
    }

    pub fn show(&mut self, tab_id: &str) {
        self.send(ViewCommand::Show {
            tab_id: tab_id.to_string(),
        });
    }

    pub fn hide(&mut self) {
        self.host.dispatch(ViewCommand::Hide);
    }

    fn send(&mut self, command: ViewCommand) {
        let known = command.tab_id().map_or(true, |id| self.live.contains(id));
        if known {
            self.host.dispatch(command);
        } else {
            tracing::debug!(?command, "dropping command for unknown view");
        }
    }
}
