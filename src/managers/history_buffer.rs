//! Global browsing history for one window.
//!
//! Visits are kept in memory in visit order, capped, and written to the store
//! on a debounce so a burst of navigations costs one write. Every write is
//! followed by a `HistoryUpdated` broadcast so history views in other windows
//! can reload.

use std::time::{Duration, Instant};

use crate::managers::debounce::DebouncedFlush;
use crate::services::event_bus::Publisher;
use crate::storage::{keys, read_json, write_json, SharedStore};
use crate::types::events::BrowserEvent;
use crate::types::history::HistoryEntry;

/// Maximum number of entries kept; the oldest are trimmed first.
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

/// Quiet period before buffered entries are written.
pub const DEFAULT_FLUSH_DELAY: Duration = Duration::from_secs(1);

pub struct HistoryBuffer {
    entries: Vec<HistoryEntry>,
    limit: usize,
    flush: DebouncedFlush,
    store: SharedStore,
    publisher: Publisher,
}

impl HistoryBuffer {
    pub fn new(store: SharedStore, publisher: Publisher, limit: usize, delay: Duration) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
            flush: DebouncedFlush::new(delay),
            store,
            publisher,
        }
    }

    /// Replaces the buffer with what the store holds.
    pub fn load(&mut self) {
        let mut entries: Vec<HistoryEntry> = read_json(self.store.as_ref(), keys::BROWSER_HISTORY);
        entries.retain(|e| !e.url.is_empty());
        self.entries = entries;
        self.trim();
    }

    /// Re-reads the store after another window wrote it. Skipped while this
    /// window has unsaved entries, since its own flush will win anyway.
    pub fn reload(&mut self) {
        if self.flush.is_pending() {
            tracing::debug!("history reload skipped, local flush pending");
            return;
        }
        self.load();
    }

    /// Records a visit. See [`HistoryBuffer::add_entry_at`].
    pub fn add_entry(&mut self, entry: HistoryEntry) -> bool {
        self.add_entry_at(entry, Instant::now())
    }

    /// Records a visit observed at `now`.
    ///
    /// Entries without a URL are rejected, and an entry equal to the one just
    /// before it is collapsed. Returns whether the entry was appended.
    pub fn add_entry_at(&mut self, entry: HistoryEntry, now: Instant) -> bool {
        if entry.url.is_empty() {
            return false;
        }
        if self.entries.last().map(|last| last.url.as_str()) == Some(entry.url.as_str()) {
            return false;
        }
        self.entries.push(entry);
        self.trim();
        self.flush.schedule(now);
        true
    }

    /// Flushes if the debounce deadline has passed. Returns whether it did.
    pub fn poll_flush(&mut self, now: Instant) -> bool {
        if self.flush.take_due(now) {
            self.flush();
            true
        } else {
            false
        }
    }

    /// Writes the buffer now and announces it, cancelling any pending write.
    ///
    /// A store failure loses durability of the latest entries but the
    /// announcement still goes out.
    pub fn flush(&mut self) {
        self.flush.cancel();
        if let Err(e) = write_json(self.store.as_ref(), keys::BROWSER_HISTORY, &self.entries) {
            tracing::error!(error = %e, "failed to persist history");
        }
        self.publisher.publish(BrowserEvent::HistoryUpdated);
    }

    /// Empties the buffer and the stored copy. Other windows only learn that
    /// history changed; asking them to drop their caches is up to the caller.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.flush();
    }

    /// Drops the in-memory copy without touching the store.
    pub fn discard(&mut self) {
        self.flush.cancel();
        self.entries.clear();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_pending_flush(&self) -> bool {
        self.flush.is_pending()
    }

    /// Case-insensitive match on url, title, and host; newest first.
    pub fn search(&self, query: &str) -> Vec<&HistoryEntry> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .rev()
            .filter(|e| {
                e.url.to_lowercase().contains(&needle)
                    || e.title.as_deref().is_some_and(|t| t.to_lowercase().contains(&needle))
                    || e.host.as_deref().is_some_and(|h| h.to_lowercase().contains(&needle))
            })
            .collect()
    }

    fn trim(&mut self) {
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
    }
}
