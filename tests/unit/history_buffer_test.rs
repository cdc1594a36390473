use std::sync::Arc;
use std::time::{Duration, Instant};

use tabshell::managers::history_buffer::{HistoryBuffer, DEFAULT_HISTORY_LIMIT};
use tabshell::services::event_bus::EventBus;
use tabshell::storage::{keys, read_json, FallbackStore, KeyValueStore, MemoryStore, SharedStore};
use tabshell::types::errors::StoreError;
use tabshell::types::events::BrowserEvent;
use tabshell::types::history::HistoryEntry;

const DELAY: Duration = Duration::from_secs(1);

fn entry(url: &str) -> HistoryEntry {
    HistoryEntry::new(url, None, 0)
}

fn buffer(store: SharedStore, bus: &EventBus) -> HistoryBuffer {
    HistoryBuffer::new(store, bus.publisher("main"), DEFAULT_HISTORY_LIMIT, DELAY)
}

fn stored(store: &SharedStore) -> Vec<HistoryEntry> {
    read_json(store.as_ref(), keys::BROWSER_HISTORY)
}

/// A store whose writes always fail.
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("broken".into()))
    }
    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("broken".into()))
    }
    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("broken".into()))
    }
    fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable("broken".into()))
    }
}

#[test]
fn test_rejects_entry_without_url() {
    let bus = EventBus::default();
    let mut history = buffer(Arc::new(MemoryStore::new()), &bus);
    assert!(!history.add_entry(entry("")));
    assert!(history.is_empty());
    assert!(!history.has_pending_flush());
}

#[test]
fn test_immediate_repeat_is_collapsed() {
    let bus = EventBus::default();
    let mut history = buffer(Arc::new(MemoryStore::new()), &bus);
    assert!(history.add_entry(entry("https://a.test")));
    assert!(!history.add_entry(entry("https://a.test")));
    assert!(history.add_entry(entry("https://b.test")));
    assert!(history.add_entry(entry("https://a.test")));
    assert_eq!(history.len(), 3);
}

#[test]
fn test_trims_to_newest_entries_in_order() {
    let bus = EventBus::default();
    let mut history = buffer(Arc::new(MemoryStore::new()), &bus);
    for i in 0..=DEFAULT_HISTORY_LIMIT {
        history.add_entry(entry(&format!("https://{}.test", i)));
    }
    assert_eq!(history.len(), DEFAULT_HISTORY_LIMIT);
    assert_eq!(history.entries()[0].url, "https://1.test");
    assert_eq!(
        history.entries().last().unwrap().url,
        format!("https://{}.test", DEFAULT_HISTORY_LIMIT)
    );
}

#[test]
fn test_debounce_coalesces_burst_into_one_write() {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let bus = EventBus::default();
    let mut sub = bus.subscribe();
    let mut history = buffer(store.clone(), &bus);
    let start = Instant::now();

    history.add_entry_at(entry("https://a.test"), start);
    history.add_entry_at(entry("https://b.test"), start + Duration::from_millis(600));
    assert!(!history.poll_flush(start + Duration::from_millis(1200)));
    assert!(stored(&store).is_empty());

    assert!(history.poll_flush(start + Duration::from_millis(1600)));
    assert_eq!(stored(&store).len(), 2);
    assert!(!history.has_pending_flush());

    let events = sub.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, BrowserEvent::HistoryUpdated);
}

#[test]
fn test_flush_is_idempotent() {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let bus = EventBus::default();
    let mut history = buffer(store.clone(), &bus);
    history.add_entry(entry("https://a.test"));

    history.flush();
    let first = store.get(keys::BROWSER_HISTORY).unwrap();
    history.flush();
    let second = store.get(keys::BROWSER_HISTORY).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_flush_cancels_pending_deadline() {
    let bus = EventBus::default();
    let mut history = buffer(Arc::new(MemoryStore::new()), &bus);
    let start = Instant::now();
    history.add_entry_at(entry("https://a.test"), start);
    history.flush();
    assert!(!history.poll_flush(start + Duration::from_secs(5)));
}

#[test]
fn test_flush_falls_back_to_secondary_store() {
    let secondary: SharedStore = Arc::new(MemoryStore::new());
    let store: SharedStore = Arc::new(FallbackStore::new(Arc::new(BrokenStore), secondary.clone()));
    let bus = EventBus::default();
    let mut history = buffer(store, &bus);
    history.add_entry(entry("https://a.test"));
    history.flush();
    assert_eq!(stored(&secondary).len(), 1);
}

#[test]
fn test_flush_announces_even_when_store_fails() {
    let bus = EventBus::default();
    let mut sub = bus.subscribe();
    let mut history = buffer(Arc::new(BrokenStore), &bus);
    history.add_entry(entry("https://a.test"));
    history.flush();
    assert_eq!(sub.drain().len(), 1);
}

#[test]
fn test_clear_writes_empty_state_without_clear_request() {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let bus = EventBus::default();
    let mut sub = bus.subscribe();
    let mut history = buffer(store.clone(), &bus);
    history.add_entry(entry("https://a.test"));
    history.flush();
    sub.drain();

    history.clear();
    assert!(history.is_empty());
    assert!(stored(&store).is_empty());
    let events: Vec<BrowserEvent> = sub.drain().into_iter().map(|e| e.event).collect();
    assert_eq!(events, vec![BrowserEvent::HistoryUpdated]);
}

#[test]
fn test_reload_picks_up_other_writer() {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let bus = EventBus::default();
    let mut mine = buffer(store.clone(), &bus);
    let mut theirs = buffer(store.clone(), &bus);

    theirs.add_entry(entry("https://a.test"));
    theirs.flush();
    mine.reload();
    assert_eq!(mine.len(), 1);
}

#[test]
fn test_reload_skipped_while_flush_pending() {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let bus = EventBus::default();
    let mut mine = buffer(store.clone(), &bus);
    let mut theirs = buffer(store.clone(), &bus);

    mine.add_entry(entry("https://mine.test"));
    theirs.add_entry(entry("https://theirs.test"));
    theirs.flush();
    mine.reload();
    assert_eq!(mine.entries()[0].url, "https://mine.test");
}

#[test]
fn test_load_ignores_malformed_store() {
    let store: SharedStore = Arc::new(MemoryStore::new());
    store.set(keys::BROWSER_HISTORY, "{not json").unwrap();
    let bus = EventBus::default();
    let mut history = buffer(store, &bus);
    history.load();
    assert!(history.is_empty());
}

#[test]
fn test_search_is_case_insensitive_newest_first() {
    let bus = EventBus::default();
    let mut history = buffer(Arc::new(MemoryStore::new()), &bus);
    history.add_entry(HistoryEntry::new("https://docs.rs/serde", Some("Serde"), 1));
    history.add_entry(HistoryEntry::new("https://example.com", None, 2));
    history.add_entry(HistoryEntry::new("https://crates.io/serde_json", None, 3));

    let hits = history.search("SERDE");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].url, "https://crates.io/serde_json");
    assert_eq!(history.search("example.com").len(), 1);
}

#[test]
fn test_entry_host_drops_port_and_credentials() {
    let entry = HistoryEntry::new("https://user:pw@Example.COM:8080/x", None, 0);
    assert_eq!(entry.host.as_deref(), Some("example.com"));

    let bus = EventBus::default();
    let mut history = buffer(Arc::new(MemoryStore::new()), &bus);
    history.add_entry(entry);
    assert_eq!(history.search("8080").len(), 1);
    assert_eq!(history.search("example.com").len(), 1);
}
