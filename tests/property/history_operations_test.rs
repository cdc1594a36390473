//! Property-based tests for the global history buffer.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use tabshell::managers::history_buffer::HistoryBuffer;
use tabshell::services::event_bus::EventBus;
use tabshell::storage::{keys, read_json, KeyValueStore, MemoryStore, SharedStore};
use tabshell::types::history::HistoryEntry;

fn buffer(store: SharedStore, limit: usize) -> HistoryBuffer {
    let bus = EventBus::default();
    HistoryBuffer::new(store, bus.publisher("main"), limit, Duration::from_secs(1))
}

fn arb_visits() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..6usize, 0..200)
}

fn url(i: usize) -> String {
    format!("https://site{}.test/", i)
}

/// Expected log: consecutive repeats collapsed, then only the newest `limit`.
fn model(visits: &[usize], limit: usize) -> Vec<String> {
    let mut log: Vec<String> = Vec::new();
    for v in visits {
        let u = url(*v);
        if log.last() != Some(&u) {
            log.push(u);
        }
    }
    let excess = log.len().saturating_sub(limit);
    log.split_off(excess)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn buffer_matches_model(visits in arb_visits(), limit in 1..50usize) {
        let mut history = buffer(Arc::new(MemoryStore::new()), limit);
        for v in &visits {
            history.add_entry(HistoryEntry::new(&url(*v), None, 0));
        }
        let urls: Vec<String> = history.entries().iter().map(|e| e.url.clone()).collect();
        prop_assert!(urls.len() <= limit);
        prop_assert!(urls.windows(2).all(|w| w[0] != w[1]));
        prop_assert_eq!(urls, model(&visits, limit));
    }

    #[test]
    fn flush_persists_buffer_and_is_idempotent(visits in arb_visits()) {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut history = buffer(store.clone(), 500);
        for v in &visits {
            history.add_entry(HistoryEntry::new(&url(*v), None, 0));
        }
        history.flush();
        let first = store.get(keys::BROWSER_HISTORY).unwrap();
        history.flush();
        prop_assert_eq!(&store.get(keys::BROWSER_HISTORY).unwrap(), &first);

        let stored: Vec<HistoryEntry> = read_json(store.as_ref(), keys::BROWSER_HISTORY);
        prop_assert_eq!(stored.as_slice(), history.entries());
    }
}
