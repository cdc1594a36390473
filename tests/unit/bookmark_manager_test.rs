//! Unit tests for the bookmark and quick-link collections.
//!
//! These tests exercise add/remove/list through `BookmarkManagerTrait`,
//! including the one-time migration of legacy bare-URL entries.

use std::sync::Arc;

use rstest::rstest;
use tabshell::managers::bookmark_manager::{BookmarkManagerTrait, LinkCollection};
use tabshell::storage::{keys, read_json, KeyValueStore, MemoryStore, SharedStore};
use tabshell::types::bookmark::Link;
use tabshell::types::errors::BookmarkError;

fn setup() -> (LinkCollection, SharedStore) {
    let store: SharedStore = Arc::new(MemoryStore::new());
    (LinkCollection::bookmarks(store.clone()), store)
}

#[test]
fn test_add_and_list() {
    let (mut links, _) = setup();
    assert_eq!(links.add("https://github.com", Some("GitHub")).unwrap(), 0);
    assert_eq!(links.add("https://docs.rs/tokio", None).unwrap(), 1);

    assert_eq!(
        links.list(),
        &[
            Link::new("https://github.com", "GitHub"),
            Link::new("https://docs.rs/tokio", "docs.rs"),
        ]
    );
}

#[test]
fn test_duplicate_url_is_rejected() {
    let (mut links, _) = setup();
    links.add("https://a.test", None).unwrap();
    let err = links.add("https://a.test", Some("Again")).unwrap_err();
    assert!(matches!(err, BookmarkError::DuplicateUrl(ref url) if url == "https://a.test"));
    assert_eq!(links.len(), 1);
}

#[rstest]
#[case::empty("")]
#[case::blank("   ")]
#[case::spaces("not a url")]
#[case::relative("example.com/path")]
fn test_invalid_url_is_rejected(#[case] url: &str) {
    let (mut links, _) = setup();
    assert!(matches!(links.add(url, None), Err(BookmarkError::InvalidUrl(_))));
    assert!(links.is_empty());
}

#[test]
fn test_default_label_is_bare_host() {
    let (mut links, _) = setup();
    links.add("https://user:pw@Docs.RS:8443/tokio", None).unwrap();
    assert_eq!(links.list()[0].label, "docs.rs");
}

#[test]
fn test_remove_by_index() {
    let (mut links, store) = setup();
    links.add("https://a.test", None).unwrap();
    links.add("https://b.test", None).unwrap();

    let removed = links.remove(0).unwrap();
    assert_eq!(removed.url, "https://a.test");
    assert!(!links.contains("https://a.test"));

    let stored: Vec<Link> = read_json(store.as_ref(), keys::BOOKMARKS);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].url, "https://b.test");
}

#[test]
fn test_remove_out_of_range() {
    let (mut links, _) = setup();
    links.add("https://a.test", None).unwrap();
    assert!(matches!(links.remove(3), Err(BookmarkError::InvalidIndex(3))));
    assert_eq!(links.len(), 1);
}

#[test]
fn test_changes_persist_across_reload() {
    let (mut links, store) = setup();
    links.add("https://a.test", Some("A")).unwrap();
    let reloaded = LinkCollection::bookmarks(store);
    assert_eq!(reloaded.list(), &[Link::new("https://a.test", "A")]);
}

#[test]
fn test_legacy_strings_are_migrated_once() {
    let store: SharedStore = Arc::new(MemoryStore::new());
    store
        .set(
            keys::QUICK_LINKS,
            r#"["https://github.com/rust-lang", {"url":"https://docs.rs","label":"Docs"}]"#,
        )
        .unwrap();

    let links = LinkCollection::quick_links(store.clone());
    assert_eq!(
        links.list(),
        &[
            Link::new("https://github.com/rust-lang", "github.com"),
            Link::new("https://docs.rs", "Docs"),
        ]
    );

    let raw = store.get(keys::QUICK_LINKS).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value.as_array().unwrap().iter().all(|v| v.is_object()));
}

#[test]
fn test_bookmarks_and_quick_links_are_separate() {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let mut bookmarks = LinkCollection::bookmarks(store.clone());
    let quick = LinkCollection::quick_links(store);
    bookmarks.add("https://a.test", None).unwrap();
    assert!(quick.is_empty());
    assert_eq!(bookmarks.key(), keys::BOOKMARKS);
}
