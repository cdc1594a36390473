//! Bookmark and quick-link collections.
//!
//! Both are ordered `{url, label}` lists, unique by URL and deleted by index.
//! Entries written by older builds as bare URL strings are rewritten as
//! [`Link`]s the first time the collection is loaded.

use tracing::{info, warn};
use url::Url;

use crate::storage::{keys, read_json, write_json, SharedStore};
use crate::types::bookmark::{Link, StoredLink};
use crate::types::errors::BookmarkError;
use crate::types::history::host_of;

/// Trait defining link collection operations.
pub trait BookmarkManagerTrait {
    fn add(&mut self, url: &str, label: Option<&str>) -> Result<usize, BookmarkError>;
    fn remove(&mut self, index: usize) -> Result<Link, BookmarkError>;
    fn list(&self) -> &[Link];
    fn contains(&self, url: &str) -> bool;
}

/// One persisted collection of links under a single store key.
pub struct LinkCollection {
    key: &'static str,
    links: Vec<Link>,
    store: SharedStore,
}

impl LinkCollection {
    /// Loads the collection stored under `key`, migrating legacy entries.
    pub fn load(store: SharedStore, key: &'static str) -> Self {
        let stored: Vec<StoredLink> = read_json(store.as_ref(), key);
        let migrate = stored.iter().any(StoredLink::is_legacy);

        let mut links: Vec<Link> = Vec::with_capacity(stored.len());
        for link in stored.into_iter().map(StoredLink::into_link) {
            if !links.iter().any(|l| l.url == link.url) {
                links.push(link);
            }
        }

        let collection = Self { key, links, store };
        if migrate {
            info!(key, "migrating legacy link entries");
            if let Err(e) = collection.persist() {
                warn!(key, error = %e, "failed to rewrite migrated links");
            }
        }
        collection
    }

    pub fn bookmarks(store: SharedStore) -> Self {
        Self::load(store, keys::BOOKMARKS)
    }

    pub fn quick_links(store: SharedStore) -> Self {
        Self::load(store, keys::QUICK_LINKS)
    }

    pub fn key(&self) -> &str {
        self.key
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    fn persist(&self) -> Result<(), BookmarkError> {
        write_json(self.store.as_ref(), self.key, &self.links)?;
        Ok(())
    }

    fn validate_url(url: &str) -> Result<String, BookmarkError> {
        let trimmed = url.trim();
        if trimmed.is_empty()
            || trimmed.chars().any(char::is_whitespace)
            || Url::parse(trimmed).is_err()
        {
            return Err(BookmarkError::InvalidUrl(url.to_string()));
        }
        Ok(trimmed.to_string())
    }
}

impl BookmarkManagerTrait for LinkCollection {
    /// Appends a link. A missing or blank label defaults to the URL's host.
    /// Returns the new link's index.
    fn add(&mut self, url: &str, label: Option<&str>) -> Result<usize, BookmarkError> {
        let url = Self::validate_url(url)?;
        if self.contains(&url) {
            return Err(BookmarkError::DuplicateUrl(url));
        }
        let label = match label.map(str::trim) {
            Some(l) if !l.is_empty() => l.to_string(),
            _ => host_of(&url).unwrap_or_else(|| url.clone()),
        };
        self.links.push(Link { url, label });
        if let Err(e) = self.persist() {
            self.links.pop();
            return Err(e);
        }
        Ok(self.links.len() - 1)
    }

    fn remove(&mut self, index: usize) -> Result<Link, BookmarkError> {
        if index >= self.links.len() {
            return Err(BookmarkError::InvalidIndex(index));
        }
        let removed = self.links.remove(index);
        if let Err(e) = self.persist() {
            self.links.insert(index, removed);
            return Err(e);
        }
        Ok(removed)
    }

    fn list(&self) -> &[Link] {
        &self.links
    }

    fn contains(&self, url: &str) -> bool {
        self.links.iter().any(|l| l.url == url)
    }
}
