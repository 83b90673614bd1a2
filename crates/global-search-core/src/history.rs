//! Bounded, deduplicated, persisted lists of past searches and visits.
//!
//! Both lists share one shape: adding an entry removes any existing entry
//! with the same uniqueness key, puts the new entry first, truncates to the
//! cap, and writes the list back to the [`KeyValueStore`]. Missing or
//! malformed persisted data loads as an empty list; failed writes are logged
//! and otherwise ignored.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::models::{HistoryEntry, RecentItem};
use crate::rank::RecentSet;
use crate::store::{KeyValueStore, RECENT_ITEMS_KEY, SEARCH_HISTORY_KEY};

pub const HISTORY_CAP: usize = 50;
pub const RECENT_ITEMS_CAP: usize = 20;

/// An element of a [`PersistedList`].
pub trait ListEntry: Serialize + DeserializeOwned + Clone {
    /// Key the list is persisted under.
    const STORE_KEY: &'static str;
    /// Maximum number of entries kept.
    const CAP: usize;

    /// Whether `other` has the same uniqueness key as `self`.
    fn same_entry(&self, other: &Self) -> bool;
}

impl ListEntry for HistoryEntry {
    const STORE_KEY: &'static str = SEARCH_HISTORY_KEY;
    const CAP: usize = HISTORY_CAP;

    fn same_entry(&self, other: &Self) -> bool {
        self.query == other.query && self.kind == other.kind && self.title == other.title
    }
}

impl ListEntry for RecentItem {
    const STORE_KEY: &'static str = RECENT_ITEMS_KEY;
    const CAP: usize = RECENT_ITEMS_CAP;

    fn same_entry(&self, other: &Self) -> bool {
        self.entity.id == other.entity.id && self.kind == other.kind
    }
}

/// Most-recent-first list mirrored to a key-value store.
pub struct PersistedList<T: ListEntry> {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<T>,
}

pub type HistoryStore = PersistedList<HistoryEntry>;
pub type RecentItemStore = PersistedList<RecentItem>;

impl<T: ListEntry> PersistedList<T> {
    /// Load the list from `store`.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = read_entries::<T>(store.as_ref());
        Self { store, entries }
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, entry: T) {
        self.entries.retain(|existing| !existing.same_entry(&entry));
        self.entries.insert(0, entry);
        self.entries.truncate(T::CAP);
        self.save();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.save();
    }

    /// Write the current list back to the store. Failures are logged only.
    pub fn save(&self) {
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key = T::STORE_KEY, error = %e, "failed to encode list");
                return;
            }
        };
        if let Err(e) = self.store.set(T::STORE_KEY, &json) {
            tracing::warn!(key = T::STORE_KEY, error = %e, "failed to persist list");
        }
    }
}

impl PersistedList<RecentItem> {
    /// `(id, type)` pairs of every recent item, for the ranking bonus.
    pub fn recent_set(&self) -> RecentSet {
        self.entries
            .iter()
            .map(|item| (item.entity.id.clone(), item.kind))
            .collect()
    }
}

fn read_entries<T: ListEntry>(store: &dyn KeyValueStore) -> Vec<T> {
    let raw = match store.get(T::STORE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::debug!(key = T::STORE_KEY, error = %e, "failed to read list");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(mut entries) => {
            entries.truncate(T::CAP);
            entries
        }
        Err(e) => {
            tracing::warn!(key = T::STORE_KEY, error = %e, "ignoring malformed persisted list");
            Vec::new()
        }
    }
}
