//! Key-value persistence abstraction.
//!
//! History and recent items are persisted through [`KeyValueStore`], so the
//! backend (a JSON file on disk, browser storage, a remote profile store) is
//! swappable. Values are serialized JSON strings.

pub mod memory;

use anyhow::Result;

/// Store key holding the JSON array of history entries.
pub const SEARCH_HISTORY_KEY: &str = "search-history";
/// Store key holding the JSON array of recent items.
pub const RECENT_ITEMS_KEY: &str = "recent-items";

/// Minimal string key-value store.
///
/// Reads and writes are expected to be fast; they are still fallible, and
/// callers treat any failure as "no data" or a no-op.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}
