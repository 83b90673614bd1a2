use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use global_search::store_file::FileKeyValueStore;
use global_search_core::history::HistoryStore;
use global_search_core::models::{Collection, HistoryEntry};
use global_search_core::store::{KeyValueStore, RECENT_ITEMS_KEY, SEARCH_HISTORY_KEY};

#[test]
fn test_missing_file_reads_as_empty() {
    let tmp = TempDir::new().unwrap();
    let store = FileKeyValueStore::new(tmp.path().join("absent.json"));
    assert_eq!(store.get(SEARCH_HISTORY_KEY).unwrap(), None);
}

#[test]
fn test_set_creates_parent_and_keeps_other_keys() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("dir").join("state.json");
    let store = FileKeyValueStore::new(&path);

    store.set(SEARCH_HISTORY_KEY, "[1]").unwrap();
    store.set(RECENT_ITEMS_KEY, "[2]").unwrap();
    store.set(SEARCH_HISTORY_KEY, "[3]").unwrap();

    assert_eq!(store.get(SEARCH_HISTORY_KEY).unwrap().as_deref(), Some("[3]"));
    assert_eq!(store.get(RECENT_ITEMS_KEY).unwrap().as_deref(), Some("[2]"));

    let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("state.json")]);
}

#[test]
fn test_corrupt_file_errors_on_read_and_is_replaced_on_write() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("state.json");
    fs::write(&path, "{not json").unwrap();
    let store = FileKeyValueStore::new(&path);

    assert!(store.get(SEARCH_HISTORY_KEY).is_err());
    store.set(SEARCH_HISTORY_KEY, "[]").unwrap();
    assert_eq!(store.get(SEARCH_HISTORY_KEY).unwrap().as_deref(), Some("[]"));
}

#[test]
fn test_history_round_trip_through_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("state.json");
    let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&path));

    let mut history = HistoryStore::load(Arc::clone(&store));
    history.add(HistoryEntry {
        query: "budget".to_string(),
        kind: Collection::Goals,
        title: "Cut budget".to_string(),
        timestamp: 1_700_000_000_000,
    });

    let reloaded = HistoryStore::load(Arc::new(FileKeyValueStore::new(&path)));
    assert_eq!(reloaded.entries(), history.entries());
}

#[test]
fn test_corrupt_file_loads_empty_history() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("state.json");
    fs::write(&path, "garbage").unwrap();

    let history = HistoryStore::load(Arc::new(FileKeyValueStore::new(&path)));
    assert!(history.is_empty());
}
