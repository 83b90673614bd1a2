//! History command (`gsearch history`).

use anyhow::Result;
use std::sync::Arc;

use global_search_core::clock::{Clock, SystemClock};
use global_search_core::controller::ViewState;
use global_search_core::history::{HistoryStore, RecentItemStore};
use global_search_core::models::Scope;
use global_search_core::render::{self, RenderInput};
use global_search_core::store::KeyValueStore;

use crate::config::Config;
use crate::session;

/// The recent view (past searches and recently viewed items) as text.
pub fn recent_view(store: Arc<dyn KeyValueStore>, now_millis: i64) -> String {
    let history = HistoryStore::load(Arc::clone(&store));
    let recent = RecentItemStore::load(store);
    render::render(&RenderInput {
        view: &ViewState::Recent,
        scope: Scope::All,
        history: history.entries(),
        recent: recent.entries(),
        selected: None,
        now_millis,
    })
}

/// Empty both persisted lists.
pub fn clear(store: Arc<dyn KeyValueStore>) {
    HistoryStore::load(Arc::clone(&store)).clear();
    RecentItemStore::load(store).clear();
}

pub fn run_history(config: &Config, clear_all: bool) -> Result<()> {
    let store = session::key_value_store(config);
    if clear_all {
        clear(store);
        println!("Search history cleared.");
        return Ok(());
    }
    print!("{}", recent_view(store, SystemClock.now_millis()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use global_search_core::store::memory::MemoryKeyValueStore;
    use global_search_core::store::SEARCH_HISTORY_KEY;

    #[test]
    fn test_recent_view_and_clear() {
        let store = Arc::new(MemoryKeyValueStore::with_value(
            SEARCH_HISTORY_KEY,
            r#"[{"query":"launch","type":"goals","title":"Launch v2","timestamp":0}]"#,
        ));

        let out = recent_view(store.clone(), 3 * 3_600_000);
        assert!(out.contains("launch  goals • Launch v2  3h ago"));

        clear(store.clone());
        assert!(recent_view(store, 0).starts_with("Start typing to search"));
    }
}
