//! One-shot search command (`gsearch search`).
//!
//! Runs a single query through the pipeline and prints the grouped results,
//! either as the text rendering used by the interactive modal or as JSON.
//! Recently viewed items from the state file still earn their ranking bonus.

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

use global_search_core::cache::QueryCache;
use global_search_core::clock::{Clock, SystemClock};
use global_search_core::controller::ViewState;
use global_search_core::history::RecentItemStore;
use global_search_core::models::{ResultGroup, Scope, SearchQuery};
use global_search_core::pipeline::SearchPipeline;
use global_search_core::render::{self, RenderInput};
use global_search_core::source::DataSource;
use global_search_core::store::KeyValueStore;

use crate::config::Config;
use crate::session;

/// Search `source` once, ranking with the recent items held in `store`.
pub async fn search_once(
    source: Arc<dyn DataSource>,
    store: Arc<dyn KeyValueStore>,
    query: &SearchQuery,
) -> Result<Vec<ResultGroup>> {
    let recent = RecentItemStore::load(store).recent_set();
    let pipeline = SearchPipeline::new(source, QueryCache::new(1, None), Arc::new(SystemClock));
    Ok(pipeline.search_grouped(query, &recent).await?)
}

pub async fn run_search(
    config: &Config,
    text: &str,
    scope: Scope,
    filters: BTreeMap<String, String>,
    json: bool,
) -> Result<()> {
    let query = SearchQuery::new(text, scope).with_filters(filters);
    if query.text.is_empty() {
        println!("No results.");
        return Ok(());
    }

    let groups = search_once(
        session::data_source(config)?,
        session::key_value_store(config),
        &query,
    )
    .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    let view = if groups.is_empty() {
        ViewState::NoResults {
            query: query.text.clone(),
        }
    } else {
        ViewState::Results {
            query: query.text.clone(),
            groups,
        }
    };
    print!(
        "{}",
        render::render(&RenderInput {
            view: &view,
            scope,
            history: &[],
            recent: &[],
            selected: None,
            now_millis: SystemClock.now_millis(),
        })
    );
    Ok(())
}
