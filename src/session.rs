//! Wiring of config into the core types.

use anyhow::Result;
use std::sync::Arc;

use global_search_core::clock::{Clock, SystemClock};
use global_search_core::controller::SearchController;
use global_search_core::source::DataSource;
use global_search_core::store::KeyValueStore;

use crate::config::Config;
use crate::source_http::HttpDataSource;
use crate::store_file::FileKeyValueStore;

pub fn data_source(config: &Config) -> Result<Arc<dyn DataSource>> {
    Ok(Arc::new(HttpDataSource::new(&config.api)?))
}

pub fn key_value_store(config: &Config) -> Arc<dyn KeyValueStore> {
    Arc::new(FileKeyValueStore::new(&config.storage.path))
}

/// A closed controller over the HTTP API and the on-disk state file.
pub fn controller(config: &Config) -> Result<SearchController> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    Ok(SearchController::new(
        data_source(config)?,
        key_value_store(config),
        clock,
        config.search.controller_options(),
    ))
}

/// Absolute link for an activated result path.
pub fn absolute_url(config: &Config, path: &str) -> String {
    format!("{}{}", config.api.base_url.trim_end_matches('/'), path)
}
