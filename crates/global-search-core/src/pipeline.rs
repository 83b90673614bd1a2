//! The pure search pipeline: cache → fan-out → rank → group.
//!
//! [`SearchPipeline`] holds no UI state. It is shared behind an `Arc` so a
//! search can run on its own task while the controller keeps handling
//! input; the cache is the only mutable part and sits behind a mutex that
//! is never held across an await point.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::cache::{CacheKey, QueryCache};
use crate::clock::Clock;
use crate::error::SearchError;
use crate::group::group_by_type;
use crate::models::{ResultGroup, SearchQuery, SearchResult};
use crate::rank::{sort_by_relevance, RecentSet};
use crate::source::{fan_out, DataSource};

pub struct SearchPipeline {
    source: Arc<dyn DataSource>,
    cache: Mutex<QueryCache>,
    clock: Arc<dyn Clock>,
}

impl SearchPipeline {
    pub fn new(source: Arc<dyn DataSource>, cache: QueryCache, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            cache: Mutex::new(cache),
            clock,
        }
    }

    /// Ranked results for `query`.
    ///
    /// A cache hit returns the stored list without touching the data source.
    /// On a miss, the collections are fanned out, candidates are ranked, and
    /// the list is cached. Total failures are not cached.
    pub async fn search(
        &self,
        query: &SearchQuery,
        recent: &RecentSet,
    ) -> Result<Arc<[SearchResult]>, SearchError> {
        if query.text.is_empty() {
            return Ok(Arc::from(Vec::new()));
        }

        let key = CacheKey::build(query)?;
        let now = self.clock.now_millis();
        let cached = self.lock_cache().get(&key, now);
        if let Some(hit) = cached {
            tracing::debug!(key = %key, results = hit.len(), "search cache hit");
            return Ok(hit);
        }

        let mut candidates = fan_out(self.source.as_ref(), query, recent).await?;
        sort_by_relevance(&mut candidates);
        let results: Arc<[SearchResult]> = Arc::from(candidates);

        tracing::debug!(key = %key, results = results.len(), "search cache store");
        self.lock_cache()
            .put(key, Arc::clone(&results), self.clock.now_millis());
        Ok(results)
    }

    /// [`search`](Self::search) followed by grouping.
    pub async fn search_grouped(
        &self,
        query: &SearchQuery,
        recent: &RecentSet,
    ) -> Result<Vec<ResultGroup>, SearchError> {
        let ranked = self.search(query, recent).await?;
        Ok(group_by_type(&ranked))
    }

    /// `(hits, misses, entries)` of the query cache.
    pub fn cache_stats(&self) -> (u64, u64, usize) {
        let cache = self.lock_cache();
        let (hits, misses) = cache.stats();
        (hits, misses, cache.len())
    }

    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    fn lock_cache(&self) -> MutexGuard<'_, QueryCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}
