//! Data source abstraction and the concurrent fan-out over it.
//!
//! A search under scope `all` issues one request per collection; any other
//! scope issues exactly one. Requests settle independently: a collection
//! whose request fails is dropped from the aggregate and logged, and the
//! search only fails when every request fails.

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::SearchError;
use crate::models::{Collection, RawEntity, SearchQuery, SearchResult};
use crate::rank::{filter_and_score, RecentSet};

/// Remote entity collections.
///
/// Implementations return the raw entities of one collection for a query.
/// Any error (transport, non-2xx status, malformed body) marks that one
/// collection as failed for the current search.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, collection: Collection, query: &SearchQuery) -> Result<Vec<RawEntity>>;
}

#[async_trait]
impl<D: DataSource + ?Sized> DataSource for Arc<D> {
    async fn fetch(&self, collection: Collection, query: &SearchQuery) -> Result<Vec<RawEntity>> {
        (**self).fetch(collection, query).await
    }
}

/// Query every collection of `query.scope` concurrently and return the
/// matching, scored (but not yet sorted) candidates.
pub async fn fan_out<D: DataSource + ?Sized>(
    source: &D,
    query: &SearchQuery,
    recent: &RecentSet,
) -> Result<Vec<SearchResult>, SearchError> {
    let collections = query.scope.collections();
    let requests = collections.iter().map(|&collection| async move {
        let response = source.fetch(collection, query).await;
        (collection, response)
    });

    let settled = join_all(requests).await;
    let total = settled.len();
    let mut failed = 0;
    let mut candidates = Vec::new();

    for (collection, response) in settled {
        match response {
            Ok(entities) => {
                candidates.extend(filter_and_score(entities, collection, &query.text, recent));
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(%collection, error = %e, "search source failed, dropping");
            }
        }
    }

    if total > 0 && failed == total {
        return Err(SearchError::AllSourcesFailed { failed });
    }

    tracing::debug!(
        scope = %query.scope,
        candidates = candidates.len(),
        failed,
        "fan-out settled"
    );
    Ok(candidates)
}

/// In-memory [`DataSource`] for testing and offline demos.
///
/// Returns every stored entity of the requested collection (matching is
/// left to the ranker). Collections can be marked as failing, and the
/// number of `fetch` calls is counted.
pub struct MemoryDataSource {
    entities: RwLock<HashMap<Collection, Vec<RawEntity>>>,
    failing: RwLock<HashSet<Collection>>,
    calls: AtomicUsize,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, collection: Collection, entity: RawEntity) {
        let mut entities = self.entities.write().unwrap_or_else(|e| e.into_inner());
        entities.entry(collection).or_default().push(entity);
    }

    /// Make every subsequent fetch of `collection` fail.
    pub fn fail(&self, collection: Collection) {
        let mut failing = self.failing.write().unwrap_or_else(|e| e.into_inner());
        failing.insert(collection);
    }

    /// Number of `fetch` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MemoryDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for MemoryDataSource {
    async fn fetch(&self, collection: Collection, _query: &SearchQuery) -> Result<Vec<RawEntity>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing.read().unwrap_or_else(|e| e.into_inner());
        if failing.contains(&collection) {
            anyhow::bail!("{} unavailable", collection);
        }
        let entities = self.entities.read().unwrap_or_else(|e| e.into_inner());
        Ok(entities.get(&collection).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Scope;

    fn seeded() -> MemoryDataSource {
        let source = MemoryDataSource::new();
        for (i, c) in Collection::ALL.iter().enumerate() {
            source.insert(*c, RawEntity::titled(i as i64, &format!("Alpha {}", c)));
            source.insert(*c, RawEntity::titled(100 + i as i64, "Unrelated"));
        }
        source
    }

    #[tokio::test]
    async fn test_all_scope_queries_six_collections() {
        let source = seeded();
        let query = SearchQuery::new("alpha", Scope::All);
        let out = fan_out(&source, &query, &RecentSet::new()).await.unwrap();
        assert_eq!(source.calls(), 6);
        assert_eq!(out.len(), 6);
    }

    #[tokio::test]
    async fn test_single_scope_queries_one_collection() {
        let source = seeded();
        let query = SearchQuery::new("alpha", Scope::Goals);
        let out = fan_out(&source, &query, &RecentSet::new()).await.unwrap();
        assert_eq!(source.calls(), 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, Collection::Goals);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_fulfilled_sources() {
        let source = seeded();
        source.fail(Collection::Tasks);
        source.fail(Collection::Notes);
        let query = SearchQuery::new("alpha", Scope::All);

        let out = fan_out(&source, &query, &RecentSet::new()).await.unwrap();
        assert_eq!(source.calls(), 6);
        assert_eq!(out.len(), 4);
        assert!(out
            .iter()
            .all(|r| r.kind != Collection::Tasks && r.kind != Collection::Notes));
    }

    #[tokio::test]
    async fn test_total_failure_is_an_error() {
        let source = seeded();
        for c in Collection::ALL {
            source.fail(c);
        }
        let query = SearchQuery::new("alpha", Scope::All);
        let err = fan_out(&source, &query, &RecentSet::new()).await.unwrap_err();
        assert!(matches!(err, SearchError::AllSourcesFailed { failed: 6 }));
    }

    #[tokio::test]
    async fn test_single_scope_failure_is_total() {
        let source = seeded();
        source.fail(Collection::Tags);
        let query = SearchQuery::new("alpha", Scope::Tags);
        assert!(fan_out(&source, &query, &RecentSet::new()).await.is_err());
    }
}
