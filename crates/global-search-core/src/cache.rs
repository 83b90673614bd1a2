//! Memoization of ranked result lists.
//!
//! Entries are keyed by `(scope, query, filters)`. A hit hands back the very
//! same `Arc` that was stored, so callers can rely on pointer identity and no
//! request is ever re-issued for a live entry.
//!
//! The cache is bounded: least-recently-used entries are evicted once
//! `capacity` is reached, and entries older than the optional TTL are
//! treated as misses.

use lru::LruCache;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::error::SearchError;
use crate::models::{SearchQuery, SearchResult};

/// Default number of distinct queries kept per session.
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// `"{scope}:{text}:{json(filters)}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn build(query: &SearchQuery) -> Result<Self, SearchError> {
        let filters = serde_json::to_string(&query.filters)?;
        Ok(CacheKey(format!("{}:{}:{}", query.scope, query.text, filters)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct CacheEntry {
    results: Arc<[SearchResult]>,
    inserted_at: i64,
}

/// Bounded LRU cache of ranked results with an optional TTL.
pub struct QueryCache {
    entries: LruCache<CacheKey, CacheEntry>,
    ttl_millis: Option<i64>,
    hits: u64,
    misses: u64,
}

impl QueryCache {
    /// `ttl_millis = None` keeps entries for the whole session.
    pub fn new(capacity: usize, ttl_millis: Option<i64>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            ttl_millis,
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &CacheKey, now_millis: i64) -> Option<Arc<[SearchResult]>> {
        let expired = match (self.entries.peek(key), self.ttl_millis) {
            (Some(entry), Some(ttl)) => now_millis - entry.inserted_at >= ttl,
            (Some(_), None) => false,
            (None, _) => {
                self.misses += 1;
                return None;
            }
        };

        if expired {
            self.entries.pop(key);
            self.misses += 1;
            return None;
        }

        self.hits += 1;
        self.entries.get(key).map(|entry| Arc::clone(&entry.results))
    }

    pub fn put(&mut self, key: CacheKey, results: Arc<[SearchResult]>, now_millis: i64) {
        self.entries.put(
            key,
            CacheEntry {
                results,
                inserted_at: now_millis,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// `(hits, misses)` since construction.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Collection, RawEntity, Scope};
    use std::collections::BTreeMap;

    fn results(title: &str) -> Arc<[SearchResult]> {
        Arc::from(vec![SearchResult {
            entity: RawEntity::titled(1, title),
            kind: Collection::Tasks,
            relevance_score: 50,
        }])
    }

    #[test]
    fn test_key_includes_scope_query_and_filters() {
        let mut filters = BTreeMap::new();
        filters.insert("status".to_string(), "active".to_string());
        let q = SearchQuery::new("alpha", Scope::Tasks).with_filters(filters);
        let key = CacheKey::build(&q).unwrap();
        assert_eq!(key.as_str(), r#"tasks:alpha:{"status":"active"}"#);

        let plain = CacheKey::build(&SearchQuery::new("alpha", Scope::All)).unwrap();
        assert_eq!(plain.as_str(), "all:alpha:{}");
        assert_ne!(key, plain);
    }

    #[test]
    fn test_hit_returns_same_allocation() {
        let mut cache = QueryCache::default();
        let key = CacheKey::build(&SearchQuery::new("a", Scope::All)).unwrap();
        let stored = results("a");
        cache.put(key.clone(), Arc::clone(&stored), 0);

        let hit = cache.get(&key, 10).unwrap();
        assert!(Arc::ptr_eq(&hit, &stored));
        assert_eq!(cache.stats(), (1, 0));
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = QueryCache::new(2, None);
        let k = |t: &str| CacheKey::build(&SearchQuery::new(t, Scope::All)).unwrap();
        cache.put(k("a"), results("a"), 0);
        cache.put(k("b"), results("b"), 0);
        assert!(cache.get(&k("a"), 0).is_some());
        cache.put(k("c"), results("c"), 0);

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&k("b"), 0).is_none());
        assert!(cache.get(&k("a"), 0).is_some());
        assert!(cache.get(&k("c"), 0).is_some());
    }

    #[test]
    fn test_ttl_expiry() {
        let mut cache = QueryCache::new(8, Some(1_000));
        let key = CacheKey::build(&SearchQuery::new("a", Scope::All)).unwrap();
        cache.put(key.clone(), results("a"), 0);
        assert!(cache.get(&key, 999).is_some());
        assert!(cache.get(&key, 1_000).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut cache = QueryCache::new(0, None);
        let key = CacheKey::build(&SearchQuery::new("a", Scope::All)).unwrap();
        cache.put(key.clone(), results("a"), 0);
        assert_eq!(cache.len(), 1);
    }
}
