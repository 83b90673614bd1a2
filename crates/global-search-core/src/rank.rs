//! Candidate filtering and relevance ranking.
//!
//! # Matching
//!
//! An entity is a candidate when the lower-cased concatenation of its label,
//! description, content, and tag names contains the lower-cased query as a
//! plain substring.
//!
//! # Scoring
//!
//! | Condition | Points |
//! |-----------|--------|
//! | label equals query (case-insensitive) | +100 |
//! | otherwise label contains query | +50 |
//! | description/content contains query | +25 |
//! | entity is in the recent-item list | +10 |
//!
//! # Ordering
//!
//! Score (desc), then [`Collection::priority`] (desc), then creation time
//! (newer first, unparseable dates as epoch 0). The sort is stable, so fully
//! tied results keep their fan-out order.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{Collection, EntityId, RawEntity, SearchResult};

/// `(id, type)` pairs of recently visited entities.
pub type RecentSet = HashSet<(EntityId, Collection)>;

pub const EXACT_LABEL_POINTS: u32 = 100;
pub const LABEL_SUBSTRING_POINTS: u32 = 50;
pub const BODY_SUBSTRING_POINTS: u32 = 25;
pub const RECENT_BONUS_POINTS: u32 = 10;

/// Lower-cased text an entity is matched against.
pub fn searchable_text(entity: &RawEntity) -> String {
    let mut parts: Vec<&str> = vec![
        entity.label(),
        entity.description.as_deref().unwrap_or(""),
        entity.content.as_deref().unwrap_or(""),
    ];
    parts.extend(entity.tag_names());
    parts.join(" ").to_lowercase()
}

/// Whether `entity` matches an already lower-cased query.
pub fn matches(entity: &RawEntity, query_lower: &str) -> bool {
    searchable_text(entity).contains(query_lower)
}

/// Additive relevance score of one candidate.
pub fn relevance_score(
    entity: &RawEntity,
    kind: Collection,
    query_lower: &str,
    recent: &RecentSet,
) -> u32 {
    let label = entity.label().to_lowercase();
    let body = entity.body_text().to_lowercase();

    let mut score = 0;
    if label == query_lower {
        score += EXACT_LABEL_POINTS;
    } else if label.contains(query_lower) {
        score += LABEL_SUBSTRING_POINTS;
    }
    if body.contains(query_lower) {
        score += BODY_SUBSTRING_POINTS;
    }
    if recent.contains(&(entity.id.clone(), kind)) {
        score += RECENT_BONUS_POINTS;
    }
    score
}

/// Filter one collection's raw entities and score the survivors.
pub fn filter_and_score(
    entities: Vec<RawEntity>,
    kind: Collection,
    query: &str,
    recent: &RecentSet,
) -> Vec<SearchResult> {
    let query_lower = query.to_lowercase();
    entities
        .into_iter()
        .filter(|e| matches(e, &query_lower))
        .map(|entity| {
            let relevance_score = relevance_score(&entity, kind, &query_lower, recent);
            SearchResult {
                entity,
                kind,
                relevance_score,
            }
        })
        .collect()
}

/// Total order used for the merged result list.
pub fn compare_results(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.relevance_score
        .cmp(&a.relevance_score)
        .then(b.kind.priority().cmp(&a.kind.priority()))
        .then(b.entity.created_millis().cmp(&a.entity.created_millis()))
}

/// Stable sort by [`compare_results`].
pub fn sort_by_relevance(results: &mut [SearchResult]) {
    results.sort_by(compare_results);
}
