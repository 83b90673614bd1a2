//! Partitioning of a ranked list into per-type groups.
//!
//! Groups appear in the order their type first occurs in the ranked list,
//! not by type priority and not alphabetically. Inside a group, results keep
//! their relative rank.

use crate::models::{ResultGroup, SearchResult};

pub fn group_by_type(ranked: &[SearchResult]) -> Vec<ResultGroup> {
    let mut groups: Vec<ResultGroup> = Vec::new();
    for result in ranked {
        match groups.iter_mut().find(|g| g.kind == result.kind) {
            Some(group) => group.items.push(result.clone()),
            None => groups.push(ResultGroup {
                kind: result.kind,
                items: vec![result.clone()],
            }),
        }
    }
    groups
}

/// Results in render order: group by group, rank order within each.
pub fn flatten(groups: &[ResultGroup]) -> Vec<&SearchResult> {
    groups.iter().flat_map(|g| g.items.iter()).collect()
}
