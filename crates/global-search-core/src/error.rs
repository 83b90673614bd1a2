//! Typed outcomes of a failed search.

use thiserror::Error;

pub type Result<T, E = SearchError> = std::result::Result<T, E>;

/// Errors that put the result pane into its error state.
///
/// Failures of individual collections never appear here; they are dropped
/// by the fan-out. Only a pre-flight failure or a total failure surfaces.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("failed to build cache key: {0}")]
    CacheKey(#[from] serde_json::Error),
    #[error("all {failed} source request(s) failed")]
    AllSourcesFailed { failed: usize },
}
