//! SummaryStore trait definition.
//!
//! The abstract query contract over the summarized-document repository.
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).
//! Implementations live in pulsefeed-infra; both the in-memory and the
//! SQLite backend satisfy this trait, and the core never knows which one
//! is in use.

use chrono::{DateTime, Utc};

use pulsefeed_types::error::StoreError;
use pulsefeed_types::summary::{SourceCount, Summary};

/// Store-level filter: source membership plus a creation-time lower bound.
///
/// An empty `sources` list matches every source. Source names are expected
/// lowercased; callers normalize before building a filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryFilter {
    pub sources: Vec<String>,
    pub created_after: Option<DateTime<Utc>>,
}

/// Repository of summarized documents.
///
/// Backend failures surface as [`StoreError`]; an empty result is never
/// an error.
pub trait SummaryStore: Send + Sync {
    /// Case-insensitive substring search over title and body. Returns at
    /// most `limit` matches; no ranking beyond "contains the needle".
    fn search(
        &self,
        needle: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Summary>, StoreError>> + Send;

    /// All summaries matching the filter, in no guaranteed order.
    fn query(
        &self,
        filter: &SummaryFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Summary>, StoreError>> + Send;

    /// Number of summaries matching the filter.
    fn count(
        &self,
        filter: &SummaryFilter,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// The `limit` most recent summaries, newest first by `created_at`.
    fn recent(
        &self,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Summary>, StoreError>> + Send;

    /// Per-source summary totals.
    fn source_counts(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<SourceCount>, StoreError>> + Send;
}
