//! Summarized document types.
//!
//! A [`Summary`] is produced by an external ingestion pipeline and is
//! read-only to this service. Wire form is camelCase to match the feed
//! clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A summarized document from one of the ingested sources.
///
/// `url` is unique within a store: inserting a summary with an existing
/// url replaces the previous row. Insertion order does not guarantee
/// monotonically increasing `created_at`; queries that need time ordering
/// sort explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: Uuid,
    pub source: String,
    pub url: String,
    pub title: String,
    /// The summarized text body.
    pub body: String,
    /// Engagement score assigned by the ingestion pipeline.
    pub engagement: i64,
    pub created_at: DateTime<Utc>,
}

/// Number of stored summaries for a single source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCount {
    pub source: String,
    pub count: u64,
}
