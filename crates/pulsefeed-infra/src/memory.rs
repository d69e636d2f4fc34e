//! In-memory summary store.
//!
//! Document-oriented stand-in for the real repository: linear scans over a
//! vector behind an `RwLock`. Useful as a test fixture and for running the
//! service without a database.

use std::collections::BTreeMap;
use std::sync::RwLock;

use pulsefeed_core::store::{SummaryFilter, SummaryStore};
use pulsefeed_types::error::StoreError;
use pulsefeed_types::summary::{SourceCount, Summary};

/// Volatile `SummaryStore` implementation.
#[derive(Debug, Default)]
pub struct InMemorySummaryStore {
    summaries: RwLock<Vec<Summary>>,
}

impl InMemorySummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a summary. A summary with the same url replaces the
    /// existing row (urls are unique within a store).
    pub fn insert(&self, summary: Summary) {
        let mut summaries = self.summaries.write().expect("summary store lock poisoned");
        if let Some(existing) = summaries.iter_mut().find(|s| s.url == summary.url) {
            *existing = summary;
        } else {
            summaries.push(summary);
        }
    }

    fn matching(&self, filter: &SummaryFilter) -> Vec<Summary> {
        self.summaries
            .read()
            .expect("summary store lock poisoned")
            .iter()
            .filter(|s| {
                (filter.sources.is_empty() || filter.sources.contains(&s.source.to_lowercase()))
                    && filter.created_after.is_none_or(|t| s.created_at >= t)
            })
            .cloned()
            .collect()
    }
}

impl SummaryStore for InMemorySummaryStore {
    async fn search(&self, needle: &str, limit: usize) -> Result<Vec<Summary>, StoreError> {
        let needle = needle.to_lowercase();
        Ok(self
            .summaries
            .read()
            .expect("summary store lock poisoned")
            .iter()
            .filter(|s| {
                s.title.to_lowercase().contains(&needle) || s.body.to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn query(&self, filter: &SummaryFilter) -> Result<Vec<Summary>, StoreError> {
        Ok(self.matching(filter))
    }

    async fn count(&self, filter: &SummaryFilter) -> Result<u64, StoreError> {
        Ok(self.matching(filter).len() as u64)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Summary>, StoreError> {
        let mut summaries = self
            .summaries
            .read()
            .expect("summary store lock poisoned")
            .clone();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries.truncate(limit);
        Ok(summaries)
    }

    async fn source_counts(&self) -> Result<Vec<SourceCount>, StoreError> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for summary in self
            .summaries
            .read()
            .expect("summary store lock poisoned")
            .iter()
        {
            *counts.entry(summary.source.clone()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(source, count)| SourceCount { source, count })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn summary(source: &str, url: &str, title: &str, body: &str) -> Summary {
        Summary {
            id: Uuid::now_v7(),
            source: source.to_string(),
            url: url.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            engagement: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn search_is_case_insensitive_over_title_and_body() {
        let store = InMemorySummaryStore::new();
        store.insert(summary("reddit", "u1", "Rust 1.85 released", "details"));
        store.insert(summary("reddit", "u2", "Other", "all about RUST tooling"));
        store.insert(summary("reddit", "u3", "Unrelated", "nothing here"));

        let hits = store.search("rust", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn insert_replaces_row_with_same_url() {
        let store = InMemorySummaryStore::new();
        store.insert(summary("reddit", "u1", "old", "old body"));
        store.insert(summary("reddit", "u1", "new", "new body"));

        let all = store.query(&SummaryFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "new");
    }

    #[tokio::test]
    async fn query_filters_by_source_and_cutoff() {
        let store = InMemorySummaryStore::new();
        let mut old = summary("reddit", "u1", "old", "b");
        old.created_at = Utc::now() - Duration::days(3);
        store.insert(old);
        store.insert(summary("reddit", "u2", "fresh", "b"));
        store.insert(summary("hackernews", "u3", "fresh hn", "b"));

        let filter = SummaryFilter {
            sources: vec!["reddit".to_string()],
            created_after: Some(Utc::now() - Duration::days(1)),
        };
        let matched = store.query(&filter).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].title, "fresh");
        assert_eq!(store.count(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn recent_orders_newest_first() {
        let store = InMemorySummaryStore::new();
        let now = Utc::now();
        for i in 0..3 {
            let mut s = summary("reddit", &format!("u{i}"), &format!("t{i}"), "b");
            s.created_at = now - Duration::minutes(i);
            store.insert(s);
        }

        let recent = store.recent(2).await.unwrap();
        let titles: Vec<&str> = recent.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["t0", "t1"]);
    }

    #[tokio::test]
    async fn source_counts_groups_by_source() {
        let store = InMemorySummaryStore::new();
        store.insert(summary("reddit", "u1", "a", "b"));
        store.insert(summary("reddit", "u2", "a", "b"));
        store.insert(summary("hackernews", "u3", "a", "b"));

        let counts = store.source_counts().await.unwrap();
        assert_eq!(
            counts,
            vec![
                SourceCount {
                    source: "hackernews".to_string(),
                    count: 1
                },
                SourceCount {
                    source: "reddit".to_string(),
                    count: 2
                },
            ]
        );
    }
}
