//! Context retrieval for the chat pipeline.

use std::sync::Arc;

use pulsefeed_types::error::StoreError;
use pulsefeed_types::summary::Summary;

use crate::store::SummaryStore;

/// Turns a chat query into a bounded list of relevant stored summaries.
///
/// Matching is the store's case-insensitive containment search; no further
/// ranking is applied here.
pub struct ContextRetriever<S> {
    store: Arc<S>,
}

impl<S: SummaryStore> ContextRetriever<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// At most `k` summaries matching `query`. An empty result is not an
    /// error; a store failure propagates as [`StoreError`].
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Summary>, StoreError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let matches = self.store.search(query, k).await?;
        tracing::debug!(query_len = query.len(), hits = matches.len(), "context retrieved");
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SummaryFilter;
    use chrono::Utc;
    use pulsefeed_types::summary::SourceCount;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct StubStore {
        summaries: Vec<Summary>,
        searches: AtomicUsize,
    }

    impl StubStore {
        fn with(summaries: Vec<Summary>) -> Self {
            Self {
                summaries,
                searches: AtomicUsize::new(0),
            }
        }
    }

    impl SummaryStore for StubStore {
        async fn search(&self, needle: &str, limit: usize) -> Result<Vec<Summary>, StoreError> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            let needle = needle.to_lowercase();
            Ok(self
                .summaries
                .iter()
                .filter(|s| {
                    s.title.to_lowercase().contains(&needle)
                        || s.body.to_lowercase().contains(&needle)
                })
                .take(limit)
                .cloned()
                .collect())
        }

        async fn query(&self, _filter: &SummaryFilter) -> Result<Vec<Summary>, StoreError> {
            Ok(self.summaries.clone())
        }

        async fn count(&self, _filter: &SummaryFilter) -> Result<u64, StoreError> {
            Ok(self.summaries.len() as u64)
        }

        async fn recent(&self, limit: usize) -> Result<Vec<Summary>, StoreError> {
            Ok(self.summaries.iter().take(limit).cloned().collect())
        }

        async fn source_counts(&self) -> Result<Vec<SourceCount>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn summary(title: &str, body: &str) -> Summary {
        Summary {
            id: Uuid::now_v7(),
            source: "reddit".to_string(),
            url: format!("https://example.com/{title}"),
            title: title.to_string(),
            body: body.to_string(),
            engagement: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn retrieve_caps_at_k() {
        let store = Arc::new(StubStore::with(vec![
            summary("rust 1", "rust news"),
            summary("rust 2", "rust news"),
            summary("rust 3", "rust news"),
            summary("rust 4", "rust news"),
        ]));
        let retriever = ContextRetriever::new(store);

        let hits = retriever.retrieve("rust", 3).await.unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn retrieve_no_match_is_empty_not_error() {
        let store = Arc::new(StubStore::with(vec![summary("rust", "news")]));
        let retriever = ContextRetriever::new(store);

        let hits = retriever.retrieve("quantum", 3).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn retrieve_k_zero_skips_the_store() {
        let store = Arc::new(StubStore::with(vec![summary("rust", "news")]));
        let retriever = ContextRetriever::new(Arc::clone(&store));

        let hits = retriever.retrieve("rust", 0).await.unwrap();
        assert!(hits.is_empty());
        assert_eq!(store.searches.load(Ordering::SeqCst), 0);
    }
}
