//! TTL-memoized filter/sort/paginate view over the summary store.
//!
//! Cache entries are keyed by the canonical form of the feed query and are
//! immutable once written: a fresh computation overwrites an entry only
//! after it expires, and expired entries are evicted lazily on the next
//! lookup. New document arrivals do not invalidate anything; staleness is
//! bounded by the TTL.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use pulsefeed_types::error::StoreError;
use pulsefeed_types::feed::{FeedPage, FeedQuery, Pagination, SortBy};

use crate::store::{SummaryFilter, SummaryStore};

/// How long a computed feed page stays valid.
pub const FEED_CACHE_TTL: Duration = Duration::from_secs(60);

struct CacheEntry {
    page: FeedPage,
    expires_at: Instant,
}

/// Process-wide cache of computed feed pages.
///
/// Backed by a `DashMap`, so lookups on unrelated keys never serialize on
/// a shared lock.
pub struct FeedCache<S> {
    store: Arc<S>,
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl<S: SummaryStore> FeedCache<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_ttl(store, FEED_CACHE_TTL)
    }

    /// Cache with a custom TTL (tests).
    pub fn with_ttl(store: Arc<S>, ttl: Duration) -> Self {
        Self {
            store,
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Resolve one page of feed results, serving from cache when a fresh
    /// entry exists for the canonical form of `query`.
    pub async fn get_page(&self, query: &FeedQuery) -> Result<FeedPage, StoreError> {
        let query = query.normalized();
        let key = query.cache_key();

        if let Some(entry) = self.entries.get(&key) {
            if entry.expires_at > Instant::now() {
                debug!(key, "feed cache hit");
                return Ok(entry.page.clone());
            }
        }
        // Lazy eviction; only drop the entry if it is still the stale one.
        self.entries
            .remove_if(&key, |_, entry| entry.expires_at <= Instant::now());

        let filter = SummaryFilter {
            sources: query.sources.clone(),
            created_after: query.time_range.cutoff(Utc::now()),
        };
        let (mut items, total) = tokio::try_join!(
            self.store.query(&filter),
            self.store.count(&filter)
        )?;

        // Stable sorts keep store order for ties.
        match query.sort_by {
            SortBy::Time => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortBy::Engagement => items.sort_by(|a, b| b.engagement.cmp(&a.engagement)),
        }

        let offset = ((query.page - 1) * query.limit) as usize;
        let feeds: Vec<_> = items
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .collect();

        let page = FeedPage {
            feeds,
            pagination: Pagination {
                current_page: query.page,
                total_pages: total.div_ceil(query.limit as u64) as u32,
                total_items: total,
            },
        };

        debug!(key, total, "feed page computed");
        self.entries.insert(
            key,
            CacheEntry {
                page: page.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(page)
    }
}
