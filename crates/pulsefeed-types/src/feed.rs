//! Feed listing query and page types.
//!
//! A [`FeedQuery`] is canonicalized before use: defaults filled in, sources
//! lowercased and sorted, page/limit clamped. The canonical string form
//! ([`FeedQuery::cache_key`]) is the feed cache key, so two queries that
//! differ only in source order or casing share one cache entry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::summary::Summary;

/// Default page size for feed listings.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Upper bound on the page size a client may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Time window a feed query is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "none")]
    #[default]
    All,
}

impl TimeRange {
    /// Lower bound on `created_at` implied by this range, or `None` for
    /// an unrestricted query.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeRange::Hour => Some(now - Duration::hours(1)),
            TimeRange::Day => Some(now - Duration::hours(24)),
            TimeRange::Week => Some(now - Duration::days(7)),
            TimeRange::All => None,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRange::Hour => write!(f, "1h"),
            TimeRange::Day => write!(f, "24h"),
            TimeRange::Week => write!(f, "7d"),
            TimeRange::All => write!(f, "none"),
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1h" => Ok(TimeRange::Hour),
            "24h" => Ok(TimeRange::Day),
            "7d" => Ok(TimeRange::Week),
            "none" => Ok(TimeRange::All),
            other => Err(format!("invalid time range: '{other}'")),
        }
    }
}

/// Ordering applied to a feed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Time,
    Engagement,
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortBy::Time => write!(f, "time"),
            SortBy::Engagement => write!(f, "engagement"),
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "time" => Ok(SortBy::Time),
            "engagement" => Ok(SortBy::Engagement),
            other => Err(format!("invalid sort key: '{other}'")),
        }
    }
}

/// Parameters of a paginated feed listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    /// Source names to include; empty means all sources.
    pub sources: Vec<String>,
    pub time_range: TimeRange,
    pub sort_by: SortBy,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            time_range: TimeRange::All,
            sort_by: SortBy::Time,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl FeedQuery {
    /// Canonicalize: lowercase, sort, and dedup sources; clamp page and
    /// limit into their valid ranges.
    pub fn normalized(&self) -> FeedQuery {
        let mut sources: Vec<String> =
            self.sources.iter().map(|s| s.to_lowercase()).collect();
        sources.sort();
        sources.dedup();

        FeedQuery {
            sources,
            time_range: self.time_range,
            sort_by: self.sort_by,
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Stable cache key. Callers normalize first; two queries with the
    /// same canonical form produce the same key.
    pub fn cache_key(&self) -> String {
        format!(
            "sources={}|range={}|sort={}|page={}|limit={}",
            self.sources.join(","),
            self.time_range,
            self.sort_by,
            self.page,
            self.limit
        )
    }
}

/// Pagination metadata on a feed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

/// One page of feed results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPage {
    pub feeds: Vec<Summary>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_roundtrip() {
        for range in [
            TimeRange::Hour,
            TimeRange::Day,
            TimeRange::Week,
            TimeRange::All,
        ] {
            let s = range.to_string();
            let parsed: TimeRange = s.parse().unwrap();
            assert_eq!(range, parsed);
        }
    }

    #[test]
    fn test_time_range_cutoff() {
        let now = Utc::now();
        assert_eq!(TimeRange::All.cutoff(now), None);
        assert_eq!(TimeRange::Hour.cutoff(now), Some(now - Duration::hours(1)));
        assert_eq!(TimeRange::Week.cutoff(now), Some(now - Duration::days(7)));
    }

    #[test]
    fn test_sort_by_rejects_unknown() {
        assert!("time".parse::<SortBy>().is_ok());
        assert!("popularity".parse::<SortBy>().is_err());
    }

    #[test]
    fn test_normalized_fills_defaults_and_clamps() {
        let query = FeedQuery {
            sources: vec!["Reddit".to_string(), "hackernews".to_string(), "reddit".to_string()],
            time_range: TimeRange::Day,
            sort_by: SortBy::Time,
            page: 0,
            limit: 5000,
        };
        let normalized = query.normalized();
        assert_eq!(normalized.sources, vec!["hackernews", "reddit"]);
        assert_eq!(normalized.page, 1);
        assert_eq!(normalized.limit, MAX_PAGE_LIMIT);
    }

    #[test]
    fn test_cache_key_ignores_source_order_and_case() {
        let a = FeedQuery {
            sources: vec!["Reddit".to_string(), "hackernews".to_string()],
            ..FeedQuery::default()
        }
        .normalized();
        let b = FeedQuery {
            sources: vec!["hackernews".to_string(), "reddit".to_string()],
            ..FeedQuery::default()
        }
        .normalized();
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_distinguishes_pages() {
        let first = FeedQuery::default().normalized();
        let second = FeedQuery {
            page: 2,
            ..FeedQuery::default()
        }
        .normalized();
        assert_ne!(first.cache_key(), second.cache_key());
    }

    #[test]
    fn test_pagination_wire_form() {
        let pagination = Pagination {
            current_page: 2,
            total_pages: 5,
            total_items: 93,
        };
        let json = serde_json::to_string(&pagination).unwrap();
        assert!(json.contains("\"currentPage\":2"));
        assert!(json.contains("\"totalPages\":5"));
        assert!(json.contains("\"totalItems\":93"));
    }
}
