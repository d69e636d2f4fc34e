//! SQLite summary store implementation.
//!
//! Implements `SummaryStore` from `pulsefeed-core` with raw queries over
//! the split read/write pool and a private row struct for SQLite-to-domain
//! mapping. Timestamps are stored as fixed-width RFC 3339 UTC strings so
//! lexicographic ordering matches chronological ordering.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use uuid::Uuid;

use pulsefeed_core::store::{SummaryFilter, SummaryStore};
use pulsefeed_types::error::StoreError;
use pulsefeed_types::summary::{SourceCount, Summary};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SummaryStore`.
pub struct SqliteSummaryStore {
    pool: DatabasePool,
}

impl SqliteSummaryStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Insert a summary. A row with the same url is replaced (urls are
    /// unique within the store).
    pub async fn insert(&self, summary: &Summary) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO summaries (id, source, url, title, body, engagement, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(summary.id.to_string())
        .bind(&summary.source)
        .bind(&summary.url)
        .bind(&summary.title)
        .bind(&summary.body)
        .bind(summary.engagement)
        .bind(encode_datetime(&summary.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }
}

/// Internal row type for mapping SQLite rows to domain summaries.
struct SummaryRow {
    id: String,
    source: String,
    url: String,
    title: String,
    body: String,
    engagement: i64,
    created_at: String,
}

impl SummaryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            source: row.try_get("source")?,
            url: row.try_get("url")?,
            title: row.try_get("title")?,
            body: row.try_get("body")?,
            engagement: row.try_get("engagement")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_summary(self) -> Result<Summary, StoreError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Query(format!("invalid summary id: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(Summary {
            id,
            source: self.source,
            url: self.url,
            title: self.title,
            body: self.body,
            engagement: self.engagement,
            created_at,
        })
    }
}

fn encode_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Query(format!("invalid timestamp '{raw}': {e}")))
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::Query(other.to_string()),
    }
}

/// Build the WHERE clause and bind values for a [`SummaryFilter`].
fn filter_clause(filter: &SummaryFilter) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    if !filter.sources.is_empty() {
        let placeholders = vec!["?"; filter.sources.len()].join(", ");
        conditions.push(format!("source IN ({placeholders})"));
        binds.extend(filter.sources.iter().cloned());
    }
    if let Some(cutoff) = filter.created_after {
        conditions.push("created_at >= ?".to_string());
        binds.push(encode_datetime(&cutoff));
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    (clause, binds)
}

const SELECT_COLUMNS: &str =
    "SELECT id, source, url, title, body, engagement, created_at FROM summaries";

impl SummaryStore for SqliteSummaryStore {
    async fn search(&self, needle: &str, limit: usize) -> Result<Vec<Summary>, StoreError> {
        // LIKE is case-insensitive for ASCII in SQLite.
        let pattern = format!("%{needle}%");
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE title LIKE ?1 OR body LIKE ?1 LIMIT ?2"
        ))
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter()
            .map(|row| SummaryRow::from_row(row).map_err(map_sqlx_error)?.into_summary())
            .collect()
    }

    async fn query(&self, filter: &SummaryFilter) -> Result<Vec<Summary>, StoreError> {
        let (clause, binds) = filter_clause(filter);
        let sql = format!("{SELECT_COLUMNS}{clause}");
        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter()
            .map(|row| SummaryRow::from_row(row).map_err(map_sqlx_error)?.into_summary())
            .collect()
    }

    async fn count(&self, filter: &SummaryFilter) -> Result<u64, StoreError> {
        let (clause, binds) = filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM summaries{clause}");
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let count = query
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Summary>, StoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC LIMIT ?"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter()
            .map(|row| SummaryRow::from_row(row).map_err(map_sqlx_error)?.into_summary())
            .collect()
    }

    async fn source_counts(&self) -> Result<Vec<SourceCount>, StoreError> {
        let rows = sqlx::query(
            "SELECT source, COUNT(*) AS count FROM summaries GROUP BY source ORDER BY source",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter()
            .map(|row| {
                let source: String = row.try_get("source").map_err(map_sqlx_error)?;
                let count: i64 = row.try_get("count").map_err(map_sqlx_error)?;
                Ok(SourceCount {
                    source,
                    count: count as u64,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn store() -> (tempfile::TempDir, SqliteSummaryStore) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (dir, SqliteSummaryStore::new(pool))
    }

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
    async fn insert_and_search_case_insensitive() {
        let (_dir, store) = store().await;
        store
            .insert(&summary("reddit", "u1", "Rust 1.85 released", "details"))
            .await
            .unwrap();
        store
            .insert(&summary("reddit", "u2", "Other", "all about RUST tooling"))
            .await
            .unwrap();
        store
            .insert(&summary("reddit", "u3", "Unrelated", "nothing"))
            .await
            .unwrap();

        let hits = store.search("rust", 10).await.unwrap();
        assert_eq!(hits.len(), 2);

        let capped = store.search("rust", 1).await.unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[tokio::test]
    async fn insert_replaces_row_with_same_url() {
        let (_dir, store) = store().await;
        store
            .insert(&summary("reddit", "u1", "old", "old body"))
            .await
            .unwrap();
        store
            .insert(&summary("reddit", "u1", "new", "new body"))
            .await
            .unwrap();

        let all = store.query(&SummaryFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "new");
    }

    #[tokio::test]
    async fn query_and_count_apply_the_filter() {
        let (_dir, store) = store().await;
        let mut old = summary("reddit", "u1", "old", "b");
        old.created_at = Utc::now() - Duration::days(3);
        store.insert(&old).await.unwrap();
        store.insert(&summary("reddit", "u2", "fresh", "b")).await.unwrap();
        store
            .insert(&summary("hackernews", "u3", "fresh hn", "b"))
            .await
            .unwrap();

        let filter = SummaryFilter {
            sources: vec!["reddit".to_string()],
            created_after: Some(Utc::now() - Duration::days(1)),
        };
        let matched = store.query(&filter).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].title, "fresh");
        assert_eq!(store.count(&filter).await.unwrap(), 1);

        let unfiltered = SummaryFilter::default();
        assert_eq!(store.count(&unfiltered).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn recent_orders_newest_first() {
        let (_dir, store) = store().await;
        let now = Utc::now();
        for i in 0..3 {
            let mut s = summary("reddit", &format!("u{i}"), &format!("t{i}"), "b");
            s.created_at = now - Duration::minutes(i);
            store.insert(&s).await.unwrap();
        }

        let recent = store.recent(2).await.unwrap();
        let titles: Vec<&str> = recent.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["t0", "t1"]);
    }

    #[tokio::test]
    async fn source_counts_groups_by_source() {
        let (_dir, store) = store().await;
        store.insert(&summary("reddit", "u1", "a", "b")).await.unwrap();
        store.insert(&summary("reddit", "u2", "a", "b")).await.unwrap();
        store
            .insert(&summary("hackernews", "u3", "a", "b"))
            .await
            .unwrap();

        let counts = store.source_counts().await.unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].source, "hackernews");
        assert_eq!(counts[0].count, 1);
        assert_eq!(counts[1].source, "reddit");
        assert_eq!(counts[1].count, 2);
    }
}
