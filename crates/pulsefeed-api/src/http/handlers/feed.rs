//! Feed listing endpoints.
//!
//! GET /api/v1/feeds          -- paginated listing via the feed cache
//! GET /api/v1/feeds/{source} -- all summaries for one source (uncached)

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use pulsefeed_core::store::{SummaryFilter, SummaryStore};
use pulsefeed_types::feed::{FeedPage, FeedQuery, SortBy, TimeRange};
use pulsefeed_types::summary::Summary;

use crate::http::error::AppError;
use crate::state::AppState;

/// Query parameters of the feed listing endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedListParams {
    /// Comma-separated source names.
    pub sources: Option<String>,
    pub time_range: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

fn parse_feed_query(params: &FeedListParams) -> Result<FeedQuery, AppError> {
    let time_range: TimeRange = match params.time_range.as_deref() {
        Some(raw) => raw.parse().map_err(AppError::Validation)?,
        None => TimeRange::All,
    };
    let sort_by: SortBy = match params.sort_by.as_deref() {
        Some(raw) => raw.parse().map_err(AppError::Validation)?,
        None => SortBy::Time,
    };
    let sources = params
        .sources
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let defaults = FeedQuery::default();
    Ok(FeedQuery {
        sources,
        time_range,
        sort_by,
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    })
}

/// GET /api/v1/feeds -- paginated feed listing.
pub async fn list_feeds(
    State(state): State<AppState>,
    Query(params): Query<FeedListParams>,
) -> Result<Json<FeedPage>, AppError> {
    let query = parse_feed_query(&params)?;
    let page = state.feed_cache.get_page(&query).await?;
    Ok(Json(page))
}

/// GET /api/v1/feeds/{source} -- everything from one source.
pub async fn feeds_by_source(
    State(state): State<AppState>,
    Path(source): Path<String>,
) -> Result<Json<Vec<Summary>>, AppError> {
    let filter = SummaryFilter {
        sources: vec![source.to_lowercase()],
        created_after: None,
    };
    let feeds = state.store.query(&filter).await?;
    Ok(Json(feeds))
}
