//! Dashboard endpoints: full chronological listing, 24-hour trends, and
//! per-source statistics.
//!
//! GET /api/v1/dashboard
//! GET /api/v1/dashboard/trends
//! GET /api/v1/dashboard/stats

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Serialize;

use pulsefeed_core::store::{SummaryFilter, SummaryStore};
use pulsefeed_types::summary::{SourceCount, Summary};

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub summaries: Vec<Summary>,
}

#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub trends: Vec<Summary>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: Vec<SourceCount>,
}

/// GET /api/v1/dashboard -- all summaries, oldest first.
pub async fn overview(State(state): State<AppState>) -> Result<Json<OverviewResponse>, AppError> {
    let mut summaries = state.store.query(&SummaryFilter::default()).await?;
    summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(Json(OverviewResponse { summaries }))
}

/// GET /api/v1/dashboard/trends -- the last 24 hours, oldest first.
pub async fn trends(State(state): State<AppState>) -> Result<Json<TrendsResponse>, AppError> {
    let filter = SummaryFilter {
        sources: Vec::new(),
        created_after: Some(Utc::now() - Duration::hours(24)),
    };
    let mut trends = state.store.query(&filter).await?;
    trends.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(Json(TrendsResponse { trends }))
}

/// GET /api/v1/dashboard/stats -- summary counts grouped by source.
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.store.source_counts().await?;
    Ok(Json(StatsResponse { stats }))
}
