//! Chat endpoints: SSE streaming exchange, non-streaming exchange, and
//! session history.
//!
//! POST /api/v1/chat/stream
//! POST /api/v1/chat
//! GET  /api/v1/chat/history
//!
//! The streaming endpoint awaits the exchange setup (validation, context
//! gathering, first generation fragment) before the SSE channel opens, so
//! pre-output failures arrive as plain HTTP errors. Once the channel is
//! open every outcome ends with an explicit `done:true` event.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_stream::Stream;

use pulsefeed_types::chat::{ChatAnswer, ChatMessage};

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for both chat endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's natural-language query.
    pub query: String,
    /// Conversation to continue; omitted requests share the "default" session.
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

fn default_session_id() -> String {
    "default".to_string()
}

/// POST /api/v1/chat/stream -- streaming exchange over SSE.
pub async fn stream_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let events = state.engine.run_stream(&body.session_id, &body.query).await?;

    let sse_stream = events.map(|event| {
        let data = serde_json::to_string(&event)
            .unwrap_or_else(|_| r#"{"error":"serialization failed","done":true}"#.to_string());
        Ok::<_, Infallible>(Event::default().data(data))
    });

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

/// POST /api/v1/chat -- one-shot exchange.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatAnswer>, AppError> {
    let answer = state
        .engine
        .run_complete(&body.session_id, &body.query)
        .await?;
    Ok(Json(answer))
}

/// Query parameters for the history endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<ChatMessage>,
}

/// GET /api/v1/chat/history -- full transcript of a session.
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        history: state.sessions.history(&params.session_id),
    })
}
