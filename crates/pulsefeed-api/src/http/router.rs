//! Axum router configuration with middleware.
//!
//! JSON routes live under `/api/v1/`; the live feed channel is at
//! `/ws/feeds`. Middleware: CORS, request tracing, gzip compression.

use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Chat
        .route("/chat", post(handlers::chat::chat))
        .route("/chat/stream", post(handlers::chat::stream_chat))
        .route("/chat/history", get(handlers::chat::history))
        // Feeds
        .route("/feeds", get(handlers::feed::list_feeds))
        .route("/feeds/{source}", get(handlers::feed::feeds_by_source))
        // Dashboard
        .route("/dashboard", get(handlers::dashboard::overview))
        .route("/dashboard/trends", get(handlers::dashboard::trends))
        .route("/dashboard/stats", get(handlers::dashboard::stats));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/ws/feeds", get(handlers::ws::ws_handler))
        .route("/health", get(health_check))
        .route("/api-docs", get(api_docs))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}

/// GET /health - simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api-docs - endpoint map for API discovery.
async fn api_docs() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/api/v1/chat": "RAG-powered chat (one-shot and SSE streaming)",
            "/api/v1/feeds": "Cached, paginated feed listing",
            "/api/v1/dashboard": "Chronological listing, trends, and source stats",
            "/ws/feeds": "Live feed updates over WebSocket",
        }
    }))
}
