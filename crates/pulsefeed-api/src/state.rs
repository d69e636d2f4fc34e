//! Application state wiring all components together.
//!
//! The core is generic over the `SummaryStore` and `Generator` traits;
//! AppState pins those generics to the concrete infra implementations and
//! owns the shared stores, constructed once at process start and injected
//! into the handlers that need them.

use std::path::Path;
use std::sync::Arc;

use pulsefeed_core::engine::ChatEngine;
use pulsefeed_core::feed_cache::FeedCache;
use pulsefeed_core::hub::BroadcastHub;
use pulsefeed_core::session::SessionStore;
use pulsefeed_infra::config::default_database_url;
use pulsefeed_infra::gemini::GeminiGenerator;
use pulsefeed_infra::sqlite::{DatabasePool, SqliteSummaryStore};
use pulsefeed_types::config::AppConfig;

/// Concrete type aliases for the core generics pinned to infra backends.
pub type ConcreteEngine = ChatEngine<SqliteSummaryStore, GeminiGenerator>;
pub type ConcreteFeedCache = FeedCache<SqliteSummaryStore>;
pub type ConcreteHub = BroadcastHub<SqliteSummaryStore>;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConcreteEngine>,
    pub sessions: Arc<SessionStore>,
    pub feed_cache: Arc<ConcreteFeedCache>,
    pub hub: Arc<ConcreteHub>,
    pub store: Arc<SqliteSummaryStore>,
}

impl AppState {
    /// Initialize the application state: open the database, construct the
    /// shared stores, and wire the pipeline.
    pub async fn init(config: &AppConfig, data_dir: &Path) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;

        let database_url = config
            .database_url
            .clone()
            .unwrap_or_else(|| default_database_url(data_dir));
        let pool = DatabasePool::new(&database_url).await?;
        let store = Arc::new(SqliteSummaryStore::new(pool));

        let generator = Arc::new(GeminiGenerator::from_env(
            config.generation_model.clone(),
        )?);

        let sessions = Arc::new(SessionStore::new());
        let engine = Arc::new(ChatEngine::new(
            Arc::clone(&store),
            Arc::clone(&sessions),
            generator,
        ));
        let feed_cache = Arc::new(FeedCache::new(Arc::clone(&store)));
        let hub = Arc::new(BroadcastHub::new(Arc::clone(&store)));

        Ok(Self {
            engine,
            sessions,
            feed_cache,
            hub,
            store,
        })
    }
}
