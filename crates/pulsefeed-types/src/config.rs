//! Service configuration loaded from `config.toml` in the data directory.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Pulsefeed service.
///
/// Every field has a default so a missing or partial `config.toml` still
/// yields a runnable configuration. The generation API key is deliberately
/// not part of this file; it comes from the `GEMINI_API_KEY` environment
/// variable and never touches disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Bind address for the HTTP server.
    pub host: String,
    /// Bind port for the HTTP server.
    pub port: u16,
    /// SQLite database URL; defaults to `pulsefeed.db` in the data dir.
    pub database_url: Option<String>,
    /// Model identifier for the generation backend.
    pub generation_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_url: None,
            generation_model: "gemini-2.5-flash".to_string(),
        }
    }
}
