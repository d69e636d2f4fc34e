use thiserror::Error;

/// Errors from summary store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("summary store unavailable: {0}")]
    Unavailable(String),

    #[error("query error: {0}")]
    Query(String),
}

/// Errors from generation backends.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation backend error: {message}")]
    Backend { message: String },

    #[error("malformed backend response: {0}")]
    Malformed(String),

    #[error("stream error: {0}")]
    Stream(String),
}

/// Errors a chat exchange can fail with before any output is produced.
///
/// Once streaming output has started, failures are reported in-band as a
/// terminal [`crate::chat::ChatEvent::Failed`] event instead.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("query must not be empty")]
    InvalidInput,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
}
