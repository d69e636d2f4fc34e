//! Application error type mapping to HTTP status codes.
//!
//! Store failures are surfaced as a generic server error with no backend
//! detail in the body (the detail goes to the log); a generation failure
//! before any streaming output maps to 502 so clients can distinguish it
//! from their own bad input. Mid-stream failures never reach this type --
//! they are delivered in-band as terminal stream events.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use pulsefeed_types::error::{ExchangeError, StoreError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Request validation failure.
    Validation(String),
    /// Chat exchange failure (before any output).
    Exchange(ExchangeError),
    /// Summary store failure outside an exchange.
    Store(StoreError),
    /// Generic internal error.
    Internal(String),
}

impl From<ExchangeError> for AppError {
    fn from(e: ExchangeError) -> Self {
        AppError::Exchange(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Exchange(ExchangeError::InvalidInput) => (
                StatusCode::BAD_REQUEST,
                "MISSING_QUERY",
                "Query is required".to_string(),
            ),
            AppError::Exchange(ExchangeError::Store(err)) | AppError::Store(err) => {
                tracing::error!(error = %err, "summary store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_UNAVAILABLE",
                    "Data store unavailable".to_string(),
                )
            }
            AppError::Exchange(ExchangeError::Generation(err)) => {
                tracing::error!(error = %err, "generation failure before output");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FAILED",
                    "Failed to generate response".to_string(),
                )
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsefeed_types::error::GenerationError;

    #[test]
    fn invalid_input_maps_to_400() {
        let response = AppError::from(ExchangeError::InvalidInput).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_failure_maps_to_generic_500() {
        let response =
            AppError::from(StoreError::Unavailable("secret detail".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generation_failure_maps_to_502() {
        let response = AppError::from(ExchangeError::Generation(GenerationError::Backend {
            message: "down".to_string(),
        }))
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
