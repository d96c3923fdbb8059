//! Error types for the secret service
//!
//! Provides unified error handling using thiserror. Cache failures never
//! appear here: they are absorbed by the cache store and logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::generator::GenerationError;
use crate::models::ErrorResponse;
use crate::records::RecordStoreError;

// == App Error Enum ==
/// Unified error type surfaced to clients.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad length or empty option set
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Record store failure
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<RecordStoreError> for AppError {
    fn from(err: RecordStoreError) -> Self {
        AppError::Persistence(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Persistence(msg) => {
                tracing::error!(error = %msg, "record store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for request handlers.
pub type Result<T> = std::result::Result<T, AppError>;
