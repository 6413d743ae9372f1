//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and its mapping
//! onto HTTP responses. Every error body has the shape `{"detail": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sales_deck_core::{ports::PortError, ServiceError};
use serde_json::json;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error raised by one of the core services.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl From<PortError> for ApiError {
    fn from(e: PortError) -> Self {
        ApiError::Service(ServiceError::Port(e))
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Service(ServiceError::BadRequest(message.into()))
    }

    pub fn not_found(entity: &str) -> Self {
        ApiError::Service(ServiceError::not_found(entity))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Service(ServiceError::Unauthenticated(_)) => StatusCode::UNAUTHORIZED,
            ApiError::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Service(ServiceError::BadRequest(_)) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::Conflict(_)) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe message, without leaking internal details.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Service(
                ServiceError::Unauthenticated(msg)
                | ServiceError::NotFound(msg)
                | ServiceError::BadRequest(msg)
                | ServiceError::Conflict(msg),
            ) => msg.clone(),
            ApiError::Service(ServiceError::Upstream(_)) => {
                "Upstream service failed".to_string()
            }
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Internal service error: {}", self);
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::info!("Authentication error: {}", self);
        } else {
            tracing::debug!("Client error: {}", self);
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}
