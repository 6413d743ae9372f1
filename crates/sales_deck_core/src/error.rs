//! crates/sales_deck_core/src/error.rs
//!
//! Errors raised by the core services. The API layer maps each variant onto an
//! HTTP status; ownership violations are reported as `NotFound` on purpose.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing, unknown or expired credential.
    #[error("{0}")]
    Unauthenticated(String),

    /// Owned resource absent, or a cross-reference that does not resolve.
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// The request would leave a denormalized reference dangling.
    #[error("{0}")]
    Conflict(String),

    /// An external provider failed (transport error, malformed answer, ...).
    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error(transparent)]
    Port(#[from] PortError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity: &str) -> Self {
        ServiceError::NotFound(format!("{} not found", entity))
    }
}
