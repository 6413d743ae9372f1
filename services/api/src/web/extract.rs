//! services/api/src/web/extract.rs
//!
//! Request extractors whose rejections use the `{"detail": ...}` error body.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A JSON request body. Malformed, incomplete or mistyped bodies, and requests
/// without a JSON content type, are answered with 400.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ApiError::bad_request(e.body_text()))?;
        Ok(ApiJson(value))
    }
}
