//! services/api/src/web/auth.rs
//!
//! Authentication endpoints: session creation from an external session id,
//! current-user lookup, and logout.

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Extension, Form, Json,
};
use chrono::{DateTime, Utc};
use sales_deck_core::{auth::SESSION_COOKIE, auth::session_ttl, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::middleware::cookie_token;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateSessionForm {
    pub session_id: String,
}

/// Accepts the `session_id` field either as a multipart form (what browsers
/// send with `FormData`) or as a urlencoded form.
pub struct SessionIdForm(pub String);

impl<S> FromRequest<S> for SessionIdForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(form) = Form::<CreateSessionForm>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return Ok(SessionIdForm(form.session_id));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read multipart data: {}", e)))?
        {
            if field.name() == Some("session_id") {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                return Ok(SessionIdForm(value));
            }
        }
        Err(ApiError::bad_request("Field 'session_id' is required"))
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub success: bool,
    pub session_token: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            picture: user.picture,
            created_at: user.created_at,
        }
    }
}

//=========================================================================================
// Cookies
//=========================================================================================

/// `Set-Cookie` value for a fresh session: http-only, secure, usable cross-site.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=None; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token,
        session_ttl().num_seconds()
    )
}

/// `Set-Cookie` value that makes the browser drop the session cookie.
pub fn cleared_session_cookie() -> String {
    format!(
        "{}=; HttpOnly; Secure; SameSite=None; Path=/; Max-Age=0",
        SESSION_COOKIE
    )
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/session - Exchange an external session id for a session cookie
#[utoipa::path(
    post,
    path = "/api/auth/session",
    request_body(content = CreateSessionForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Session created", body = SessionResponse),
        (status = 400, description = "Invalid session ID")
    )
)]
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    SessionIdForm(session_id): SessionIdForm,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.auth.create_session(&session_id).await?;
    let token = outcome.session.session_token;

    Ok((
        [(header::SET_COOKIE, session_cookie(&token))],
        Json(SessionResponse {
            success: true,
            session_token: token,
        }),
    ))
}

/// GET /api/auth/me - The authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me_handler(Extension(user): Extension<User>) -> Json<UserResponse> {
    Json(user.into())
}

/// POST /api/auth/logout - Delete the cookie's session and clear the cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Logged out", body = SuccessResponse))
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.logout(cookie_token(&headers).as_deref()).await?;
    Ok((
        [(header::SET_COOKIE, cleared_session_cookie())],
        SuccessResponse::ok(),
    ))
}
