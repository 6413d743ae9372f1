//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use sales_deck_core::auth::{resolve_credential, SESSION_COOKIE};
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Reads the session token from the `Cookie` header(s), if present.
pub fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            let (name, value) = c.trim().split_once('=')?;
            (name == SESSION_COOKIE).then(|| value.to_string())
        })
}

/// Middleware that resolves the session credential to a user.
///
/// The session cookie wins over an `Authorization: Bearer` header. On success the
/// `User` is inserted into the request extensions for handlers to use; otherwise
/// the request is answered with 401 (or 404 when the session's user is gone).
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let cookie = cookie_token(req.headers());
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let token = resolve_credential(cookie.as_deref(), authorization.as_deref());
    let user = state.auth.authenticate(token).await?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_token=tok-9; lang=en"),
        );
        assert_eq!(cookie_token(&headers), Some("tok-9".to_string()));
    }

    #[test]
    fn missing_cookie_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(cookie_token(&headers), None);
        assert_eq!(cookie_token(&HeaderMap::new()), None);
    }
}
