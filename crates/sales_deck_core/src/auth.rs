//! crates/sales_deck_core/src/auth.rs
//!
//! The session store and auth guard. Session tokens are issued by the external
//! provider during the exchange; this module only records and checks them.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::{AuthSession, User};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{DatabaseService, PortError, SessionExchangeService};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_token";

/// Lifetime of a freshly created session.
pub const SESSION_TTL_DAYS: i64 = 7;

pub fn session_ttl() -> Duration {
    Duration::days(SESSION_TTL_DAYS)
}

/// Picks the token to authenticate with: the cookie wins, then a bearer header.
pub fn resolve_credential<'a>(
    cookie_token: Option<&'a str>,
    authorization: Option<&'a str>,
) -> Option<&'a str> {
    cookie_token.filter(|t| !t.is_empty()).or_else(|| {
        authorization
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
    })
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub session: AuthSession,
}

#[derive(Clone)]
pub struct AuthService {
    db: Arc<dyn DatabaseService>,
    exchange: Arc<dyn SessionExchangeService>,
}

impl AuthService {
    pub fn new(db: Arc<dyn DatabaseService>, exchange: Arc<dyn SessionExchangeService>) -> Self {
        Self { db, exchange }
    }

    /// Resolves a presented token to the user that owns it.
    ///
    /// Expired sessions are rejected but left in storage.
    pub async fn authenticate(&self, token: Option<&str>) -> ServiceResult<User> {
        let token = token
            .ok_or_else(|| ServiceError::Unauthenticated("Not authenticated".to_string()))?;

        let session = self
            .db
            .find_auth_session(token)
            .await?
            .ok_or_else(|| ServiceError::Unauthenticated("Invalid session".to_string()))?;

        if session.is_expired_at(Utc::now()) {
            debug!(user_id = %session.user_id, "Rejected expired session");
            return Err(ServiceError::Unauthenticated("Session expired".to_string()));
        }

        self.db
            .find_user_by_id(&session.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    /// Exchanges an external session id, provisions the user on first login and
    /// records the provider-issued session token.
    pub async fn create_session(&self, session_id: &str) -> ServiceResult<LoginOutcome> {
        let preview: String = session_id.chars().take(20).collect();
        info!("Creating session for session_id: {}...", preview);

        let identity = self
            .exchange
            .exchange_session(session_id)
            .await
            .map_err(|e| match e {
                PortError::Rejected(reason) => {
                    debug!("Session exchange rejected: {}", reason);
                    ServiceError::BadRequest("Invalid session ID".to_string())
                }
                other => ServiceError::Upstream(other.to_string()),
            })?;

        let now = Utc::now();
        let user = match self.db.find_user_by_email(&identity.email).await? {
            Some(existing) => {
                info!("Existing user found: {}", existing.email);
                existing
            }
            None => {
                info!("Creating new user: {}", identity.email);
                let user = User {
                    id: identity.id,
                    email: identity.email,
                    name: identity.name,
                    picture: identity.picture,
                    created_at: now,
                };
                if !self.db.insert_user(&user).await? {
                    debug!("User {} was provisioned concurrently", user.email);
                }
                // Re-read so a concurrent first login resolves to the stored row.
                self.db
                    .find_user_by_email(&user.email)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("User"))?
            }
        };

        let session = AuthSession {
            session_token: identity.session_token,
            user_id: user.id.clone(),
            expires_at: now + session_ttl(),
            created_at: now,
        };
        self.db.insert_auth_session(&session).await?;
        info!("Session created successfully for user: {}", user.email);

        Ok(LoginOutcome { user, session })
    }

    /// Deletes the session behind `token`, if any. Idempotent.
    pub async fn logout(&self, token: Option<&str>) -> ServiceResult<()> {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            let deleted = self.db.delete_auth_session(token).await?;
            debug!(deleted, "Logged out");
        }
        Ok(())
    }
}
