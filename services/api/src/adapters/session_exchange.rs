//! services/api/src/adapters/session_exchange.rs
//!
//! This module contains the adapter for the external OAuth session provider.
//! It implements the `SessionExchangeService` port from the `core` crate.

use async_trait::async_trait;
use reqwest::Client;
use sales_deck_core::{
    domain::ExternalIdentity,
    ports::{PortError, PortResult, SessionExchangeService},
};
use tracing::{error, info};

/// Header carrying the session id the browser obtained from the provider.
const SESSION_ID_HEADER: &str = "X-Session-ID";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Exchanges session ids against the provider's session-data endpoint.
#[derive(Clone)]
pub struct HttpSessionExchangeAdapter {
    client: Client,
    endpoint: String,
}

impl HttpSessionExchangeAdapter {
    pub fn new(client: Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

//=========================================================================================
// `SessionExchangeService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionExchangeService for HttpSessionExchangeAdapter {
    async fn exchange_session(&self, session_id: &str) -> PortResult<ExternalIdentity> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(SESSION_ID_HEADER, session_id)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Session exchange failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            error!("Auth service returned {}", status);
            return Err(PortError::Rejected(format!("status {}", status)));
        }

        let identity: ExternalIdentity = response.json().await.map_err(|e| {
            PortError::Unexpected(format!("Malformed session data from provider: {}", e))
        })?;
        info!("User data retrieved: {}", identity.email);
        Ok(identity)
    }
}
