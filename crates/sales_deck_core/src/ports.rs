//! crates/sales_deck_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Asset, AssetType, AuthSession, Client, ClientPatch, ExternalIdentity, Lead, LeadChanges,
    SalesDeck, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The external service answered, but refused the request.
    #[error("Rejected by upstream service: {0}")]
    Rejected(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The storage gateway. Every method touching an owned collection takes the
/// owner id and must filter on it; rows owned by someone else do not exist.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users ---
    async fn find_user_by_id(&self, user_id: &str) -> PortResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<User>>;

    /// Inserts the user unless one with the same email exists. Returns whether
    /// a row was written.
    async fn insert_user(&self, user: &User) -> PortResult<bool>;

    // --- Auth Sessions ---
    async fn insert_auth_session(&self, session: &AuthSession) -> PortResult<()>;

    async fn find_auth_session(&self, session_token: &str) -> PortResult<Option<AuthSession>>;

    /// Returns the number of deleted rows.
    async fn delete_auth_session(&self, session_token: &str) -> PortResult<u64>;

    // --- Clients ---
    async fn insert_client(&self, client: &Client) -> PortResult<()>;

    async fn find_client(&self, owner_id: &str, client_id: Uuid) -> PortResult<Option<Client>>;

    async fn list_clients(&self, owner_id: &str, limit: usize) -> PortResult<Vec<Client>>;

    /// Applies the present fields and returns the updated row, or `None` when
    /// no owned row matched.
    async fn update_client(
        &self,
        owner_id: &str,
        client_id: Uuid,
        patch: &ClientPatch,
    ) -> PortResult<Option<Client>>;

    /// Deletes the client only while no lead references it; the check and the
    /// delete are one atomic step. Returns the number of deleted rows.
    async fn delete_client(&self, owner_id: &str, client_id: Uuid) -> PortResult<u64>;

    // --- Assets ---
    async fn insert_asset(&self, asset: &Asset) -> PortResult<()>;

    async fn list_assets(
        &self,
        owner_id: &str,
        asset_type: Option<AssetType>,
        limit: usize,
    ) -> PortResult<Vec<Asset>>;

    async fn delete_asset(&self, owner_id: &str, asset_id: Uuid) -> PortResult<u64>;

    // --- Leads ---
    async fn insert_lead(&self, lead: &Lead) -> PortResult<()>;

    async fn find_lead(&self, owner_id: &str, lead_id: Uuid) -> PortResult<Option<Lead>>;

    async fn list_leads(&self, owner_id: &str, limit: usize) -> PortResult<Vec<Lead>>;

    async fn update_lead(
        &self,
        owner_id: &str,
        lead_id: Uuid,
        changes: &LeadChanges,
    ) -> PortResult<Option<Lead>>;

    async fn delete_lead(&self, owner_id: &str, lead_id: Uuid) -> PortResult<u64>;

    /// Rewrites the cached `client_name` of every owned lead pointing at `client_id`.
    async fn rename_client_on_leads(
        &self,
        owner_id: &str,
        client_id: Uuid,
        client_name: &str,
    ) -> PortResult<u64>;

    async fn count_leads_for_client(&self, owner_id: &str, client_id: Uuid) -> PortResult<u64>;

    // --- Sales Decks ---
    async fn insert_deck(&self, deck: &SalesDeck) -> PortResult<()>;

    async fn find_deck(&self, owner_id: &str, deck_id: Uuid) -> PortResult<Option<SalesDeck>>;

    async fn list_decks(&self, owner_id: &str, limit: usize) -> PortResult<Vec<SalesDeck>>;
}

#[async_trait]
pub trait SessionExchangeService: Send + Sync {
    /// Trades an opaque external session id for the user's identity and session token.
    /// A refusal by the provider is reported as `PortError::Rejected`.
    async fn exchange_session(&self, session_id: &str) -> PortResult<ExternalIdentity>;
}

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Runs a single completion and returns the raw text of the first choice.
    async fn generate_text(&self, system_prompt: &str, user_prompt: &str) -> PortResult<String>;
}
