//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sales_deck_core::domain::{
    Asset, AssetType, AuthSession, Client, ClientPatch, DeckContent, Lead, LeadChanges,
    LeadStatus, SalesDeck, User,
};
use sales_deck_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: String,
    email: String,
    name: String,
    picture: String,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
            picture: self.picture,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    session_token: String,
    user_id: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}
impl AuthSessionRecord {
    fn to_domain(self) -> AuthSession {
        AuthSession {
            session_token: self.session_token,
            user_id: self.user_id,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ClientRecord {
    id: Uuid,
    user_id: String,
    name: String,
    industry: String,
    description: String,
    created_at: DateTime<Utc>,
}
impl ClientRecord {
    fn to_domain(self) -> Client {
        Client {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            industry: self.industry,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct AssetRecord {
    id: Uuid,
    user_id: String,
    asset_type: String,
    name: String,
    content: String,
    file_url: Option<String>,
    file_name: Option<String>,
    file_data: Option<Vec<u8>>,
    created_at: DateTime<Utc>,
}
impl AssetRecord {
    fn to_domain(self) -> PortResult<Asset> {
        Ok(Asset {
            id: self.id,
            user_id: self.user_id,
            asset_type: self.asset_type.parse().map_err(PortError::Unexpected)?,
            name: self.name,
            content: self.content,
            file_url: self.file_url,
            file_name: self.file_name,
            file_data: self.file_data,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct LeadRecord {
    id: Uuid,
    user_id: String,
    client_id: Uuid,
    client_name: String,
    project_scope: String,
    notes: String,
    status: String,
    created_at: DateTime<Utc>,
}
impl LeadRecord {
    fn to_domain(self) -> PortResult<Lead> {
        Ok(Lead {
            id: self.id,
            user_id: self.user_id,
            client_id: self.client_id,
            client_name: self.client_name,
            project_scope: self.project_scope,
            notes: self.notes,
            status: self.status.parse().map_err(PortError::Unexpected)?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct DeckRecord {
    id: Uuid,
    user_id: String,
    lead_id: Uuid,
    lead_name: String,
    content: Json<DeckContent>,
    created_at: DateTime<Utc>,
}
impl DeckRecord {
    fn to_domain(self) -> SalesDeck {
        SalesDeck {
            id: self.id,
            user_id: self.user_id,
            lead_id: self.lead_id,
            lead_name: self.lead_name,
            content: self.content.0,
            created_at: self.created_at,
        }
    }
}

const CLIENT_COLUMNS: &str = "id, user_id, name, industry, description, created_at";
const ASSET_COLUMNS: &str =
    "id, user_id, asset_type, name, content, file_url, file_name, file_data, created_at";
const LEAD_COLUMNS: &str =
    "id, user_id, client_id, client_name, project_scope, notes, status, created_at";
const DECK_COLUMNS: &str = "id, user_id, lead_id, lead_name, content, created_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn find_user_by_id(&self, user_id: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, name, picture, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, name, picture, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn insert_user(&self, user: &User) -> PortResult<bool> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, name, picture, created_at) VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.picture)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_auth_session(&self, session: &AuthSession) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO user_sessions (session_token, user_id, expires_at, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.session_token)
        .bind(&session.user_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn find_auth_session(&self, session_token: &str) -> PortResult<Option<AuthSession>> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT session_token, user_id, expires_at, created_at FROM user_sessions WHERE session_token = $1",
        )
        .bind(session_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(AuthSessionRecord::to_domain))
    }

    async fn delete_auth_session(&self, session_token: &str) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE session_token = $1")
            .bind(session_token)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn insert_client(&self, client: &Client) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO clients (id, user_id, name, industry, description, created_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(client.id)
        .bind(&client.user_id)
        .bind(&client.name)
        .bind(&client.industry)
        .bind(&client.description)
        .bind(client.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn find_client(&self, owner_id: &str, client_id: Uuid) -> PortResult<Option<Client>> {
        let record = sqlx::query_as::<_, ClientRecord>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1 AND user_id = $2"
        ))
        .bind(client_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(ClientRecord::to_domain))
    }

    async fn list_clients(&self, owner_id: &str, max: usize) -> PortResult<Vec<Client>> {
        let records = sqlx::query_as::<_, ClientRecord>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE user_id = $1 ORDER BY created_at ASC LIMIT $2"
        ))
        .bind(owner_id)
        .bind(limit(max))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(ClientRecord::to_domain).collect())
    }

    async fn update_client(
        &self,
        owner_id: &str,
        client_id: Uuid,
        patch: &ClientPatch,
    ) -> PortResult<Option<Client>> {
        let record = sqlx::query_as::<_, ClientRecord>(&format!(
            "UPDATE clients SET \
                name = COALESCE($3, name), \
                industry = COALESCE($4, industry), \
                description = COALESCE($5, description) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {CLIENT_COLUMNS}"
        ))
        .bind(client_id)
        .bind(owner_id)
        .bind(patch.name.as_deref())
        .bind(patch.industry.as_deref())
        .bind(patch.description.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(ClientRecord::to_domain))
    }

    async fn delete_client(&self, owner_id: &str, client_id: Uuid) -> PortResult<u64> {
        let result = sqlx::query(
            "DELETE FROM clients WHERE id = $1 AND user_id = $2 \
             AND NOT EXISTS (SELECT 1 FROM leads WHERE client_id = $1 AND user_id = $2)",
        )
        .bind(client_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn insert_asset(&self, asset: &Asset) -> PortResult<()> {
        sqlx::query(&format!(
            "INSERT INTO assets ({ASSET_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(asset.id)
        .bind(&asset.user_id)
        .bind(asset.asset_type.as_str())
        .bind(&asset.name)
        .bind(&asset.content)
        .bind(asset.file_url.as_deref())
        .bind(asset.file_name.as_deref())
        .bind(asset.file_data.as_deref())
        .bind(asset.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list_assets(
        &self,
        owner_id: &str,
        asset_type: Option<AssetType>,
        max: usize,
    ) -> PortResult<Vec<Asset>> {
        let records = sqlx::query_as::<_, AssetRecord>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets \
             WHERE user_id = $1 AND ($2::text IS NULL OR asset_type = $2) \
             ORDER BY created_at ASC LIMIT $3"
        ))
        .bind(owner_id)
        .bind(asset_type.map(|t| t.as_str()))
        .bind(limit(max))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(AssetRecord::to_domain).collect()
    }

    async fn delete_asset(&self, owner_id: &str, asset_id: Uuid) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1 AND user_id = $2")
            .bind(asset_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn insert_lead(&self, lead: &Lead) -> PortResult<()> {
        sqlx::query(&format!(
            "INSERT INTO leads ({LEAD_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(lead.id)
        .bind(&lead.user_id)
        .bind(lead.client_id)
        .bind(&lead.client_name)
        .bind(&lead.project_scope)
        .bind(&lead.notes)
        .bind(lead.status.as_str())
        .bind(lead.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn find_lead(&self, owner_id: &str, lead_id: Uuid) -> PortResult<Option<Lead>> {
        let record = sqlx::query_as::<_, LeadRecord>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1 AND user_id = $2"
        ))
        .bind(lead_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(LeadRecord::to_domain).transpose()
    }

    async fn list_leads(&self, owner_id: &str, max: usize) -> PortResult<Vec<Lead>> {
        let records = sqlx::query_as::<_, LeadRecord>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE user_id = $1 ORDER BY created_at ASC LIMIT $2"
        ))
        .bind(owner_id)
        .bind(limit(max))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(LeadRecord::to_domain).collect()
    }

    async fn update_lead(
        &self,
        owner_id: &str,
        lead_id: Uuid,
        changes: &LeadChanges,
    ) -> PortResult<Option<Lead>> {
        let record = sqlx::query_as::<_, LeadRecord>(&format!(
            "UPDATE leads SET \
                client_id = COALESCE($3, client_id), \
                client_name = COALESCE($4, client_name), \
                project_scope = COALESCE($5, project_scope), \
                notes = COALESCE($6, notes), \
                status = COALESCE($7, status) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {LEAD_COLUMNS}"
        ))
        .bind(lead_id)
        .bind(owner_id)
        .bind(changes.client.as_ref().map(|(id, _)| *id))
        .bind(changes.client.as_ref().map(|(_, name)| name.as_str()))
        .bind(changes.project_scope.as_deref())
        .bind(changes.notes.as_deref())
        .bind(changes.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(LeadRecord::to_domain).transpose()
    }

    async fn delete_lead(&self, owner_id: &str, lead_id: Uuid) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1 AND user_id = $2")
            .bind(lead_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn rename_client_on_leads(
        &self,
        owner_id: &str,
        client_id: Uuid,
        client_name: &str,
    ) -> PortResult<u64> {
        let result = sqlx::query(
            "UPDATE leads SET client_name = $3 WHERE client_id = $1 AND user_id = $2",
        )
        .bind(client_id)
        .bind(owner_id)
        .bind(client_name)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn count_leads_for_client(&self, owner_id: &str, client_id: Uuid) -> PortResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM leads WHERE client_id = $1 AND user_id = $2")
                .bind(client_id)
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(count.max(0) as u64)
    }

    async fn insert_deck(&self, deck: &SalesDeck) -> PortResult<()> {
        sqlx::query(&format!(
            "INSERT INTO sales_decks ({DECK_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)"
        ))
        .bind(deck.id)
        .bind(&deck.user_id)
        .bind(deck.lead_id)
        .bind(&deck.lead_name)
        .bind(Json(&deck.content))
        .bind(deck.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn find_deck(&self, owner_id: &str, deck_id: Uuid) -> PortResult<Option<SalesDeck>> {
        let record = sqlx::query_as::<_, DeckRecord>(&format!(
            "SELECT {DECK_COLUMNS} FROM sales_decks WHERE id = $1 AND user_id = $2"
        ))
        .bind(deck_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(DeckRecord::to_domain))
    }

    async fn list_decks(&self, owner_id: &str, max: usize) -> PortResult<Vec<SalesDeck>> {
        let records = sqlx::query_as::<_, DeckRecord>(&format!(
            "SELECT {DECK_COLUMNS} FROM sales_decks WHERE user_id = $1 ORDER BY created_at ASC LIMIT $2"
        ))
        .bind(owner_id)
        .bind(limit(max))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(DeckRecord::to_domain).collect())
    }
}
