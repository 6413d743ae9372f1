//! crates/sales_deck_core/src/resources.rs
//!
//! Owner-scoped CRUD services for clients, assets and leads.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{
    Asset, AssetType, Client, ClientPatch, Lead, LeadChanges, LeadPatch, LeadStatus,
};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::DatabaseService;

/// Upper bound on rows returned by any listing.
pub const LIST_LIMIT: usize = 1000;

fn ensure_deleted(deleted: u64, entity: &str) -> ServiceResult<()> {
    if deleted == 0 {
        return Err(ServiceError::not_found(entity));
    }
    Ok(())
}

//=========================================================================================
// Clients
//=========================================================================================

#[derive(Debug, Clone)]
pub struct NewClient {
    pub name: String,
    pub industry: String,
    pub description: String,
}

#[derive(Clone)]
pub struct ClientService {
    db: Arc<dyn DatabaseService>,
}

impl ClientService {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    pub async fn create(&self, owner_id: &str, input: NewClient) -> ServiceResult<Client> {
        let client = Client {
            id: Uuid::new_v4(),
            user_id: owner_id.to_string(),
            name: input.name,
            industry: input.industry,
            description: input.description,
            created_at: Utc::now(),
        };
        self.db.insert_client(&client).await?;
        Ok(client)
    }

    pub async fn list(&self, owner_id: &str) -> ServiceResult<Vec<Client>> {
        Ok(self.db.list_clients(owner_id, LIST_LIMIT).await?)
    }

    /// Applies a partial update. A new name is copied onto the owner's leads
    /// that reference this client.
    pub async fn patch(
        &self,
        owner_id: &str,
        client_id: Uuid,
        patch: ClientPatch,
    ) -> ServiceResult<Client> {
        if patch.is_empty() {
            return Err(ServiceError::BadRequest("No data to update".to_string()));
        }
        let client = self
            .db
            .update_client(owner_id, client_id, &patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client"))?;

        if patch.name.is_some() {
            let renamed = self
                .db
                .rename_client_on_leads(owner_id, client_id, &client.name)
                .await?;
            debug!(%client_id, renamed, "Propagated client name to leads");
        }
        Ok(client)
    }

    /// Deletes a client unless leads still point at it.
    pub async fn delete(&self, owner_id: &str, client_id: Uuid) -> ServiceResult<()> {
        let referencing = self.db.count_leads_for_client(owner_id, client_id).await?;
        if referencing > 0 {
            return Err(ServiceError::Conflict(format!(
                "Client is referenced by {} lead(s)",
                referencing
            )));
        }
        let deleted = self.db.delete_client(owner_id, client_id).await?;
        if deleted == 0 {
            // A lead may have been attached between the count and the delete.
            let referencing = self.db.count_leads_for_client(owner_id, client_id).await?;
            if referencing > 0 {
                return Err(ServiceError::Conflict(format!(
                    "Client is referenced by {} lead(s)",
                    referencing
                )));
            }
        }
        ensure_deleted(deleted, "Client")
    }
}

//=========================================================================================
// Assets
//=========================================================================================

#[derive(Debug, Clone)]
pub struct NewAsset {
    pub asset_type: AssetType,
    pub name: String,
    pub content: String,
    pub file_url: Option<String>,
}

/// A raw file submitted through the upload endpoint.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub asset_type: AssetType,
    pub name: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Text used as generation context for an uploaded file: the file itself when
/// it is UTF-8, otherwise a placeholder naming it.
pub fn upload_content(file_name: &str, bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => format!("[Binary file: {}]", file_name),
    }
}

#[derive(Clone)]
pub struct AssetService {
    db: Arc<dyn DatabaseService>,
}

impl AssetService {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    pub async fn create(&self, owner_id: &str, input: NewAsset) -> ServiceResult<Asset> {
        let asset = Asset {
            id: Uuid::new_v4(),
            user_id: owner_id.to_string(),
            asset_type: input.asset_type,
            name: input.name,
            content: input.content,
            file_url: input.file_url,
            file_name: None,
            file_data: None,
            created_at: Utc::now(),
        };
        self.db.insert_asset(&asset).await?;
        Ok(asset)
    }

    pub async fn upload(&self, owner_id: &str, upload: AssetUpload) -> ServiceResult<Asset> {
        let content = upload_content(&upload.file_name, &upload.bytes);
        info!(
            file_name = %upload.file_name,
            size = upload.bytes.len(),
            "Storing uploaded asset"
        );
        let asset = Asset {
            id: Uuid::new_v4(),
            user_id: owner_id.to_string(),
            asset_type: upload.asset_type,
            name: upload.name,
            content,
            file_url: None,
            file_name: Some(upload.file_name),
            file_data: Some(upload.bytes),
            created_at: Utc::now(),
        };
        self.db.insert_asset(&asset).await?;
        Ok(asset)
    }

    pub async fn list(
        &self,
        owner_id: &str,
        asset_type: Option<AssetType>,
    ) -> ServiceResult<Vec<Asset>> {
        Ok(self.db.list_assets(owner_id, asset_type, LIST_LIMIT).await?)
    }

    pub async fn delete(&self, owner_id: &str, asset_id: Uuid) -> ServiceResult<()> {
        let deleted = self.db.delete_asset(owner_id, asset_id).await?;
        ensure_deleted(deleted, "Asset")
    }
}

//=========================================================================================
// Leads
//=========================================================================================

#[derive(Debug, Clone)]
pub struct NewLead {
    pub client_id: Uuid,
    pub project_scope: String,
    pub notes: String,
}

#[derive(Clone)]
pub struct LeadService {
    db: Arc<dyn DatabaseService>,
}

impl LeadService {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    async fn owned_client_name(&self, owner_id: &str, client_id: Uuid) -> ServiceResult<String> {
        self.db
            .find_client(owner_id, client_id)
            .await?
            .map(|c| c.name)
            .ok_or_else(|| ServiceError::not_found("Client"))
    }

    pub async fn create(&self, owner_id: &str, input: NewLead) -> ServiceResult<Lead> {
        let client_name = self.owned_client_name(owner_id, input.client_id).await?;
        let lead = Lead {
            id: Uuid::new_v4(),
            user_id: owner_id.to_string(),
            client_id: input.client_id,
            client_name,
            project_scope: input.project_scope,
            notes: input.notes,
            status: LeadStatus::Active,
            created_at: Utc::now(),
        };
        self.db.insert_lead(&lead).await?;
        Ok(lead)
    }

    pub async fn list(&self, owner_id: &str) -> ServiceResult<Vec<Lead>> {
        Ok(self.db.list_leads(owner_id, LIST_LIMIT).await?)
    }

    pub async fn patch(&self, owner_id: &str, lead_id: Uuid, patch: LeadPatch) -> ServiceResult<Lead> {
        if patch.is_empty() {
            return Err(ServiceError::BadRequest("No data to update".to_string()));
        }
        let client = match patch.client_id {
            Some(client_id) => Some((client_id, self.owned_client_name(owner_id, client_id).await?)),
            None => None,
        };
        let changes = LeadChanges {
            client,
            project_scope: patch.project_scope,
            notes: patch.notes,
            status: patch.status,
        };
        self.db
            .update_lead(owner_id, lead_id, &changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("Lead"))
    }

    pub async fn delete(&self, owner_id: &str, lead_id: Uuid) -> ServiceResult<()> {
        let deleted = self.db.delete_lead(owner_id, lead_id).await?;
        ensure_deleted(deleted, "Lead")
    }
}
