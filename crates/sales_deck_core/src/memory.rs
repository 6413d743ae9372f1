//! crates/sales_deck_core/src/memory.rs
//!
//! An in-process implementation of the `DatabaseService` port. Rows are kept in
//! insertion order so listings match the `created_at` ordering of the SQL adapter.
//! Used by the test suites and by the server when no database is configured.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    Asset, AssetType, AuthSession, Client, ClientPatch, Lead, LeadChanges, SalesDeck, User,
};
use crate::ports::{DatabaseService, PortResult};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    sessions: Vec<AuthSession>,
    clients: Vec<Client>,
    assets: Vec<Asset>,
    leads: Vec<Lead>,
    decks: Vec<SalesDeck>,
}

#[derive(Default)]
pub struct InMemoryDatabase {
    tables: RwLock<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Removes the rows matching `pred` and returns how many were dropped.
fn remove_where<T>(rows: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> u64 {
    let before = rows.len();
    rows.retain(|row| !pred(row));
    (before - rows.len()) as u64
}

#[async_trait]
impl DatabaseService for InMemoryDatabase {
    async fn find_user_by_id(&self, user_id: &str) -> PortResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &User) -> PortResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Ok(false);
        }
        tables.users.push(user.clone());
        Ok(true)
    }

    async fn insert_auth_session(&self, session: &AuthSession) -> PortResult<()> {
        self.tables.write().await.sessions.push(session.clone());
        Ok(())
    }

    async fn find_auth_session(&self, session_token: &str) -> PortResult<Option<AuthSession>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .iter()
            .find(|s| s.session_token == session_token)
            .cloned())
    }

    async fn delete_auth_session(&self, session_token: &str) -> PortResult<u64> {
        let mut tables = self.tables.write().await;
        Ok(remove_where(&mut tables.sessions, |s| {
            s.session_token == session_token
        }))
    }

    async fn insert_client(&self, client: &Client) -> PortResult<()> {
        self.tables.write().await.clients.push(client.clone());
        Ok(())
    }

    async fn find_client(&self, owner_id: &str, client_id: Uuid) -> PortResult<Option<Client>> {
        let tables = self.tables.read().await;
        Ok(tables
            .clients
            .iter()
            .find(|c| c.id == client_id && c.user_id == owner_id)
            .cloned())
    }

    async fn list_clients(&self, owner_id: &str, limit: usize) -> PortResult<Vec<Client>> {
        let tables = self.tables.read().await;
        Ok(tables
            .clients
            .iter()
            .filter(|c| c.user_id == owner_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_client(
        &self,
        owner_id: &str,
        client_id: Uuid,
        patch: &ClientPatch,
    ) -> PortResult<Option<Client>> {
        let mut tables = self.tables.write().await;
        let Some(client) = tables
            .clients
            .iter_mut()
            .find(|c| c.id == client_id && c.user_id == owner_id)
        else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            client.name = name.clone();
        }
        if let Some(industry) = &patch.industry {
            client.industry = industry.clone();
        }
        if let Some(description) = &patch.description {
            client.description = description.clone();
        }
        Ok(Some(client.clone()))
    }

    async fn delete_client(&self, owner_id: &str, client_id: Uuid) -> PortResult<u64> {
        let mut tables = self.tables.write().await;
        let referenced = tables
            .leads
            .iter()
            .any(|l| l.client_id == client_id && l.user_id == owner_id);
        if referenced {
            return Ok(0);
        }
        Ok(remove_where(&mut tables.clients, |c| {
            c.id == client_id && c.user_id == owner_id
        }))
    }

    async fn insert_asset(&self, asset: &Asset) -> PortResult<()> {
        self.tables.write().await.assets.push(asset.clone());
        Ok(())
    }

    async fn list_assets(
        &self,
        owner_id: &str,
        asset_type: Option<AssetType>,
        limit: usize,
    ) -> PortResult<Vec<Asset>> {
        let tables = self.tables.read().await;
        Ok(tables
            .assets
            .iter()
            .filter(|a| a.user_id == owner_id)
            .filter(|a| asset_type.map_or(true, |t| a.asset_type == t))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn delete_asset(&self, owner_id: &str, asset_id: Uuid) -> PortResult<u64> {
        let mut tables = self.tables.write().await;
        Ok(remove_where(&mut tables.assets, |a| {
            a.id == asset_id && a.user_id == owner_id
        }))
    }

    async fn insert_lead(&self, lead: &Lead) -> PortResult<()> {
        self.tables.write().await.leads.push(lead.clone());
        Ok(())
    }

    async fn find_lead(&self, owner_id: &str, lead_id: Uuid) -> PortResult<Option<Lead>> {
        let tables = self.tables.read().await;
        Ok(tables
            .leads
            .iter()
            .find(|l| l.id == lead_id && l.user_id == owner_id)
            .cloned())
    }

    async fn list_leads(&self, owner_id: &str, limit: usize) -> PortResult<Vec<Lead>> {
        let tables = self.tables.read().await;
        Ok(tables
            .leads
            .iter()
            .filter(|l| l.user_id == owner_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_lead(
        &self,
        owner_id: &str,
        lead_id: Uuid,
        changes: &LeadChanges,
    ) -> PortResult<Option<Lead>> {
        let mut tables = self.tables.write().await;
        let Some(lead) = tables
            .leads
            .iter_mut()
            .find(|l| l.id == lead_id && l.user_id == owner_id)
        else {
            return Ok(None);
        };
        if let Some((client_id, client_name)) = &changes.client {
            lead.client_id = *client_id;
            lead.client_name = client_name.clone();
        }
        if let Some(scope) = &changes.project_scope {
            lead.project_scope = scope.clone();
        }
        if let Some(notes) = &changes.notes {
            lead.notes = notes.clone();
        }
        if let Some(status) = changes.status {
            lead.status = status;
        }
        Ok(Some(lead.clone()))
    }

    async fn delete_lead(&self, owner_id: &str, lead_id: Uuid) -> PortResult<u64> {
        let mut tables = self.tables.write().await;
        Ok(remove_where(&mut tables.leads, |l| {
            l.id == lead_id && l.user_id == owner_id
        }))
    }

    async fn rename_client_on_leads(
        &self,
        owner_id: &str,
        client_id: Uuid,
        client_name: &str,
    ) -> PortResult<u64> {
        let mut tables = self.tables.write().await;
        let mut updated = 0;
        for lead in tables
            .leads
            .iter_mut()
            .filter(|l| l.client_id == client_id && l.user_id == owner_id)
        {
            lead.client_name = client_name.to_string();
            updated += 1;
        }
        Ok(updated)
    }

    async fn count_leads_for_client(&self, owner_id: &str, client_id: Uuid) -> PortResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .leads
            .iter()
            .filter(|l| l.client_id == client_id && l.user_id == owner_id)
            .count() as u64)
    }

    async fn insert_deck(&self, deck: &SalesDeck) -> PortResult<()> {
        self.tables.write().await.decks.push(deck.clone());
        Ok(())
    }

    async fn find_deck(&self, owner_id: &str, deck_id: Uuid) -> PortResult<Option<SalesDeck>> {
        let tables = self.tables.read().await;
        Ok(tables
            .decks
            .iter()
            .find(|d| d.id == deck_id && d.user_id == owner_id)
            .cloned())
    }

    async fn list_decks(&self, owner_id: &str, limit: usize) -> PortResult<Vec<SalesDeck>> {
        let tables = self.tables.read().await;
        Ok(tables
            .decks
            .iter()
            .filter(|d| d.user_id == owner_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
