//! crates/sales_deck_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database; they derive serde only so the
//! deck content tree can be parsed from provider output and stored as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Identity & Sessions
//=========================================================================================

/// An authenticated user. The id is issued by the external session provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: String,
    pub created_at: DateTime<Utc>,
}

/// A browser login session (the `session_token` cookie or bearer token).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub session_token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// The identity returned by the external provider when a session id is exchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalIdentity {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: String,
    pub session_token: String,
}

//=========================================================================================
// Owned Resources
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub industry: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Partial update for a client. `None` means the field is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
}

impl ClientPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.industry.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    ProductDescription,
    UseCase,
    General,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::ProductDescription => "product_description",
            AssetType::UseCase => "use_case",
            AssetType::General => "general",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product_description" => Ok(AssetType::ProductDescription),
            "use_case" => Ok(AssetType::UseCase),
            "general" => Ok(AssetType::General),
            other => Err(format!("unknown asset type '{}'", other)),
        }
    }
}

/// A knowledge asset. `content` is fed verbatim into deck generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: Uuid,
    pub user_id: String,
    pub asset_type: AssetType,
    pub name: String,
    pub content: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    /// Original upload bytes, kept even when `content` is a placeholder.
    pub file_data: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    Active,
    Won,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Active => "active",
            LeadStatus::Won => "won",
            LeadStatus::Lost => "lost",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LeadStatus::Active),
            "won" => Ok(LeadStatus::Won),
            "lost" => Ok(LeadStatus::Lost),
            other => Err(format!("unknown lead status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    pub id: Uuid,
    pub user_id: String,
    pub client_id: Uuid,
    /// Cached copy of the client's name.
    pub client_name: String,
    pub project_scope: String,
    pub notes: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

/// Partial update for a lead as submitted by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadPatch {
    pub client_id: Option<Uuid>,
    pub project_scope: Option<String>,
    pub notes: Option<String>,
    pub status: Option<LeadStatus>,
}

impl LeadPatch {
    pub fn is_empty(&self) -> bool {
        self.client_id.is_none()
            && self.project_scope.is_none()
            && self.notes.is_none()
            && self.status.is_none()
    }
}

/// A resolved lead update handed to storage: a client change always travels
/// together with the client's current name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadChanges {
    pub client: Option<(Uuid, String)>,
    pub project_scope: Option<String>,
    pub notes: Option<String>,
    pub status: Option<LeadStatus>,
}

//=========================================================================================
// Sales Decks
//=========================================================================================

/// A generated presentation. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesDeck {
    pub id: Uuid,
    pub user_id: String,
    pub lead_id: Uuid,
    pub lead_name: String,
    pub content: DeckContent,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckContent {
    pub title: String,
    pub slides: Vec<Slide>,
}

/// One slide of a deck, tagged by `type`. Every slide needs a `title`; the
/// other fields may be left out by the model and default to empty. Fields
/// outside this shape are not kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Slide {
    Title {
        title: String,
        #[serde(default)]
        subtitle: String,
    },
    Problem {
        title: String,
        #[serde(default)]
        points: Vec<String>,
    },
    Solution {
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        points: Vec<String>,
    },
    Features {
        title: String,
        #[serde(default)]
        features: Vec<Feature>,
    },
    UseCase {
        title: String,
        #[serde(default)]
        description: String,
    },
    Roi {
        title: String,
        #[serde(default)]
        metrics: Vec<Metric>,
    },
    Cta {
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        action: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}
