//! services/api/src/web/leads.rs
//!
//! Lead endpoints. A lead's client is always resolved among the caller's own clients.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sales_deck_core::{resources::NewLead, Lead, LeadPatch, LeadStatus, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::auth::SuccessResponse;
use crate::web::extract::ApiJson;
use crate::web::parse_id;
use crate::web::state::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LeadCreateRequest {
    pub client_id: String,
    pub project_scope: String,
    pub notes: String,
}

#[derive(Serialize, Deserialize, Default, ToSchema)]
pub struct LeadUpdateRequest {
    pub client_id: Option<String>,
    pub project_scope: Option<String>,
    pub notes: Option<String>,
    /// One of `active`, `won`, `lost`.
    pub status: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LeadResponse {
    pub id: Uuid,
    pub user_id: String,
    pub client_id: Uuid,
    pub client_name: String,
    pub project_scope: String,
    pub notes: String,
    #[schema(value_type = String, example = "active")]
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Lead> for LeadResponse {
    fn from(l: Lead) -> Self {
        Self {
            id: l.id,
            user_id: l.user_id,
            client_id: l.client_id,
            client_name: l.client_name,
            project_scope: l.project_scope,
            notes: l.notes,
            status: l.status,
            created_at: l.created_at,
        }
    }
}

impl LeadUpdateRequest {
    fn into_patch(self) -> Result<LeadPatch, ApiError> {
        let client_id = self
            .client_id
            .as_deref()
            .map(|raw| parse_id(raw, "Client"))
            .transpose()?;
        let status = self
            .status
            .as_deref()
            .map(|raw| raw.parse::<LeadStatus>().map_err(ApiError::bad_request))
            .transpose()?;
        Ok(LeadPatch {
            client_id,
            project_scope: self.project_scope,
            notes: self.notes,
            status,
        })
    }
}

#[utoipa::path(
    post,
    path = "/api/leads",
    request_body = LeadCreateRequest,
    responses(
        (status = 200, description = "Lead created", body = LeadResponse),
        (status = 404, description = "Client not found")
    )
)]
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<LeadCreateRequest>,
) -> Result<Json<LeadResponse>, ApiError> {
    let input = NewLead {
        client_id: parse_id(&req.client_id, "Client")?,
        project_scope: req.project_scope,
        notes: req.notes,
    };
    let lead = state.leads.create(&user.id, input).await?;
    Ok(Json(lead.into()))
}

#[utoipa::path(
    get,
    path = "/api/leads",
    responses((status = 200, description = "The caller's leads", body = [LeadResponse]))
)]
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<LeadResponse>>, ApiError> {
    let leads = state.leads.list(&user.id).await?;
    Ok(Json(leads.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    patch,
    path = "/api/leads/{id}",
    request_body = LeadUpdateRequest,
    params(("id" = String, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Updated lead", body = LeadResponse),
        (status = 400, description = "No data to update"),
        (status = 404, description = "Lead or client not found")
    )
)]
pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<LeadUpdateRequest>,
) -> Result<Json<LeadResponse>, ApiError> {
    let lead_id = parse_id(&id, "Lead")?;
    let lead = state.leads.patch(&user.id, lead_id, req.into_patch()?).await?;
    Ok(Json(lead.into()))
}

#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    params(("id" = String, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Lead deleted", body = SuccessResponse),
        (status = 404, description = "Lead not found")
    )
)]
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let lead_id = parse_id(&id, "Lead")?;
    state.leads.delete(&user.id, lead_id).await?;
    Ok(SuccessResponse::ok())
}
