//! services/api/src/web/clients.rs
//!
//! Client CRUD endpoints.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sales_deck_core::{resources::NewClient, Client, ClientPatch, User};
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
pub struct ClientCreateRequest {
    pub name: String,
    pub industry: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, Default, ToSchema)]
pub struct ClientUpdateRequest {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ClientResponse {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub industry: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
    fn from(c: Client) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            name: c.name,
            industry: c.industry,
            description: c.description,
            created_at: c.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/clients",
    request_body = ClientCreateRequest,
    responses((status = 200, description = "Client created", body = ClientResponse))
)]
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<ClientCreateRequest>,
) -> Result<Json<ClientResponse>, ApiError> {
    let input = NewClient {
        name: req.name,
        industry: req.industry,
        description: req.description,
    };
    let client = state.clients.create(&user.id, input).await?;
    Ok(Json(client.into()))
}

#[utoipa::path(
    get,
    path = "/api/clients",
    responses((status = 200, description = "The caller's clients", body = [ClientResponse]))
)]
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    let clients = state.clients.list(&user.id).await?;
    Ok(Json(clients.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    patch,
    path = "/api/clients/{id}",
    request_body = ClientUpdateRequest,
    params(("id" = String, Path, description = "Client id")),
    responses(
        (status = 200, description = "Updated client", body = ClientResponse),
        (status = 400, description = "No data to update"),
        (status = 404, description = "Client not found")
    )
)]
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ClientUpdateRequest>,
) -> Result<Json<ClientResponse>, ApiError> {
    let patch = ClientPatch {
        name: req.name,
        industry: req.industry,
        description: req.description,
    };
    let client_id = parse_id(&id, "Client")?;
    let client = state.clients.patch(&user.id, client_id, patch).await?;
    Ok(Json(client.into()))
}

#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    params(("id" = String, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client deleted", body = SuccessResponse),
        (status = 404, description = "Client not found"),
        (status = 409, description = "Client still referenced by leads")
    )
)]
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let client_id = parse_id(&id, "Client")?;
    state.clients.delete(&user.id, client_id).await?;
    Ok(SuccessResponse::ok())
}
