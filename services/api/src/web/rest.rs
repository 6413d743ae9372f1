//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification, plus the liveness check.

use axum::response::Json;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::web::{assets, auth, clients, decks, leads};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        auth::create_session_handler,
        auth::me_handler,
        auth::logout_handler,
        clients::create_client,
        clients::list_clients,
        clients::update_client,
        clients::delete_client,
        assets::create_asset,
        assets::upload_asset,
        assets::list_assets,
        assets::delete_asset,
        leads::create_lead,
        leads::list_leads,
        leads::update_lead,
        leads::delete_lead,
        decks::generate_deck,
        decks::list_decks,
        decks::get_deck,
    ),
    components(
        schemas(
            HealthResponse,
            auth::CreateSessionForm,
            auth::SessionResponse,
            auth::SuccessResponse,
            auth::UserResponse,
            clients::ClientCreateRequest,
            clients::ClientUpdateRequest,
            clients::ClientResponse,
            assets::AssetCreateRequest,
            assets::AssetResponse,
            leads::LeadCreateRequest,
            leads::LeadUpdateRequest,
            leads::LeadResponse,
            decks::DeckGenerateRequest,
            decks::DeckResponse,
        )
    ),
    tags(
        (name = "Sales Deck API", description = "Clients, assets, leads and generated sales decks.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Health
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
}

/// Liveness check. Does not touch storage.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
