//! services/api/src/web/decks.rs
//!
//! Deck generation and retrieval.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sales_deck_core::{DeckContent, SalesDeck, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::extract::ApiJson;
use crate::web::parse_id;
use crate::web::state::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DeckGenerateRequest {
    pub lead_id: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DeckResponse {
    pub id: Uuid,
    pub user_id: String,
    pub lead_id: Uuid,
    pub lead_name: String,
    /// `{title, slides: [...]}`, each slide tagged by `type`.
    #[schema(value_type = Object)]
    pub content: DeckContent,
    pub created_at: DateTime<Utc>,
}

impl From<SalesDeck> for DeckResponse {
    fn from(d: SalesDeck) -> Self {
        Self {
            id: d.id,
            user_id: d.user_id,
            lead_id: d.lead_id,
            lead_name: d.lead_name,
            content: d.content,
            created_at: d.created_at,
        }
    }
}

/// Generates a new deck for one of the caller's leads. Each call stores a new deck.
#[utoipa::path(
    post,
    path = "/api/decks/generate",
    request_body = DeckGenerateRequest,
    responses(
        (status = 200, description = "Deck generated", body = DeckResponse),
        (status = 404, description = "Lead or client not found"),
        (status = 500, description = "Generation provider failed")
    )
)]
pub async fn generate_deck(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<DeckGenerateRequest>,
) -> Result<Json<DeckResponse>, ApiError> {
    let lead_id = parse_id(&req.lead_id, "Lead")?;
    let generated = state.decks.generate(&user.id, lead_id).await?;
    info!(
        deck_id = %generated.deck.id,
        fallback = generated.outcome.is_fallback(),
        "Deck stored"
    );
    Ok(Json(generated.deck.into()))
}

#[utoipa::path(
    get,
    path = "/api/decks",
    responses((status = 200, description = "The caller's decks", body = [DeckResponse]))
)]
pub async fn list_decks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<DeckResponse>>, ApiError> {
    let decks = state.decks.list(&user.id).await?;
    Ok(Json(decks.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/decks/{id}",
    params(("id" = String, Path, description = "Deck id")),
    responses(
        (status = 200, description = "The deck", body = DeckResponse),
        (status = 404, description = "Deck not found")
    )
)]
pub async fn get_deck(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<DeckResponse>, ApiError> {
    let deck_id = parse_id(&id, "Deck")?;
    let deck = state.decks.get(&user.id, deck_id).await?;
    Ok(Json(deck.into()))
}
