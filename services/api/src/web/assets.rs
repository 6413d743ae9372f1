//! services/api/src/web/assets.rs
//!
//! Asset endpoints, including the multipart upload used for document files.

use axum::{
    extract::{Multipart, Path, Query, State},
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use sales_deck_core::{
    resources::{AssetUpload, NewAsset},
    Asset, AssetType, User,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::auth::SuccessResponse;
use crate::web::extract::ApiJson;
use crate::web::parse_id;
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct AssetCreateRequest {
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "product_description")]
    pub asset_type: AssetType,
    pub name: String,
    pub content: String,
    pub file_url: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssetListQuery {
    /// One of `product_description`, `use_case`, `general`.
    pub asset_type: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AssetResponse {
    pub id: Uuid,
    pub user_id: String,
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    pub asset_type: AssetType,
    pub name: String,
    pub content: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    /// Base64 of the uploaded file.
    pub file_data: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Asset> for AssetResponse {
    fn from(a: Asset) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            asset_type: a.asset_type,
            name: a.name,
            content: a.content,
            file_url: a.file_url,
            file_name: a.file_name,
            file_data: a.file_data.map(|bytes| STANDARD.encode(bytes)),
            created_at: a.created_at,
        }
    }
}

fn parse_asset_type(raw: &str) -> Result<AssetType, ApiError> {
    raw.parse().map_err(ApiError::bad_request)
}

#[utoipa::path(
    post,
    path = "/api/assets",
    request_body = AssetCreateRequest,
    responses((status = 200, description = "Asset created", body = AssetResponse))
)]
pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<AssetCreateRequest>,
) -> Result<Json<AssetResponse>, ApiError> {
    let input = NewAsset {
        asset_type: req.asset_type,
        name: req.name,
        content: req.content,
        file_url: req.file_url,
    };
    let asset = state.assets.create(&user.id, input).await?;
    Ok(Json(asset.into()))
}

/// Accepts `file`, `type` and `name` parts. Text files become the asset's content;
/// binary files get a placeholder content but are stored in full.
#[utoipa::path(
    post,
    path = "/api/assets/upload",
    request_body(content_type = "multipart/form-data", description = "Parts: file, type, name"),
    responses(
        (status = 200, description = "Asset stored", body = AssetResponse),
        (status = 400, description = "Missing or invalid form parts")
    )
)]
pub async fn upload_asset(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    mut multipart: Multipart,
) -> Result<Json<AssetResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut asset_type: Option<AssetType> = None;
    let mut name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read multipart data: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let data = field.bytes().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read file bytes: {}", e))
                })?;
                file = Some((file_name, data.to_vec()));
            }
            Some("type") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                asset_type = Some(parse_asset_type(&raw)?);
            }
            Some("name") => {
                name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| ApiError::bad_request("Field 'file' is required"))?;
    let upload = AssetUpload {
        asset_type: asset_type.ok_or_else(|| ApiError::bad_request("Field 'type' is required"))?,
        name: name.ok_or_else(|| ApiError::bad_request("Field 'name' is required"))?,
        file_name,
        bytes,
    };
    let asset = state.assets.upload(&user.id, upload).await?;
    Ok(Json(asset.into()))
}

#[utoipa::path(
    get,
    path = "/api/assets",
    params(AssetListQuery),
    responses((status = 200, description = "The caller's assets", body = [AssetResponse]))
)]
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<AssetListQuery>,
) -> Result<Json<Vec<AssetResponse>>, ApiError> {
    let filter = match query.asset_type.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_asset_type(raw)?),
    };
    let assets = state.assets.list(&user.id, filter).await?;
    Ok(Json(assets.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    delete,
    path = "/api/assets/{id}",
    params(("id" = String, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Asset deleted", body = SuccessResponse),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let asset_id = parse_id(&id, "Asset")?;
    state.assets.delete(&user.id, asset_id).await?;
    Ok(SuccessResponse::ok())
}
