pub mod assets;
pub mod auth;
pub mod clients;
pub mod decks;
pub mod extract;
pub mod leads;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::config::{ConfigError, CorsOrigins};
use crate::error::ApiError;
use crate::web::{middleware::require_auth, rest::ApiDoc, state::AppState};

/// Upper bound for request bodies, uploads included.
const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Parses a resource id taken from a path or body. Ids that are not UUIDs
/// cannot match any record, so they are reported as missing.
pub fn parse_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::not_found(entity))
}

fn cors_layer(origins: &CorsOrigins) -> Result<CorsLayer, ApiError> {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::mirror_request(),
        CorsOrigins::List(list) => {
            let values = list
                .iter()
                .map(|o| {
                    o.parse::<HeaderValue>().map_err(|e| {
                        ConfigError::InvalidValue("CORS_ORIGINS".to_string(), e.to_string())
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            AllowOrigin::list(values)
        }
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])))
}

/// Builds the complete application router: `/api` routes (public auth routes
/// plus everything behind the session middleware), `/health`, and Swagger UI.
pub fn app(state: Arc<AppState>) -> Result<Router, ApiError> {
    let public_routes = Router::new()
        .route("/auth/session", post(auth::create_session_handler))
        .route("/auth/logout", post(auth::logout_handler));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/clients",
            post(clients::create_client).get(clients::list_clients),
        )
        .route(
            "/clients/{id}",
            patch(clients::update_client).delete(clients::delete_client),
        )
        .route("/assets", post(assets::create_asset).get(assets::list_assets))
        .route("/assets/upload", post(assets::upload_asset))
        .route("/assets/{id}", delete(assets::delete_asset))
        .route("/leads", post(leads::create_lead).get(leads::list_leads))
        .route(
            "/leads/{id}",
            patch(leads::update_lead).delete(leads::delete_lead),
        )
        .route("/decks/generate", post(decks::generate_deck))
        .route("/decks", get(decks::list_decks))
        .route("/decks/{id}", get(decks::get_deck))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes);

    let router = Router::new()
        .nest("/api", api_router)
        .route("/health", get(rest::health_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors_layer(&state.config.cors_origins)?)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    Ok(router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    ))
}
