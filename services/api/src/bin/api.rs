//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, HttpSessionExchangeAdapter, OpenAiDeckAdapter},
    config::Config,
    error::ApiError,
    web::{app, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use sales_deck_core::{ports::DatabaseService, InMemoryDatabase};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    let (db, pool): (Arc<dyn DatabaseService>, Option<PgPool>) = match &config.database_url {
        Some(url) => {
            info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(url)
                .await?;
            let adapter = DbAdapter::new(pool.clone());
            info!("Running database migrations...");
            adapter.run_migrations().await?;
            info!("Database migrations complete.");
            let db: Arc<dyn DatabaseService> = Arc::new(adapter);
            (db, Some(pool))
        }
        None => {
            warn!("DATABASE_URL is not set; records are kept in memory and lost on exit");
            let db: Arc<dyn DatabaseService> = Arc::new(InMemoryDatabase::new());
            (db, None)
        }
    };

    // --- 3. Initialize Service Adapters ---
    let mut openai_config = OpenAIConfig::new().with_api_key(config.require_openai_api_key()?);
    if let Some(base_url) = &config.openai_base_url {
        openai_config = openai_config.with_api_base(base_url);
    }
    let text_generator = Arc::new(OpenAiDeckAdapter::new(
        Client::with_config(openai_config),
        config.deck_model.clone(),
    ));

    let http_client = reqwest::Client::builder()
        .build()
        .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))?;
    let session_exchange = Arc::new(HttpSessionExchangeAdapter::new(
        http_client,
        config.session_exchange_url.clone(),
    ));

    // --- 4. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::new(
        config.clone(),
        db,
        session_exchange,
        text_generator,
    ));
    let router = app(app_state)?;

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        info!("Closing database pool...");
        pool.close().await;
    }
    info!("Server stopped.");
    Ok(())
}
