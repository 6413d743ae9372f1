//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// Default endpoint of the external OAuth session-data service.
pub const DEFAULT_SESSION_EXCHANGE_URL: &str =
    "https://demobackend.emergentagent.com/auth/v1/env/oauth/session-data";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Origins allowed to make credentialed cross-site requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorsOrigins {
    /// Mirror whatever origin the browser sends.
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            CorsOrigins::Any
        } else {
            CorsOrigins::List(origins)
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub deck_model: String,
    pub session_exchange_url: String,
    pub cors_origins: CorsOrigins,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // --- Server and Database Settings ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = var("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let database_max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string(), e.to_string())
            })?,
            None => 5,
        };

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Provider Settings ---
        let openai_api_key = var("OPENAI_API_KEY");
        let openai_base_url = var("OPENAI_BASE_URL");
        let deck_model = var("DECK_MODEL").unwrap_or_else(|| "gpt-4o".to_string());
        let session_exchange_url = var("SESSION_EXCHANGE_URL")
            .unwrap_or_else(|| DEFAULT_SESSION_EXCHANGE_URL.to_string());

        let cors_origins = CorsOrigins::parse(&var("CORS_ORIGINS").unwrap_or_else(|| "*".to_string()));

        Ok(Self {
            bind_address,
            database_url,
            database_max_connections,
            log_level,
            openai_api_key,
            openai_base_url,
            deck_model,
            session_exchange_url,
            cors_origins,
        })
    }

    /// The OpenAI key is only needed once the server actually starts.
    pub fn require_openai_api_key(&self) -> Result<&str, ConfigError> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))
    }
}
