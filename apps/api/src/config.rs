use std::net::SocketAddr;

use thiserror::Error;

use crate::domain::navigation::NavFlags;

/// Errors raised while reading configuration from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime configuration for the API server
///
/// Values come from the process environment; a `.env` file is loaded
/// beforehand by [`AppConfig::from_env`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub db_max_connections: u32,
    pub nav: NavFlags,
}

impl AppConfig {
    const DEFAULT_DATABASE_URL: &'static str = "sqlite://turfhub.db?mode=rwc";
    const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:3000";
    const DEFAULT_JWT_SECRET: &'static str = "dev-secret-key";

    /// Loads `.env` (if present) and reads the configuration
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| {
            tracing::warn!("DATABASE_URL not set, using default");
            Self::DEFAULT_DATABASE_URL.to_string()
        });

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set, using development secret");
            Self::DEFAULT_JWT_SECRET.to_string()
        });

        let bind_raw =
            lookup("BIND_ADDR").unwrap_or_else(|| Self::DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "BIND_ADDR",
                value: bind_raw.clone(),
            })?;

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                key: "DB_MAX_CONNECTIONS",
                value: raw,
            })?,
            None => 5,
        };

        let nav = NavFlags {
            show_luti: is_true(lookup("SHOW_LUTI_NAV_ITEM")),
            scrims_enabled: is_true(lookup("SCRIMS_ENABLED")),
        };

        Ok(Self {
            database_url,
            bind_addr,
            jwt_secret,
            db_max_connections,
            nav,
        })
    }
}

fn is_true(value: Option<String>) -> bool {
    value.as_deref() == Some("true")
}
