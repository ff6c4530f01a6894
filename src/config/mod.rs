//! Configuration loading

pub mod app_config;

pub use app_config::{AppConfig, SeedUser, ServerConfig, SessionBackendKind, SessionStoreConfig};

use std::path::Path;

use crate::error::{ApiError, Result};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "BOOKSTORE_CONFIG";
/// Environment variable overriding the token signing secret
pub const TOKEN_SECRET_ENV: &str = "BOOKSTORE_TOKEN_SECRET";

/// Load and validate configuration
///
/// Reads the TOML file named by `BOOKSTORE_CONFIG` (default `config.toml`),
/// falling back to defaults when the file is absent.
/// `BOOKSTORE_TOKEN_SECRET` overrides the file-provided secret.
pub fn load() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());

    let mut config = if Path::new(&path).exists() {
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            ApiError::config_with_source(format!("failed to read config file: {path}"), e)
        })?;
        toml::from_str(&raw).map_err(|e| {
            ApiError::config_with_source(format!("failed to parse config file: {path}"), e)
        })?
    } else {
        tracing::warn!(path = %path, "config file not found, using defaults");
        AppConfig::default()
    };

    if let Ok(secret) = std::env::var(TOKEN_SECRET_ENV) {
        config.tokens.secret = secret;
    }

    config.validate().map_err(ApiError::config)?;
    Ok(config)
}
