//! Application configuration structures

use serde::{Deserialize, Serialize};

use crate::auth::rate_limit::RateLimitConfig;
use crate::auth::types::{Role, TokenConfig};
use crate::session::backend::RedisConfig;
use crate::users::{AccountStatus, Provider};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Token codec configuration
    pub tokens: TokenConfig,
    /// Session store configuration
    pub session_store: SessionStoreConfig,
    /// Rate limiter configuration
    pub rate_limit: RateLimitConfig,
    /// Accounts loaded into the in-memory directory at startup
    pub seed_users: Vec<SeedUser>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind_address: String,
    /// Listen port
    pub port: u16,
    /// Whether to enable CORS
    pub enable_cors: bool,
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Session store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackendKind {
    /// In-process cache, for development and tests
    Memory,
    /// External Redis store
    Redis,
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStoreConfig {
    /// Selected backend
    pub backend: SessionBackendKind,
    /// Redis connection settings, required for the redis backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis: Option<RedisConfig>,
    /// Upper bound on any single store round trip (milliseconds)
    pub op_timeout_ms: u64,
    /// Entry cap for the memory backend
    pub memory_max_entries: u64,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackendKind::Memory,
            redis: None,
            op_timeout_ms: 2000,
            memory_max_entries: 10_000,
        }
    }
}

/// Account seeded into the in-memory user directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    /// Login email
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Account role
    #[serde(default = "default_seed_role")]
    pub role: Role,
    /// Identity provider
    #[serde(default = "default_seed_provider")]
    pub provider: Provider,
    /// Lifecycle status
    #[serde(default = "default_seed_status")]
    pub status: AccountStatus,
}

const fn default_seed_role() -> Role {
    Role::Customer
}

const fn default_seed_provider() -> Provider {
    Provider::Local
}

const fn default_seed_status() -> AccountStatus {
    AccountStatus::Active
}

impl AppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be non-zero".to_string());
        }

        if self.tokens.secret.len() < 32 {
            return Err("tokens.secret must be set and at least 32 bytes".to_string());
        }
        if self.tokens.access_ttl_secs <= 0 || self.tokens.refresh_ttl_secs <= 0 {
            return Err("token TTLs must be positive".to_string());
        }
        if self.tokens.refresh_ttl_secs <= self.tokens.access_ttl_secs {
            return Err("tokens.refresh_ttl_secs must exceed tokens.access_ttl_secs".to_string());
        }

        if self.session_store.backend == SessionBackendKind::Redis
            && self.session_store.redis.is_none()
        {
            return Err(
                "session_store.backend = \"redis\" requires a [session_store.redis] section"
                    .to_string(),
            );
        }
        if self.session_store.op_timeout_ms == 0 {
            return Err("session_store.op_timeout_ms must be non-zero".to_string());
        }

        if self.rate_limit.enabled {
            if self.rate_limit.window_secs == 0 {
                return Err("rate_limit.window_secs must be non-zero".to_string());
            }
            if self.rate_limit.max_requests == 0 {
                return Err("rate_limit.max_requests must be non-zero".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.tokens.secret = "a-test-secret-of-sufficient-length!!".to_string();
        config
    }

    #[test]
    fn test_defaults_need_only_a_secret() {
        assert!(AppConfig::default().validate().is_err());
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_redis_backend_requires_redis_section() {
        let mut config = valid_config();
        config.session_store.backend = SessionBackendKind::Redis;
        assert!(config.validate().is_err());

        config.session_store.redis = Some(RedisConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_refresh_ttl_must_exceed_access_ttl() {
        let mut config = valid_config();
        config.tokens.refresh_ttl_secs = config.tokens.access_ttl_secs;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let raw = r#"
            [tokens]
            secret = "a-test-secret-of-sufficient-length!!"

            [[seed_users]]
            email = "admin@example.com"
            password_hash = "$2b$04$notarealhash"
            role = "admin"
        "#;

        let config: AppConfig = toml::from_str(raw).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.session_store.backend, SessionBackendKind::Memory);
        assert_eq!(config.seed_users.len(), 1);
        assert_eq!(config.seed_users[0].role, Role::Admin);
        assert_eq!(config.seed_users[0].provider, Provider::Local);
        assert_eq!(config.seed_users[0].status, AccountStatus::Active);
    }

    #[test]
    fn test_disabled_rate_limit_skips_threshold_checks() {
        let mut config = valid_config();
        config.rate_limit.enabled = false;
        config.rate_limit.max_requests = 0;
        assert!(config.validate().is_ok());
    }
}
