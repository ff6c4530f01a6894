//! Session store backends
//!
//! Redis for deployments, an in-process TTL cache for development and
//! tests. Both expose the same string-value contract: per-key atomic
//! operations, no cross-key transactions.

use async_trait::async_trait;
use moka::future::Cache;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::error::{ApiError, Result};

/// Redis connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis server host
    pub host: String,
    /// Redis server port
    pub port: u16,
    /// Database number
    pub database: u8,
    /// Connection password (optional)
    pub password: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            database: 0,
            password: None,
        }
    }
}

impl RedisConfig {
    /// Build the Redis connection URL
    #[must_use]
    pub fn build_url(&self) -> String {
        if let Some(password) = &self.password {
            format!(
                "redis://:{}@{}:{}/{}",
                password, self.host, self.port, self.database
            )
        } else {
            format!("redis://{}:{}/{}", self.host, self.port, self.database)
        }
    }
}

/// Key-value backend behind the session store
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Unconditionally set `key` to `value` with the given TTL
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Read the current value of `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Delete `key`, reporting whether it existed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Whether `key` currently exists
    async fn exists(&self, key: &str) -> Result<bool>;
}

/// Redis-backed session storage
pub struct RedisBackend {
    connection_manager: ConnectionManager,
}

impl RedisBackend {
    /// Connect to the configured Redis server
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        tracing::info!(host = %config.host, port = config.port, "connecting to redis");

        let client = Client::open(config.build_url())
            .map_err(|e| ApiError::session_store_with_source("failed to create redis client", e))?;

        let connection_manager = ConnectionManager::new(client).await.map_err(|e| {
            ApiError::session_store_with_source("failed to establish redis connection", e)
        })?;

        tracing::info!("redis connection established");

        Ok(Self { connection_manager })
    }
}

#[async_trait]
impl SessionBackend for RedisBackend {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.connection_manager.clone();

        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
            .await
            .map_err(|e| {
                ApiError::session_store_with_source(format!("failed to set key: {key}"), e)
            })?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection_manager.clone();

        let value: Option<String> = conn.get(key).await.map_err(|e| {
            ApiError::session_store_with_source(format!("failed to get key: {key}"), e)
        })?;

        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection_manager.clone();

        let removed: i32 = conn.del(key).await.map_err(|e| {
            ApiError::session_store_with_source(format!("failed to delete key: {key}"), e)
        })?;

        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection_manager.clone();

        let exists: bool = conn.exists(key).await.map_err(|e| {
            ApiError::session_store_with_source(format!("failed to check key: {key}"), e)
        })?;

        Ok(exists)
    }
}

/// In-process session storage for development and tests
///
/// Capacity eviction is delegated to the cache; expiry is enforced on read
/// so TTL semantics match the Redis backend.
pub struct MemoryBackend {
    entries: Cache<String, MemoryEntry>,
}

#[derive(Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

impl MemoryBackend {
    /// Create a backend bounded at `max_entries`
    #[must_use]
    pub fn new(max_entries: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max_entries).build(),
        }
    }
}

#[async_trait]
impl SessionBackend for MemoryBackend {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let entry = MemoryEntry {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entries.get(key).await {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value)),
            Some(_) => {
                self.entries.invalidate(key).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let existed = self.get(key).await?.is_some();
        self.entries.invalidate(key).await;
        Ok(existed)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
