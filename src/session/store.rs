//! Typed session store
//!
//! One refresh-token slot per user plus a time-bounded access-token
//! revocation set. Every backend round trip runs under a bounded timeout so
//! a slow external store cannot stall a request indefinitely.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::session::backend::SessionBackend;
use crate::session::keys::SessionKey;

/// Session state held in the external store
pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    op_timeout: Duration,
}

impl SessionStore {
    /// Create a store over the given backend
    #[must_use]
    pub fn new(backend: Arc<dyn SessionBackend>, op_timeout: Duration) -> Self {
        Self {
            backend,
            op_timeout,
        }
    }

    async fn run<T>(
        &self,
        what: &'static str,
        operation: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.op_timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(crate::session_store_error!(
                "session store call timed out: {what}"
            )),
        }
    }

    /// Overwrite the user's refresh-token slot
    ///
    /// Rotation is destructive: whatever token the slot held before is gone.
    pub async fn put_refresh_token(
        &self,
        user_id: i32,
        token: &str,
        ttl: Duration,
    ) -> Result<()> {
        let key = SessionKey::RefreshSlot { user_id }.build();
        self.run("put_refresh_token", self.backend.put(&key, token, ttl))
            .await
    }

    /// Read the user's current refresh token, if any
    pub async fn get_refresh_token(&self, user_id: i32) -> Result<Option<String>> {
        let key = SessionKey::RefreshSlot { user_id }.build();
        self.run("get_refresh_token", self.backend.get(&key)).await
    }

    /// Drop the user's refresh-token slot; no-op when absent
    pub async fn delete_refresh_token(&self, user_id: i32) -> Result<()> {
        let key = SessionKey::RefreshSlot { user_id }.build();
        self.run("delete_refresh_token", self.backend.delete(&key))
            .await?;
        Ok(())
    }

    /// Mark an access token unusable for the rest of its natural lifetime
    ///
    /// The entry TTL equals the token's remaining validity, so entry and
    /// token lapse together; a token with no validity left needs no entry.
    pub async fn revoke_access_token(&self, token: &str, remaining_secs: i64) -> Result<()> {
        if remaining_secs <= 0 {
            return Ok(());
        }

        let key = SessionKey::Denylist {
            token: token.to_string(),
        }
        .build();
        #[allow(clippy::cast_sign_loss)]
        let ttl = Duration::from_secs(remaining_secs as u64);
        self.run("revoke_access_token", self.backend.put(&key, "revoked", ttl))
            .await
    }

    /// Whether an access token has been revoked
    pub async fn is_revoked(&self, token: &str) -> Result<bool> {
        let key = SessionKey::Denylist {
            token: token.to_string(),
        }
        .build();
        self.run("is_revoked", self.backend.exists(&key)).await
    }
}
