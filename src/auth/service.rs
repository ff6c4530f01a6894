//! Authentication flows
//!
//! Login, refresh rotation and logout over the token codec, the session
//! store and the user directory. This is the only component that writes to
//! the session store. No step is retried; every failure is terminal.

use bcrypt::verify;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::token::TokenCodec;
use crate::auth::types::{TokenPair, extract_bearer_token, token_fingerprint};
use crate::error::{ApiError, Result};
use crate::session::SessionStore;
use crate::users::UserDirectory;

/// Login / refresh / logout orchestration
pub struct AuthFlowService {
    codec: Arc<TokenCodec>,
    sessions: Arc<SessionStore>,
    directory: Arc<dyn UserDirectory>,
}

impl AuthFlowService {
    /// Create the service over its collaborators
    #[must_use]
    pub fn new(
        codec: Arc<TokenCodec>,
        sessions: Arc<SessionStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            codec,
            sessions,
            directory,
        }
    }

    #[allow(clippy::cast_sign_loss)]
    fn refresh_slot_ttl(&self) -> Duration {
        Duration::from_secs(self.codec.refresh_ttl_secs().max(1) as u64)
    }

    /// Exchange credentials for a fresh token pair
    ///
    /// Unknown email, wrong password and non-password providers all yield
    /// the same rejection so account existence is never disclosed.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        let Some(user) = self.directory.find_by_email(email).await? else {
            return Err(crate::unauthorized_error!("invalid credentials"));
        };

        if !user.provider.is_password_based() {
            return Err(crate::unauthorized_error!("invalid credentials"));
        }

        let password_matches = verify(password, &user.password_hash)
            .map_err(|e| ApiError::internal_with_source("password hash verification failed", e))?;
        if !password_matches {
            tracing::warn!(user_id = user.id, "login rejected: password mismatch");
            return Err(crate::unauthorized_error!("invalid credentials"));
        }

        if !user.status.is_active() {
            return Err(crate::forbidden_error!("account is not active"));
        }

        let pair = self.codec.issue_pair(user.id, &user.email, user.role)?;
        // Overwrites any prior session: at most one live refresh token per
        // user at any instant.
        self.sessions
            .put_refresh_token(user.id, &pair.refresh_token, self.refresh_slot_ttl())
            .await?;

        tracing::info!(user_id = user.id, role = user.role.as_str(), "login succeeded");
        Ok(pair)
    }

    /// Rotate a refresh token into a fresh pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let verification = self.codec.verify(refresh_token)?;
        if verification.expired {
            return Err(ApiError::token_expired());
        }

        let claims = verification.claims;
        let user_id = claims
            .user_id()
            .map_err(|e| ApiError::unauthorized_with_source("malformed token subject", e))?;

        let Some(stored) = self.sessions.get_refresh_token(user_id).await? else {
            return Err(crate::unauthorized_error!("no active session, login required"));
        };

        if stored != refresh_token {
            // The slot has rotated past this token. This comparison is the
            // sole defense against replay of a rotated-away token.
            tracing::warn!(
                user_id,
                token = %token_fingerprint(refresh_token),
                "refresh rejected: token already rotated"
            );
            return Err(crate::unauthorized_error!("refresh token is no longer valid"));
        }

        let Some(user) = self.directory.find_by_id(user_id).await? else {
            return Err(crate::unauthorized_error!("no active session, login required"));
        };
        if !user.status.is_active() {
            return Err(crate::forbidden_error!("account is not active"));
        }

        let pair = self.codec.issue_pair(user.id, &user.email, user.role)?;
        // Last writer wins: overwriting the slot makes the just-presented
        // token permanently unusable.
        self.sessions
            .put_refresh_token(user.id, &pair.refresh_token, self.refresh_slot_ttl())
            .await?;

        tracing::debug!(user_id, "refresh rotation completed");
        Ok(pair)
    }

    /// End the session carried by a `Bearer <token>` authorization header
    ///
    /// An already-expired access token is tolerated: the refresh slot is
    /// still deleted and no revocation entry is written, because the entry
    /// must never outlive the token it targets.
    pub async fn logout(&self, authorization: &str) -> Result<()> {
        let token = extract_bearer_token(authorization).ok_or_else(|| {
            crate::bad_request_error!("expected 'Bearer <token>' authorization header")
        })?;

        let verification = self.codec.verify(token)?;
        let claims = verification.claims;
        let user_id = claims
            .user_id()
            .map_err(|e| ApiError::unauthorized_with_source("malformed token subject", e))?;

        self.sessions.delete_refresh_token(user_id).await?;

        let remaining = claims.remaining_secs();
        if remaining > 0 {
            self.sessions.revoke_access_token(token, remaining).await?;
        }

        tracing::info!(user_id, "logout completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::types::{Role, TokenConfig};
    use crate::session::backend::MemoryBackend;
    use crate::users::{AccountStatus, InMemoryDirectory, Provider, UserRecord};

    const TEST_SECRET: &str = "service-test-secret-0123456789abcdef";

    fn user(id: i32, email: &str, password: &str) -> UserRecord {
        UserRecord {
            id,
            email: email.to_string(),
            password_hash: bcrypt::hash(password, 4).unwrap(),
            role: Role::Customer,
            provider: Provider::Local,
            status: AccountStatus::Active,
        }
    }

    fn service_with(users: Vec<UserRecord>) -> (AuthFlowService, Arc<SessionStore>) {
        let codec = Arc::new(
            TokenCodec::new(TokenConfig {
                secret: TEST_SECRET.to_string(),
                ..TokenConfig::default()
            })
            .unwrap(),
        );
        let sessions = Arc::new(SessionStore::new(
            Arc::new(MemoryBackend::new(64)),
            Duration::from_secs(2),
        ));
        let directory = Arc::new(InMemoryDirectory::new());
        for u in users {
            directory.insert(u);
        }
        (
            AuthFlowService::new(codec, sessions.clone(), directory),
            sessions,
        )
    }

    #[tokio::test]
    async fn test_login_returns_bearer_pair_and_fills_slot() {
        let (service, sessions) = service_with(vec![user(1, "admin@example.com", "P@ssw0rd!")]);

        let pair = service.login("admin@example.com", "P@ssw0rd!").await.unwrap();

        assert_eq!(pair.token_type, "Bearer");
        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
        assert_eq!(
            sessions.get_refresh_token(1).await.unwrap(),
            Some(pair.refresh_token)
        );
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let (service, _) = service_with(vec![user(1, "admin@example.com", "P@ssw0rd!")]);

        let err = service
            .login("admin@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_login_unknown_email_matches_wrong_password_rejection() {
        let (service, _) = service_with(vec![user(1, "admin@example.com", "P@ssw0rd!")]);

        let unknown = service
            .login("ghost@example.com", "P@ssw0rd!")
            .await
            .unwrap_err();
        let mismatch = service
            .login("admin@example.com", "wrong")
            .await
            .unwrap_err();

        // Same code and message: account existence is not disclosed.
        assert_eq!(unknown.code(), mismatch.code());
        assert_eq!(unknown.to_string(), mismatch.to_string());
    }

    #[tokio::test]
    async fn test_login_oauth_account_is_unauthorized() {
        let mut oauth_user = user(2, "social@example.com", "irrelevant");
        oauth_user.provider = Provider::Google;
        let (service, _) = service_with(vec![oauth_user]);

        let err = service
            .login("social@example.com", "irrelevant")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_login_suspended_account_is_forbidden() {
        let mut suspended = user(3, "blocked@example.com", "P@ssw0rd!");
        suspended.status = AccountStatus::Suspended;
        let (service, _) = service_with(vec![suspended]);

        let err = service
            .login("blocked@example.com", "P@ssw0rd!")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_rejects_replay() {
        let (service, _) = service_with(vec![user(1, "admin@example.com", "P@ssw0rd!")]);

        let first = service.login("admin@example.com", "P@ssw0rd!").await.unwrap();
        let second = service.refresh(&first.refresh_token).await.unwrap();

        assert_ne!(second.refresh_token, first.refresh_token);

        // Re-presenting the rotated-away token must fail.
        let err = service.refresh(&first.refresh_token).await.unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");

        // The fresh token still works.
        service.refresh(&second.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_garbage_token_is_unauthorized() {
        let (service, _) = service_with(vec![user(1, "admin@example.com", "P@ssw0rd!")]);

        let err = service.refresh("").await.unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");

        let err = service.refresh("not-a-token").await.unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_refresh_without_session_requires_login() {
        let (service, sessions) = service_with(vec![user(1, "admin@example.com", "P@ssw0rd!")]);

        let pair = service.login("admin@example.com", "P@ssw0rd!").await.unwrap();
        sessions.delete_refresh_token(1).await.unwrap();

        let err = service.refresh(&pair.refresh_token).await.unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_refresh_rechecks_account_status() {
        let codec = Arc::new(
            TokenCodec::new(TokenConfig {
                secret: TEST_SECRET.to_string(),
                ..TokenConfig::default()
            })
            .unwrap(),
        );
        let sessions = Arc::new(SessionStore::new(
            Arc::new(MemoryBackend::new(64)),
            Duration::from_secs(2),
        ));
        let directory = Arc::new(InMemoryDirectory::new());
        directory.insert(user(1, "admin@example.com", "P@ssw0rd!"));
        let service = AuthFlowService::new(codec, sessions, directory.clone());

        let pair = service.login("admin@example.com", "P@ssw0rd!").await.unwrap();

        // Suspend the account after login; the next refresh must notice.
        let mut suspended = user(1, "admin@example.com", "P@ssw0rd!");
        suspended.status = AccountStatus::Suspended;
        directory.insert(suspended);

        let err = service.refresh(&pair.refresh_token).await.unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_logout_revokes_access_and_deletes_slot() {
        let (service, sessions) = service_with(vec![user(1, "admin@example.com", "P@ssw0rd!")]);

        let pair = service.login("admin@example.com", "P@ssw0rd!").await.unwrap();
        service
            .logout(&format!("Bearer {}", pair.access_token))
            .await
            .unwrap();

        assert!(sessions.is_revoked(&pair.access_token).await.unwrap());
        assert_eq!(sessions.get_refresh_token(1).await.unwrap(), None);

        // A fresh login for the same user still succeeds afterwards.
        service.login("admin@example.com", "P@ssw0rd!").await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_expired_token_writes_no_revocation() {
        let (service, sessions) = service_with(vec![user(1, "admin@example.com", "P@ssw0rd!")]);

        let codec = TokenCodec::new(TokenConfig {
            secret: TEST_SECRET.to_string(),
            ..TokenConfig::default()
        })
        .unwrap();
        let expired = codec.issue(1, "admin@example.com", Role::Customer, -60).unwrap();

        service.logout(&format!("Bearer {expired}")).await.unwrap();
        assert!(!sessions.is_revoked(&expired).await.unwrap());
    }

    #[tokio::test]
    async fn test_logout_malformed_header_is_bad_request() {
        let (service, _) = service_with(vec![user(1, "admin@example.com", "P@ssw0rd!")]);

        let err = service.logout("Basic dXNlcjpwYXNz").await.unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");

        let err = service.logout("Bearer ").await.unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_logout_garbage_token_is_unauthorized() {
        let (service, _) = service_with(vec![user(1, "admin@example.com", "P@ssw0rd!")]);

        let err = service.logout("Bearer not-a-token").await.unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }
}
