//! User directory
//!
//! The account store backing authentication. Persistence lives in an
//! external service; the auth flows consume it through this trait and only
//! need lookup by email, lookup by id and the record's status.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::auth::types::Role;
use crate::error::Result;

/// Identity provider an account was created through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Email + password account
    Local,
    /// Google OAuth account
    Google,
    /// GitHub OAuth account
    Github,
}

impl Provider {
    /// Whether this provider authenticates with a stored password hash
    #[must_use]
    pub const fn is_password_based(self) -> bool {
        matches!(self, Self::Local)
    }
}

/// Account lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account in good standing
    Active,
    /// Temporarily blocked by an operator
    Suspended,
    /// Closed by the owner
    Closed,
}

impl AccountStatus {
    /// Whether the account may hold a session
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// A user account as seen by the authentication subsystem
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Account id
    pub id: i32,
    /// Login email, unique across the directory
    pub email: String,
    /// bcrypt hash of the password; empty for non-local providers
    pub password_hash: String,
    /// Account role
    pub role: Role,
    /// Identity provider
    pub provider: Provider,
    /// Lifecycle status
    pub status: AccountStatus,
}

/// Read access to the account store
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up an account by login email
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Look up an account by id
    async fn find_by_id(&self, id: i32) -> Result<Option<UserRecord>>;
}

/// In-memory directory used in development and tests
#[derive(Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<i32, UserRecord>>,
}

impl InMemoryDirectory {
    /// Create an empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account
    pub fn insert(&self, user: UserRecord) {
        self.users
            .write()
            .expect("user directory lock poisoned")
            .insert(user.id, user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().expect("user directory lock poisoned");
        Ok(users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<UserRecord>> {
        let users = self.users.read().expect("user directory lock poisoned");
        Ok(users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserRecord {
        UserRecord {
            id: 1,
            email: "reader@example.com".to_string(),
            password_hash: "$2b$04$notarealhash".to_string(),
            role: Role::Customer,
            provider: Provider::Local,
            status: AccountStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_lookup_by_email_is_case_insensitive() {
        let directory = InMemoryDirectory::new();
        directory.insert(sample_user());

        let found = directory
            .find_by_email("Reader@Example.COM")
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(1));

        let missing = directory.find_by_email("ghost@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_lookup_by_id() {
        let directory = InMemoryDirectory::new();
        directory.insert(sample_user());

        assert!(directory.find_by_id(1).await.unwrap().is_some());
        assert!(directory.find_by_id(2).await.unwrap().is_none());
    }

    #[test]
    fn test_provider_and_status_predicates() {
        assert!(Provider::Local.is_password_based());
        assert!(!Provider::Google.is_password_based());
        assert!(AccountStatus::Active.is_active());
        assert!(!AccountStatus::Suspended.is_active());
        assert!(!AccountStatus::Closed.is_active());
    }
}
