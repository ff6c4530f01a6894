//! Authentication type definitions
//!
//! Data structures shared by the token codec, the request gateway and the
//! login/refresh/logout flows.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Account role carried inside session tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular storefront customer
    Customer,
    /// Store staff (catalog management)
    Staff,
    /// Platform administrator
    Admin,
}

impl Role {
    /// String form used in logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }
}

/// Claims embedded in every session token
///
/// Access and refresh tokens share this structure; the two variants differ
/// only in TTL and storage policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id
    pub sub: String,
    /// Account email
    pub email: String,
    /// Account role
    pub role: Role,
    /// Issued-at timestamp
    pub iat: i64,
    /// Expiry timestamp
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Token id
    pub jti: String,
}

impl Claims {
    /// Create claims for a fresh token
    pub fn new(user_id: i32, email: String, role: Role, issuer: &str, ttl_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            email,
            role,
            iat: now,
            exp: now + ttl_secs,
            iss: issuer.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<i32, std::num::ParseIntError> {
        self.sub.parse()
    }

    /// Whether the expiry has passed
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Seconds of validity left; non-positive once expired
    #[must_use]
    pub fn remaining_secs(&self) -> i64 {
        self.exp - Utc::now().timestamp()
    }
}

/// Token codec configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// HMAC signing secret
    pub secret: String,
    /// Issuer claim stamped into and required from every token
    pub issuer: String,
    /// Access token TTL (seconds)
    pub access_ttl_secs: i64,
    /// Refresh token TTL (seconds)
    pub refresh_ttl_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "bookstore-api".to_string(),
            access_ttl_secs: 900,       // 15 minutes
            refresh_ttl_secs: 604_800,  // 7 days
        }
    }
}

/// Access + refresh token pair returned by login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived credential authorizing API calls
    pub access_token: String,
    /// Long-lived credential exchanged for a new pair
    pub refresh_token: String,
    /// Always `"Bearer"`
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// The authenticated identity attached to a request
///
/// Derived per-request from a verified token; never persisted.
#[derive(Debug, Clone)]
pub struct Principal {
    /// User id from the token subject
    pub user_id: i32,
    /// Account email
    pub email: String,
    /// Account role
    pub role: Role,
}

/// Extract the token from a `Bearer <token>` authorization header value
#[must_use]
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let token = auth_header.strip_prefix("Bearer ")?;
    if token.is_empty() { None } else { Some(token) }
}

/// Short stable fingerprint of a token for log lines
///
/// Raw tokens never reach the logs.
#[must_use]
pub fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_carry_identity() {
        let claims = Claims::new(
            7,
            "reader@example.com".to_string(),
            Role::Customer,
            "bookstore-api",
            900,
        );

        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.email, "reader@example.com");
        assert_eq!(claims.role, Role::Customer);
        assert!(!claims.is_expired());
        assert!(claims.remaining_secs() > 0);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_negative_ttl_is_expired() {
        let claims = Claims::new(
            7,
            "reader@example.com".to_string(),
            Role::Customer,
            "bookstore-api",
            -30,
        );
        assert!(claims.is_expired());
        assert!(claims.remaining_secs() <= 0);
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(extract_bearer_token(""), None);
    }

    #[test]
    fn test_token_fingerprint_is_short_and_stable() {
        let a = token_fingerprint("some-opaque-token");
        let b = token_fingerprint("some-opaque-token");
        let c = token_fingerprint("another-token");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }
}
