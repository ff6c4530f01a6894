//! Error type definitions

use axum::http::StatusCode;
use thiserror::Error;

/// Application error taxonomy.
///
/// The set is closed: every failure in the authentication subsystem maps to
/// exactly one kind, each kind maps to a fixed HTTP status and
/// machine-readable code, and nothing is retried server-side.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad credentials, or a missing/invalid/mismatched token
    #[error("{message}")]
    Unauthorized {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Structurally valid token past its expiry
    #[error("token has expired")]
    TokenExpired,

    /// Token revoked before its natural expiry
    #[error("token has been revoked")]
    TokenRevoked,

    /// Authenticated but not allowed (inactive account)
    #[error("{message}")]
    Forbidden { message: String },

    /// Malformed request header or body
    #[error("{message}")]
    BadRequest { message: String },

    /// Request rate threshold exceeded
    #[error("{message}")]
    TooManyRequests { message: String, retry_after_secs: u64 },

    /// Session store round trip failed or timed out
    #[error("{message}")]
    SessionStore {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Invalid or missing configuration
    #[error("configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Unexpected internal failure
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ApiError {
    /// Create an unauthorized error
    pub fn unauthorized<M: Into<String>>(message: M) -> Self {
        Self::Unauthorized {
            message: message.into(),
            source: None,
        }
    }

    /// Create an unauthorized error with a source
    pub fn unauthorized_with_source<M: Into<String>, E: Into<anyhow::Error>>(
        message: M,
        source: E,
    ) -> Self {
        Self::Unauthorized {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a token-expired error
    #[must_use]
    pub const fn token_expired() -> Self {
        Self::TokenExpired
    }

    /// Create a token-revoked error
    #[must_use]
    pub const fn token_revoked() -> Self {
        Self::TokenRevoked
    }

    /// Create a forbidden error
    pub fn forbidden<M: Into<String>>(message: M) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create a bad-request error
    pub fn bad_request<M: Into<String>>(message: M) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a rate-limit error
    pub fn too_many_requests<M: Into<String>>(message: M, retry_after_secs: u64) -> Self {
        Self::TooManyRequests {
            message: message.into(),
            retry_after_secs,
        }
    }

    /// Create a session-store error
    pub fn session_store<M: Into<String>>(message: M) -> Self {
        Self::SessionStore {
            message: message.into(),
            source: None,
        }
    }

    /// Create a session-store error with a source
    pub fn session_store_with_source<M: Into<String>, E: Into<anyhow::Error>>(
        message: M,
        source: E,
    ) -> Self {
        Self::SessionStore {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a configuration error
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with a source
    pub fn config_with_source<M: Into<String>, E: Into<anyhow::Error>>(
        message: M,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create an internal error
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Create an internal error with a source
    pub fn internal_with_source<M: Into<String>, E: Into<anyhow::Error>>(
        message: M,
        source: E,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// HTTP status this kind maps to
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized { .. } | Self::TokenExpired | Self::TokenRevoked => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::SessionStore { .. } | Self::Config { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable code this kind maps to
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::TooManyRequests { .. } => "TOO_MANY_REQUESTS",
            Self::SessionStore { .. } => "SESSION_STORE_ERROR",
            Self::Config { .. } | Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Retry hint carried by rate-limit rejections
    #[must_use]
    pub const fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::TooManyRequests {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            _ => None,
        }
    }

    /// Whether the failure is attributable to the client (4xx)
    #[must_use]
    pub fn is_client(&self) -> bool {
        self.status().is_client_error()
    }
}
