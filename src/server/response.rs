//! HTTP error envelope
//!
//! The single place where error kinds become transport responses. The
//! gateway and rate-limit middlewares write this same shape directly, so a
//! rejection issued before any handler runs cannot diverge from a
//! handler-raised failure.

use axum::Json;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiError;

/// Uniform error body returned on every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Moment the rejection was produced
    pub timestamp: DateTime<Utc>,
    /// Request path that failed
    pub path: String,
    /// HTTP status
    pub status: u16,
    /// Machine-readable code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Optional structured extras, e.g. a retry hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Build the rejection response for `error` raised while serving `path`
#[must_use]
pub fn reject(path: &str, error: &ApiError) -> Response {
    let status = error.status();
    let body = ErrorBody {
        timestamp: Utc::now(),
        path: path.to_owned(),
        status: status.as_u16(),
        code: error.code().to_owned(),
        message: error.to_string(),
        details: error
            .retry_after_secs()
            .map(|secs| serde_json::json!({ "retryAfterSecs": secs })),
    };

    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_reject_builds_envelope() {
        let response = reject("/auth/login", &ApiError::unauthorized("invalid credentials"));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_envelope_shape() {
        let body = ErrorBody {
            timestamp: Utc::now(),
            path: "/users/me".to_string(),
            status: 401,
            code: "TOKEN_EXPIRED".to_string(),
            message: "token has expired".to_string(),
            details: None,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["path"], "/users/me");
        assert_eq!(value["status"], 401);
        assert_eq!(value["code"], "TOKEN_EXPIRED");
        assert!(value.get("timestamp").is_some());
        // Absent details are omitted, not serialized as null.
        assert!(value.get("details").is_none());
    }

    #[test]
    fn test_rate_limit_rejection_carries_retry_hint() {
        let response = reject(
            "/catalog/books",
            &ApiError::too_many_requests("request rate limit exceeded", 42),
        );
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
