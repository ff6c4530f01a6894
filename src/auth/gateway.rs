//! Per-request authentication gateway
//!
//! Runs ahead of every protected handler: consults the revocation set,
//! verifies the token signature and expiry, and installs the request
//! principal or rejects with the application-wide error envelope.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::types::{Principal, extract_bearer_token, token_fingerprint};
use crate::error::{ApiError, Result};
use crate::server::AppState;
use crate::server::response::reject;

/// Axum middleware evaluating the request's bearer token
///
/// Requests without an `Authorization` header pass through unauthenticated;
/// handlers that need a principal reject their absence themselves.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
    else {
        return next.run(req).await;
    };

    let path = req.uri().path().to_owned();
    match evaluate(&state, &auth_header).await {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(err) => reject(&path, &downgraded(err)),
    }
}

/// Token state machine: revoked, then signature, then expiry
async fn evaluate(state: &AppState, auth_header: &str) -> Result<Principal> {
    let token = extract_bearer_token(auth_header)
        .ok_or_else(|| crate::unauthorized_error!("malformed authorization header"))?;

    // Revocation is keyed by the literal token string, so it can be checked
    // before the signature.
    if state.sessions().is_revoked(token).await? {
        tracing::debug!(
            token = %token_fingerprint(token),
            "rejected revoked access token"
        );
        return Err(ApiError::token_revoked());
    }

    let verification = state.token_codec().verify(token)?;
    if verification.expired {
        return Err(ApiError::token_expired());
    }

    let claims = verification.claims;
    let user_id = claims
        .user_id()
        .map_err(|e| ApiError::unauthorized_with_source("malformed token subject", e))?;

    Ok(Principal {
        user_id,
        email: claims.email,
        role: claims.role,
    })
}

/// Collapse unexpected internals to a generic rejection so nothing leaks
/// through the auth boundary
fn downgraded(err: ApiError) -> ApiError {
    match err {
        ApiError::Unauthorized { .. } | ApiError::TokenExpired | ApiError::TokenRevoked => err,
        other => {
            tracing::error!(error = %other, "gateway evaluation failed, returning generic rejection");
            ApiError::unauthorized("authentication failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_pass_through_downgrade() {
        let err = downgraded(ApiError::token_expired());
        assert!(matches!(err, ApiError::TokenExpired));

        let err = downgraded(ApiError::token_revoked());
        assert!(matches!(err, ApiError::TokenRevoked));

        let err = downgraded(ApiError::unauthorized("bad token"));
        assert_eq!(err.to_string(), "bad token");
    }

    #[test]
    fn test_internal_failures_are_collapsed() {
        let err = downgraded(ApiError::session_store("redis unreachable at 10.0.0.5"));
        assert!(matches!(err, ApiError::Unauthorized { .. }));
        // The original message must not survive into the response.
        assert_eq!(err.to_string(), "authentication failed");

        let err = downgraded(ApiError::internal("claims parsing bug"));
        assert_eq!(err.to_string(), "authentication failed");
    }
}
