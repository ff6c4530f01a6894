//! Authentication endpoint handlers
//!
//! Thin translations between HTTP and `AuthFlowService`; all failure
//! responses go through the shared envelope in `response`.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use axum::Extension;
use serde::{Deserialize, Serialize};

use crate::auth::types::{Principal, Role};
use crate::error::ApiError;
use crate::server::AppState;
use crate::server::response::reject;

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

/// Refresh request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// The refresh token to rotate
    pub refresh_token: String,
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    uri: Uri,
    Json(body): Json<LoginRequest>,
) -> Response {
    match state.auth_flow().login(&body.email, &body.password).await {
        Ok(pair) => (StatusCode::OK, Json(pair)).into_response(),
        Err(err) => reject(uri.path(), &err),
    }
}

/// `POST /auth/refresh`
pub async fn refresh(
    State(state): State<AppState>,
    uri: Uri,
    Json(body): Json<RefreshRequest>,
) -> Response {
    match state.auth_flow().refresh(&body.refresh_token).await {
        Ok(pair) => (StatusCode::OK, Json(pair)).into_response(),
        Err(err) => reject(uri.path(), &err),
    }
}

/// `POST /auth/logout`
pub async fn logout(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let Some(authorization) = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
    else {
        return reject(
            uri.path(),
            &ApiError::bad_request("missing authorization header"),
        );
    };

    match state.auth_flow().logout(authorization).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => reject(uri.path(), &err),
    }
}

/// Profile payload for the authenticated account
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    /// Account id
    pub user_id: i32,
    /// Account email
    pub email: String,
    /// Account role
    pub role: Role,
}

/// `GET /users/me`
///
/// Representative downstream consumer of the principal the gateway
/// installs; the profile CRUD proper lives in another service.
pub async fn me(uri: Uri, principal: Option<Extension<Principal>>) -> Response {
    match principal {
        Some(Extension(principal)) => Json(MeResponse {
            user_id: principal.user_id,
            email: principal.email,
            role: principal.role,
        })
        .into_response(),
        None => reject(
            uri.path(),
            &ApiError::unauthorized("authentication required"),
        ),
    }
}
