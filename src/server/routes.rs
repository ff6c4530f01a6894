//! Route table
//!
//! Authentication endpoints plus the protected subtree. The rate limiter
//! wraps everything (its exempt list keeps the auth flow reachable); the
//! gateway wraps only routes that consume a principal.

use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::auth::{gateway, rate_limit};
use crate::server::{AppState, handlers};

/// Build the full application router
pub fn create_routes(state: AppState) -> Router {
    let protected = Router::new()
        .route("/users/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            gateway::authenticate,
        ));

    Router::new()
        .nest("/auth", auth_routes())
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::enforce,
        ))
        .with_state(state)
}

/// Login, refresh and logout
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route("/logout", post(handlers::logout))
}
