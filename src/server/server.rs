//! HTTP server assembly
//!
//! Wires configuration into the shared application context and serves the
//! router with tracing and CORS layers.

use axum::Router;
use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::rate_limit::RateLimiter;
use crate::auth::service::AuthFlowService;
use crate::auth::token::TokenCodec;
use crate::config::{AppConfig, ServerConfig, SessionBackendKind};
use crate::error::{ApiError, Result};
use crate::session::SessionStore;
use crate::session::backend::{MemoryBackend, RedisBackend, SessionBackend};
use crate::users::UserDirectory;

/// Shared application context behind every handler
pub struct AppContext {
    /// Loaded configuration
    pub config: AppConfig,
    /// Token codec
    pub token_codec: Arc<TokenCodec>,
    /// Session store
    pub sessions: Arc<SessionStore>,
    /// Request rate limiter
    pub rate_limiter: Arc<RateLimiter>,
    /// User directory
    pub directory: Arc<dyn UserDirectory>,
    /// Login/refresh/logout flows
    pub auth_flow: AuthFlowService,
}

impl AppContext {
    /// Wire the context from configuration plus a user directory
    pub async fn build(config: AppConfig, directory: Arc<dyn UserDirectory>) -> Result<Self> {
        let token_codec = Arc::new(TokenCodec::new(config.tokens.clone())?);

        let backend: Arc<dyn SessionBackend> = match config.session_store.backend {
            SessionBackendKind::Memory => {
                Arc::new(MemoryBackend::new(config.session_store.memory_max_entries))
            }
            SessionBackendKind::Redis => {
                let redis = config.session_store.redis.as_ref().ok_or_else(|| {
                    ApiError::config(
                        "session_store.backend = \"redis\" requires a [session_store.redis] section",
                    )
                })?;
                Arc::new(RedisBackend::connect(redis).await?)
            }
        };
        let sessions = Arc::new(SessionStore::new(
            backend,
            Duration::from_millis(config.session_store.op_timeout_ms),
        ));

        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
        let auth_flow = AuthFlowService::new(
            Arc::clone(&token_codec),
            Arc::clone(&sessions),
            Arc::clone(&directory),
        );

        Ok(Self {
            config,
            token_codec,
            sessions,
            rate_limiter,
            directory,
            auth_flow,
        })
    }
}

/// Cloneable handler state
#[derive(Clone)]
pub struct AppState {
    context: Arc<AppContext>,
}

impl AppState {
    /// Wrap a shared context
    #[must_use]
    pub const fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    /// Token codec
    #[must_use]
    pub fn token_codec(&self) -> &TokenCodec {
        &self.context.token_codec
    }

    /// Session store
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.context.sessions
    }

    /// Request rate limiter
    #[must_use]
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.context.rate_limiter
    }

    /// Login/refresh/logout flows
    #[must_use]
    pub fn auth_flow(&self) -> &AuthFlowService {
        &self.context.auth_flow
    }
}

impl Deref for AppState {
    type Target = AppContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

/// HTTP server for the REST API
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create the server from configuration and shared state
    #[must_use]
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        let router = Self::create_router(state, &config);
        Self { config, router }
    }

    fn create_router(state: AppState, config: &ServerConfig) -> Router {
        let mut app = super::routes::create_routes(state);

        let service_builder = ServiceBuilder::new().layer(TraceLayer::new_for_http());

        if config.enable_cors {
            let mut cors_layer = CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::ACCEPT,
                ]);

            if config.cors_origins.contains(&"*".to_string()) {
                cors_layer = cors_layer.allow_origin(Any);
            } else {
                let origins = config
                    .cors_origins
                    .iter()
                    .map(|origin| origin.parse::<axum::http::HeaderValue>())
                    .collect::<std::result::Result<Vec<_>, _>>();

                match origins {
                    Ok(origins) => {
                        cors_layer = cors_layer.allow_origin(origins);
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "invalid cors origin configuration, falling back to allow any"
                        );
                        cors_layer = cors_layer.allow_origin(Any);
                    }
                }
            }

            app = app.layer(service_builder.layer(cors_layer));
        } else {
            app = app.layer(service_builder);
        }

        app
    }

    /// Bind and serve until shutdown
    pub async fn serve(self) -> Result<()> {
        let ip = self
            .config
            .bind_address
            .parse::<std::net::IpAddr>()
            .map_err(|e| {
                ApiError::config_with_source(
                    format!("invalid bind address '{}'", self.config.bind_address),
                    e,
                )
            })?;
        let addr = SocketAddr::new(ip, self.config.port);

        tracing::info!(%addr, "starting http server");

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ApiError::internal_with_source("failed to bind listener", e))?;

        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| ApiError::internal_with_source("http server error", e))?;

        Ok(())
    }
}
