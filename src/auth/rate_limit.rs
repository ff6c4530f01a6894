//! Request rate limiting
//!
//! In-process fixed-window counters keyed by `(client identity, path)`.
//! Counters live behind the map's per-shard locks, so unrelated requests
//! are never serialized, and an owned sweeper task drops lapsed windows so
//! the map stays bounded for the lifetime of the process.

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::ApiError;
use crate::server::AppState;
use crate::server::response::reject;

/// Rate limiter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Master switch
    pub enabled: bool,
    /// Fixed window length (seconds)
    pub window_secs: u64,
    /// Requests allowed per key per window
    pub max_requests: u32,
    /// Paths never limited, so the limiter cannot block the login flow
    pub exempt_paths: Vec<String>,
    /// Interval between sweeps of lapsed windows (seconds)
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 60,
            max_requests: 30,
            exempt_paths: vec![
                "/auth/login".to_string(),
                "/auth/refresh".to_string(),
                "/auth/signup".to_string(),
            ],
            sweep_interval_secs: 300,
        }
    }
}

/// Result of a single window check
#[derive(Debug, Clone)]
pub struct RateDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Requests counted in the current window, this one included
    pub current: u32,
    /// Configured threshold
    pub limit: u32,
    /// Seconds until the current window lapses
    pub retry_after_secs: u64,
}

struct WindowCounter {
    count: u32,
    window_start: Instant,
}

/// Fixed-window request counter keyed by `(client identity, path)`
pub struct RateLimiter {
    windows: DashMap<(String, String), WindowCounter>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a limiter from configuration
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    /// Limiter configuration
    #[must_use]
    pub const fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Whether a path is excluded from limiting
    #[must_use]
    pub fn is_exempt(&self, path: &str) -> bool {
        self.config.exempt_paths.iter().any(|p| p == path)
    }

    /// Count one request against its window and decide
    ///
    /// The entry guard holds only this key's shard, which is the whole lock
    /// scope of the algorithm.
    pub fn check(&self, identity: &str, path: &str) -> RateDecision {
        let window = Duration::from_secs(self.config.window_secs);
        let now = Instant::now();

        let mut counter = self
            .windows
            .entry((identity.to_owned(), path.to_owned()))
            .or_insert_with(|| WindowCounter {
                count: 0,
                window_start: now,
            });

        if now.duration_since(counter.window_start) >= window {
            counter.window_start = now;
            counter.count = 0;
        }
        counter.count += 1;

        let elapsed = now.duration_since(counter.window_start);
        RateDecision {
            allowed: counter.count <= self.config.max_requests,
            current: counter.count,
            limit: self.config.max_requests,
            retry_after_secs: window.saturating_sub(elapsed).as_secs().max(1),
        }
    }

    /// Drop counters whose window has lapsed
    pub fn sweep(&self) {
        let window = Duration::from_secs(self.config.window_secs);
        self.windows
            .retain(|_, counter| counter.window_start.elapsed() < window);
    }

    /// Number of keys currently tracked
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Run `sweep` periodically until the handle is aborted
    pub fn spawn_sweeper(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let interval = Duration::from_secs(self.config.sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // the first tick completes immediately
            loop {
                ticker.tick().await;
                self.sweep();
                tracing::debug!(tracked = self.tracked_keys(), "rate limiter sweep done");
            }
        })
    }
}

/// Client identity for limiting: first forwarded-for hop when present, else
/// the peer address
#[must_use]
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let ip = first.trim();
            if !ip.is_empty() {
                return ip.to_owned();
            }
        }
    }

    peer.map_or_else(|| "unknown".to_owned(), |addr| addr.ip().to_string())
}

/// Axum middleware enforcing the limiter on every non-exempt route
pub async fn enforce(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let limiter = state.rate_limiter();
    if !limiter.config().enabled {
        return next.run(req).await;
    }

    let path = req.uri().path().to_owned();
    if limiter.is_exempt(&path) {
        return next.run(req).await;
    }

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|connect_info| connect_info.0);
    let identity = client_identity(req.headers(), peer);

    let decision = limiter.check(&identity, &path);
    if decision.allowed {
        return next.run(req).await;
    }

    tracing::warn!(
        identity = %identity,
        path = %path,
        current = decision.current,
        limit = decision.limit,
        "request rate limit exceeded"
    );
    reject(
        &path,
        &ApiError::too_many_requests("request rate limit exceeded", decision.retry_after_secs),
    )
}
