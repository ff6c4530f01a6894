//! # Bookstore API Library
//!
//! Online bookstore REST backend. This crate carries the authentication and
//! session subsystem - token issuance and verification, refresh rotation,
//! revocation, the per-request gateway and the edge rate limiter - plus the
//! HTTP surface it guards. Catalog/cart/order handlers live in sibling
//! services and only consume the principal installed here.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;
pub mod session;
pub mod users;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{ApiError, Result};
