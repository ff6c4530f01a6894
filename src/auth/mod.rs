//! Authentication subsystem
//!
//! Token codec, request gateway, rate limiting and the login/refresh/logout
//! flows. Exposes the core data structures (`Principal`, `TokenPair`);
//! implementation details stay behind the submodule paths.

pub mod gateway;
pub mod rate_limit;
pub mod service;
pub mod token;
pub mod types;

pub use types::{Principal, Role, TokenPair};
