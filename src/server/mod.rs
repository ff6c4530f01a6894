//! HTTP surface
//!
//! Router, endpoint handlers, the shared error envelope and server
//! assembly.

pub mod handlers;
pub mod response;
pub mod routes;
pub mod server;

pub use server::{AppContext, AppState, HttpServer};
