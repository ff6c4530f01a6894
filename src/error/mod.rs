//! The unified error handling system for the application.

pub mod macros;
pub mod types;

pub use types::ApiError;

/// A unified `Result` type for the entire application.
///
/// All functions that can fail should return this type.
pub type Result<T> = std::result::Result<T, ApiError>;
