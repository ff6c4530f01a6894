//! Error construction macros

/// Quick constructor for unauthorized errors
#[macro_export]
macro_rules! unauthorized_error {
    ($msg:expr) => {
        $crate::error::ApiError::unauthorized($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::ApiError::unauthorized(format!($fmt, $($arg)*))
    };
}

/// Quick constructor for forbidden errors
#[macro_export]
macro_rules! forbidden_error {
    ($msg:expr) => {
        $crate::error::ApiError::forbidden($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::ApiError::forbidden(format!($fmt, $($arg)*))
    };
}

/// Quick constructor for bad-request errors
#[macro_export]
macro_rules! bad_request_error {
    ($msg:expr) => {
        $crate::error::ApiError::bad_request($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::ApiError::bad_request(format!($fmt, $($arg)*))
    };
}

/// Quick constructor for session-store errors
#[macro_export]
macro_rules! session_store_error {
    ($msg:expr) => {
        $crate::error::ApiError::session_store($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::ApiError::session_store(format!($fmt, $($arg)*))
    };
}

/// Quick constructor for configuration errors
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::error::ApiError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::ApiError::config(format!($fmt, $($arg)*))
    };
}
