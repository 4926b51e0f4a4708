//! # Error Handling
//!
//! This module defines custom error types and how they're converted to HTTP responses.
//! This is a great example of Rust's powerful error handling system.
//!
//! ## Key Rust Concepts for Error Handling:
//!
//! ### Result<T, E> Type
//! - **Purpose**: Forces you to handle both success and failure cases
//! - **T**: The success type (what you get when everything works)
//! - **E**: The error type (what you get when something goes wrong)
//! - **No exceptions**: Rust doesn't have try/catch, it uses Result instead
//!
//! ### Enums for Error Types
//! - **Variants**: Each enum variant represents a different kind of error
//! - **Data**: Each variant can hold additional information (String, numbers, etc.)
//! - **Pattern matching**: Use `match` to handle different error types
//!
//! ### Traits for Error Conversion
//! - **From trait**: Automatically converts between error types
//! - **ResponseError trait**: Converts errors to HTTP responses
//! - **Display trait**: Defines how errors are formatted as strings
//!
//! ## Status code policy:
//! Callers need to distinguish "your request was bad" from "the service is
//! misconfigured", so each variant maps to its own status code rather than
//! collapsing everything into one.

use actix_web::{HttpResponse, ResponseError};  // Web framework error handling
use serde_json::json;                          // For creating JSON error responses
use std::fmt;                                  // For implementing Display trait

/// Custom error types for the application.
///
/// ## Rust Concepts:
/// - **enum**: A type that can be one of several variants
/// - **String**: Each variant holds an error message
/// - **#[derive(Debug)]**: Automatically implements debug printing
///
/// ## Error Categories:
/// - **Unauthorized**: Missing or rejected bearer credential (401 errors)
/// - **InvalidRequest**: Malformed or missing room identifier (422 errors)
/// - **ConfigError**: Signing secret or other configuration unavailable (500 errors)
/// - **Encoding**: The audio codec received non-finite samples or the
///   binary-to-text step failed (500 errors)
/// - **Internal**: Unexpected server-side problems (500 errors)
///
/// ## Usage Example:
/// ```rust
/// # use voice_room_backend::error::AppError;
/// # fn example() -> Result<(), AppError> {
/// return Err(AppError::InvalidRequest("roomId must not be empty".to_string()));
/// # }
/// ```
#[derive(Debug)]
pub enum AppError {
    /// Bearer credential missing, malformed, or rejected by the identity provider
    Unauthorized(String),

    /// Client sent a request the flow cannot act on (e.g., empty roomId)
    InvalidRequest(String),

    /// Signing secret or other required configuration is unavailable
    ConfigError(String),

    /// Audio sample encoding failed (non-finite input or transport encoding failure)
    Encoding(String),

    /// Unexpected internal failures
    Internal(String),
}

/// Implementation of the Display trait for AppError.
///
/// ## Purpose:
/// This trait defines how errors are formatted as human-readable strings.
/// It's used when you print an error or convert it to a string.
///
/// ## Rust Concepts:
/// - **impl Trait for Type**: Implementing a trait for our custom type
/// - **match**: Pattern matching to handle each error variant
/// - **write!**: Macro for formatting strings (like printf in C)
/// - **&self**: Immutable reference to the error
impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Encoding(msg) => write!(f, "Encoding error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

/// Implementation of the ResponseError trait for AppError.
///
/// ## Purpose:
/// This trait converts our custom errors into HTTP responses that clients can understand.
/// It automatically handles the conversion when an error is returned from a handler.
///
/// ## HTTP Status Code Mapping:
/// - Unauthorized → 401 (the caller's credential is the problem)
/// - InvalidRequest → 422 (the caller's input is the problem)
/// - ConfigError/Encoding/Internal → 500 (the service is the problem)
///
/// ## JSON Response Format:
/// All errors return JSON with a consistent structure:
/// ```json
/// {
///   "error": {
///     "type": "invalid_request",
///     "message": "roomId must not be empty",
///     "timestamp": "2025-01-01T12:00:00Z"
///   }
/// }
/// ```
///
/// ## Rust Concepts:
/// - **Tuple destructuring**: `let (a, b, c) = tuple`
/// - **json! macro**: Creates JSON values easily
/// - **StatusCode enum**: HTTP status codes as type-safe values
/// - **.clone()**: Creates a copy of the error message string
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        // Map each error type to HTTP status code, error type, and message
        let (status, error_type, message) = match self {
            AppError::Unauthorized(msg) => (
                actix_web::http::StatusCode::UNAUTHORIZED,  // 401
                "unauthorized",
                msg.clone(),
            ),
            AppError::InvalidRequest(msg) => (
                actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,  // 422
                "invalid_request",
                msg.clone(),
            ),
            AppError::ConfigError(msg) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,  // 500
                "config_error",
                msg.clone(),
            ),
            AppError::Encoding(msg) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,  // 500
                "encoding_error",
                msg.clone(),
            ),
            AppError::Internal(msg) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,  // 500
                "internal_error",
                msg.clone(),
            ),
        };

        // Build the HTTP response with JSON body
        HttpResponse::build(status).json(json!({
            "error": {
                "type": error_type,           // Machine-readable error type
                "message": message,           // Human-readable error message
                "timestamp": chrono::Utc::now().to_rfc3339()  // When the error occurred
            }
        }))
    }
}

/// Automatic conversion from anyhow::Error to AppError.
///
/// ## Purpose:
/// The anyhow crate provides general-purpose error handling. This conversion
/// allows us to use anyhow errors throughout the codebase and automatically
/// convert them to our custom error type when needed.
///
/// ## Rust Concepts:
/// - **From trait**: Enables automatic conversion with `.into()` or `?`
/// - **Self**: Refers to AppError (the type we're implementing for)
/// - **.to_string()**: Converts the error to a string representation
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Automatic conversion from JSON parsing errors to AppError.
///
/// ## Why InvalidRequest:
/// JSON parsing errors are almost always due to the client sending malformed data,
/// so they should result in a 422 response, not a 500 (Internal Server Error).
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidRequest(format!("JSON parsing error: {}", err))
    }
}

/// Automatic conversion from configuration errors to AppError.
///
/// ## When this happens:
/// - config.toml file has invalid syntax
/// - Required environment variables are missing
/// - Configuration values fail validation
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

/// Type alias for Results that use our custom error type.
///
/// ## Purpose:
/// This creates a shorthand for `Result<T, AppError>` so you can write
/// `AppResult<String>` instead of `Result<String, AppError>`.
///
/// ## Rust Concepts:
/// - **type alias**: Creates a new name for an existing type
/// - **Generic type**: `T` can be any type (String, AppConfig, etc.)
pub type AppResult<T> = Result<T, AppError>;
