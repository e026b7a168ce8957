//! Typed error handling for list queries
//!
//! Errors are grouped by where they originate so that the HTTP layer can map
//! them to a status code without inspecting messages.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: the caller sent a filter or body the engine refuses
//! - [`RequestError`]: request-level failures, including authorization errors
//!   raised by collaborators in front of the engine
//! - [`StorageError`]: failures reported by a record store
//! - [`ConfigError`]: configuration parsing and validation
//!
//! # Example
//!
//! ```rust,ignore
//! match engine.query(&store, &request).await {
//!     Ok(page) => Json(page).into_response(),
//!     Err(QueryError::Validation(e)) => eprintln!("bad request: {}", e),
//!     Err(e) => return e.into_response(),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type for list queries
#[derive(Debug, Error)]
pub enum QueryError {
    /// Input validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// HTTP/Request errors
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Record store errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Internal errors (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl QueryError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            QueryError::Validation(_) => StatusCode::BAD_REQUEST,
            QueryError::Request(e) => e.status_code(),
            QueryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            QueryError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            QueryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::Validation(_) => "VALIDATION_ERROR",
            QueryError::Request(e) => e.error_code(),
            QueryError::Storage(_) => "STORAGE_ERROR",
            QueryError::Config(_) => "CONFIG_ERROR",
            QueryError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            QueryError::Validation(ValidationError::InvalidFilterField { field }) => {
                Some(serde_json::json!({ "field": field }))
            }
            QueryError::Validation(ValidationError::InvalidFilterValue { field, message }) => {
                Some(serde_json::json!({ "field": field, "reason": message }))
            }
            QueryError::Request(RequestError::CollectionNotFound { collection }) => {
                Some(serde_json::json!({ "collection": collection }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Filter on a field outside the collection's allow-list
    #[error("Invalid filter field: {field}")]
    InvalidFilterField { field: String },

    /// Filter operand does not fit the field's declared kind
    #[error("Invalid value for filter field '{field}': {message}")]
    InvalidFilterValue { field: String, message: String },

    /// Invalid JSON format
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
///
/// Authorization variants are never produced by the engine itself; they are
/// carried through unchanged when a collaborator raises them.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Invalid request body
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// Unauthorized request
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Forbidden operation
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// No collection registered under this name
    #[error("Collection '{collection}' not found")]
    CollectionNotFound { collection: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RequestError::CollectionNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
            RequestError::Forbidden { .. } => "FORBIDDEN",
            RequestError::CollectionNotFound { .. } => "COLLECTION_NOT_FOUND",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to record stores
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection error
    #[error("Failed to connect to {backend}: {message}")]
    ConnectionError { backend: String, message: String },

    /// Query execution error
    #[error("{backend} query error: {message}")]
    QueryError { backend: String, message: String },

    /// A lock guarding in-process data was poisoned
    #[error("Lock poisoned: {message}")]
    LockPoisoned { message: String },

    /// Backend not available
    #[error("Storage backend '{backend}' is unavailable")]
    Unavailable { backend: String },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config{}: {message}", .file.as_ref().map(|f| format!(" file '{}'", f)).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for QueryError {
    fn from(err: serde_yaml::Error) -> Self {
        QueryError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for QueryError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<QueryError>() {
            Ok(query_err) => query_err,
            Err(other) => QueryError::Internal(other.to_string()),
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

// =============================================================================
// Tests
// =============================================================================
