//! Core error types for lifestream-core.
//!
//! Errors are grouped per concern and folded into [`CoreError`] at the
//! crate boundary. Delivery-channel and persistence failures are handled
//! where they occur and logged; nothing in this crate is fatal to the
//! process.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lifestream-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Event or settings validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Language-model extraction errors
    #[error("Assistant error: {0}")]
    Assistant(#[from] AssistantError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Event title is empty or whitespace
    #[error("Event title must not be empty")]
    EmptyTitle,

    /// End precedes start
    #[error("Invalid time range: end ({end}) must not precede start ({start})")]
    InvalidTimeRange {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// Invalid value for a named field
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Persistence errors.
///
/// Save failures are logged and swallowed at the storage boundary; these
/// variants surface only where a caller explicitly asks to open the store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read a blob
    #[error("Failed to load {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to write a blob
    #[error("Failed to save {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Blob exists but cannot be parsed
    #[error("Failed to parse {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },
}

/// Language-model extraction errors.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// HTTP transport or status failure
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Completion arrived without any message content
    #[error("Model response missing content")]
    MissingContent,

    /// Content was not the expected JSON contract
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
