//! Error types for refdesk.
//!
//! This module defines a unified error enum that covers all error
//! categories in the application: configuration, I/O, document ingestion,
//! model gateway failures, and the not-initialized precondition.

use thiserror::Error;

/// Unified error type for refdesk.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document unreachable or unparsable during indexing
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// A query arrived before the index was built
    #[error("Assistant not initialized: build the document index first")]
    NotInitialized,

    /// Model provider returned a non-success status or transport failure
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Model call exceeded the configured deadline
    #[error("Model call timed out: {0}")]
    ModelTimeout(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl AppError {
    /// Whether the error came from the model gateway.
    pub fn is_model_error(&self) -> bool {
        matches!(
            self,
            AppError::ModelUnavailable(_) | AppError::ModelTimeout(_)
        )
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
