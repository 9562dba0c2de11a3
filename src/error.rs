//! Error types for the SEO optimizer.

use thiserror::Error;

use crate::llm::LlmError;

/// Result type alias for optimizer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for optimizer operations
#[derive(Debug, Error)]
pub enum Error {
    /// Optimization run failed
    #[error("Failed to optimize SEO content: {0}")]
    Optimization(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Content record not found
    #[error("Content not found: {0}")]
    NotFound(String),

    /// Field validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Content store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Error::Validation(errors.to_string())
    }
}
