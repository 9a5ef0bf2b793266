//! Errors of the application shell.

use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Usage: {0}")]
    Usage(String),
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
