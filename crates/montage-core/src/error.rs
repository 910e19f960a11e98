//! Error types for Montage.

use thiserror::Error;

/// Main error type for Montage data handling.
#[derive(Error, Debug)]
pub enum MontageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for Montage operations.
pub type Result<T> = std::result::Result<T, MontageError>;
