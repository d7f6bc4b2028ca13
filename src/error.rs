//! Error types for signloop
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation. Playback and version-check failures are deliberately not
//! represented here: they are absorbed and logged where they occur and
//! never surface to a caller.

use thiserror::Error;

/// Main error type for signloop
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using signloop Error
pub type Result<T> = std::result::Result<T, Error>;
