//! Error types for the Christos engine
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// Main error type for the Christos engine
#[derive(Error, Debug)]
pub enum ChristosError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the Christos engine
pub type Result<T> = std::result::Result<T, ChristosError>;
