//! Error types shared across Paddock crates

use thiserror::Error;

/// Result type alias for Paddock operations
pub type Result<T> = std::result::Result<T, PaddockError>;

/// Errors that are not specific to one pipeline stage
#[derive(Error, Debug)]
pub enum PaddockError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl PaddockError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
