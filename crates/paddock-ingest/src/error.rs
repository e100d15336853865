//! Error types for the ingestion pipeline
//!
//! Most upstream problems never surface as errors: transport failures and malformed
//! payloads degrade to partial results inside the fetcher, and unresolved references
//! degrade to the sentinel id. What remains here are failures that end one entity's
//! stage (missing staged input, unreadable CSV) or the whole run (sink connectivity).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Staged input not found: {}", .0.display())]
    MissingStage(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error(transparent)]
    Common(#[from] paddock_common::PaddockError),
}

impl IngestError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    /// Whether the failure happened at the storage boundary and should end the run
    pub fn is_run_fatal(&self) -> bool {
        matches!(self, IngestError::Database(_) | IngestError::Sink(_))
    }
}
