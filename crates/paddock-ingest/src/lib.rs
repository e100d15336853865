//! Paddock Ingest Library
//!
//! Batch ingestion of Formula 1 results from an Ergast-compatible API into a
//! relational store.
//!
//! # Stages
//!
//! - **Extract**: paginated, rate-limited fetches staged as raw CSV
//! - **Transform**: reference resolution and field normalization, staged as processed CSV
//! - **Load**: full table replacement in the sink (SQLite)
//!
//! # Example
//!
//! ```no_run
//! use paddock_ingest::{IngestConfig, Pipeline, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::new(IngestConfig::from_env()?)?;
//!     let summary = pipeline.run(RunOptions::default()).await?;
//!     println!("clean run: {}", summary.is_clean());
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod load;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod resolve;
pub mod sink;
pub mod staging;
pub mod transform;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use models::Entity;
pub use pipeline::{Pipeline, RunOptions, RunSummary, StageReport};
pub use sink::{Sink, SqliteSink, Table};
