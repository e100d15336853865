//! Paddock Common Library
//!
//! Shared error handling and logging setup for the Paddock workspace.
//!
//! # Overview
//!
//! - **Error Handling**: the workspace-wide error type and result alias
//! - **Logging**: tracing subscriber configuration (console, rolling file, JSON)
//!
//! # Example
//!
//! ```no_run
//! use paddock_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&LogConfig::from_env()?)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;

pub use error::{PaddockError, Result};
