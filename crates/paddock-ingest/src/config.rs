//! Ingestion configuration
//!
//! One [`IngestConfig`] value is built at startup and handed to every component.
//! Nothing below reads the environment after construction, so several pipelines can
//! run side by side in one process (tests do exactly that).

use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Defaults
// ============================================================================

/// Ergast-compatible API mirror.
pub const DEFAULT_API_BASE_URL: &str = "https://api.jolpi.ca/ergast/f1";

/// Minimum delay between two requests, in milliseconds.
pub const DEFAULT_RATE_LIMIT_DELAY_MS: u64 = 500;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Extra attempts after the first failed request of a page.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1_000;

pub const DEFAULT_START_YEAR: i32 = 2005;

pub const DEFAULT_END_YEAR: i32 = 2024;

/// Pit stop timing is only published from this season onward.
pub const PIT_STOP_FIRST_YEAR: i32 = 2012;

/// Standings have no per-season endpoint; rounds 1..=N are probed one by one.
pub const DEFAULT_MAX_STANDINGS_ROUNDS: u32 = 24;

pub const DEFAULT_RAW_DIR: &str = "data/raw";

pub const DEFAULT_PROCESSED_DIR: &str = "data/processed";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://f1_analytics.db";

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IngestConfig {
    pub api: ApiConfig,
    pub extraction: ExtractionConfig,
    pub staging: StagingConfig,
    pub database: DatabaseConfig,
}

/// Upstream API access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub rate_limit_delay_ms: u64,
    pub timeout_secs: u64,
    pub page_size: u32,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

/// Which seasons are extracted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub start_year: i32,
    pub end_year: i32,
    pub pit_stop_first_year: i32,
    pub max_standings_rounds: u32,
}

/// Location of the CSV staging area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
}

/// Destination store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            rate_limit_delay_ms: DEFAULT_RATE_LIMIT_DELAY_MS,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            pit_stop_first_year: PIT_STOP_FIRST_YEAR,
            max_standings_rounds: DEFAULT_MAX_STANDINGS_ROUNDS,
        }
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Backoff before retry number `attempt` (1-based): base × 2^(attempt-1)
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor))
    }
}

impl ExtractionConfig {
    /// Inclusive season range
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.start_year..=self.end_year
    }

    /// Season range for pit stops, clipped to the first season with timing data
    pub fn pit_stop_years(&self) -> std::ops::RangeInclusive<i32> {
        self.start_year.max(self.pit_stop_first_year)..=self.end_year
    }
}

impl IngestConfig {
    /// Load configuration from `.env` and `PADDOCK_*` environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            api: ApiConfig {
                base_url: env_or("PADDOCK_API_BASE_URL", defaults.api.base_url),
                rate_limit_delay_ms: env_parse(
                    "PADDOCK_RATE_LIMIT_DELAY_MS",
                    defaults.api.rate_limit_delay_ms,
                ),
                timeout_secs: env_parse("PADDOCK_REQUEST_TIMEOUT_SECS", defaults.api.timeout_secs),
                page_size: env_parse("PADDOCK_PAGE_SIZE", defaults.api.page_size),
                max_retries: env_parse("PADDOCK_MAX_RETRIES", defaults.api.max_retries),
                retry_backoff_ms: env_parse(
                    "PADDOCK_RETRY_BACKOFF_MS",
                    defaults.api.retry_backoff_ms,
                ),
            },
            extraction: ExtractionConfig {
                start_year: env_parse("PADDOCK_START_YEAR", defaults.extraction.start_year),
                end_year: env_parse("PADDOCK_END_YEAR", defaults.extraction.end_year),
                pit_stop_first_year: env_parse(
                    "PADDOCK_PIT_STOP_FIRST_YEAR",
                    defaults.extraction.pit_stop_first_year,
                ),
                max_standings_rounds: env_parse(
                    "PADDOCK_MAX_STANDINGS_ROUNDS",
                    defaults.extraction.max_standings_rounds,
                ),
            },
            staging: StagingConfig {
                raw_dir: std::env::var("PADDOCK_RAW_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.staging.raw_dir),
                processed_dir: std::env::var("PADDOCK_PROCESSED_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.staging.processed_dir),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL").unwrap_or(defaults.database.url),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(IngestError::config("API base URL cannot be empty"));
        }
        if self.api.page_size == 0 {
            return Err(IngestError::config("Page size must be greater than 0"));
        }
        if self.api.timeout_secs == 0 {
            return Err(IngestError::config("Request timeout must be greater than 0"));
        }
        if self.extraction.start_year > self.extraction.end_year {
            return Err(IngestError::config(format!(
                "Start year ({}) cannot be after end year ({})",
                self.extraction.start_year, self.extraction.end_year
            )));
        }
        if self.database.url.trim().is_empty() {
            return Err(IngestError::config("Database URL cannot be empty"));
        }
        Ok(())
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
