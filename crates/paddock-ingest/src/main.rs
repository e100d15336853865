//! Paddock Ingest - F1 results pipeline

use anyhow::{Context, Result};
use clap::Parser;
use paddock_common::logging::{init_logging, LogConfig, LogLevel};
use paddock_ingest::{IngestConfig, Pipeline, RunOptions, StageReport};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "paddock-ingest")]
#[command(author, version, about = "Extract, transform and load F1 results")]
struct Cli {
    /// First season to extract
    #[arg(long, env = "PADDOCK_START_YEAR")]
    start_year: Option<i32>,

    /// Last season to extract (inclusive)
    #[arg(long, env = "PADDOCK_END_YEAR")]
    end_year: Option<i32>,

    /// Directory for raw staging files
    #[arg(long)]
    raw_dir: Option<PathBuf>,

    /// Directory for processed staging files
    #[arg(long)]
    processed_dir: Option<PathBuf>,

    /// SQLite database URL, e.g. sqlite://f1_analytics.db
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Reuse existing raw files instead of calling the API
    #[arg(long)]
    skip_extract: bool,

    /// Reuse existing processed files
    #[arg(long)]
    skip_transform: bool,

    /// Stop after the processed files are written
    #[arg(long)]
    skip_load: bool,

    /// Verbose output; takes precedence over LOG_LEVEL
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Result<IngestConfig> {
        let mut config = IngestConfig::from_env().context("Invalid environment configuration")?;

        if let Some(year) = self.start_year {
            config.extraction.start_year = year;
        }
        if let Some(year) = self.end_year {
            config.extraction.end_year = year;
        }
        if let Some(ref dir) = self.raw_dir {
            config.staging.raw_dir = dir.clone();
        }
        if let Some(ref dir) = self.processed_dir {
            config.staging.processed_dir = dir.clone();
        }
        if let Some(ref url) = self.database_url {
            config.database.url = url.clone();
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Logging from LOG_* variables, with `--verbose` overriding the level
    fn log_config(&self) -> Result<LogConfig> {
        let config = LogConfig::builder()
            .log_file_prefix("paddock-ingest")
            .build()
            .merge_env()?;
        Ok(self.apply_verbosity(config))
    }

    fn apply_verbosity(&self, mut config: LogConfig) -> LogConfig {
        if self.verbose {
            config.level = LogLevel::Debug;
        }
        config
    }

    fn options(&self) -> RunOptions {
        RunOptions {
            skip_extract: self.skip_extract,
            skip_transform: self.skip_transform,
            skip_load: self.skip_load,
        }
    }
}

fn log_stage(stage: &str, report: &StageReport) {
    for (entity, rows) in &report.counts {
        info!(stage, entity = %entity, rows, "Stage result");
    }
    for (entity, reason) in &report.failures {
        warn!(stage, entity = %entity, reason = %reason, "Stage failure");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = init_logging(&cli.log_config()?)?;

    let config = cli.config()?;
    let pipeline = Pipeline::new(config)?;

    let summary = match pipeline.run(cli.options()).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Pipeline aborted");
            return Err(e.into());
        },
    };

    for (stage, report) in [
        ("extract", &summary.extract),
        ("transform", &summary.transform),
        ("load", &summary.load),
    ] {
        if let Some(report) = report {
            log_stage(stage, report);
        }
    }

    if summary.is_clean() {
        info!(elapsed_secs = summary.elapsed_secs, "Pipeline complete");
    } else {
        warn!(
            elapsed_secs = summary.elapsed_secs,
            "Pipeline complete with failed entities"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_level(level: LogLevel) -> LogConfig {
        LogConfig::builder().level(level).build()
    }

    #[test]
    fn test_verbose_flag_overrides_env_level() {
        let cli = Cli::parse_from(["paddock-ingest", "--verbose"]);
        let config = cli.apply_verbosity(env_level(LogLevel::Warn));
        assert_eq!(config.level, LogLevel::Debug);
    }

    #[test]
    fn test_env_level_kept_without_flag() {
        let cli = Cli::parse_from(["paddock-ingest", "--skip-load"]);
        let config = cli.apply_verbosity(env_level(LogLevel::Warn));
        assert_eq!(config.level, LogLevel::Warn);
        assert!(cli.options().skip_load);
    }
}
