//! End-to-end orchestration: extract, transform, load
//!
//! Each stage hands the next one nothing but files in the staging area, so any
//! stage can be skipped and rerun on its own.

use crate::config::IngestConfig;
use crate::error::Result;
use crate::extract::Extractor;
use crate::fetcher::ApiClient;
use crate::load::Loader;
use crate::models::Entity;
use crate::sink::{Sink, SqliteSink};
use crate::staging::Staging;
use crate::transform::Transformer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{info, warn};

/// Per-entity outcome of one stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub counts: BTreeMap<Entity, usize>,
    pub failures: BTreeMap<Entity, String>,
}

impl StageReport {
    pub fn record(&mut self, entity: Entity, outcome: Result<usize>) {
        match outcome {
            Ok(rows) => {
                self.counts.insert(entity, rows);
            },
            Err(e) => self.fail(entity, e.to_string()),
        }
    }

    pub fn fail(&mut self, entity: Entity, message: impl Into<String>) {
        self.failures.insert(entity, message.into());
    }

    pub fn rows(&self, entity: Entity) -> Option<usize> {
        self.counts.get(&entity).copied()
    }

    pub fn total_rows(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Stages to skip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub skip_extract: bool,
    pub skip_transform: bool,
    pub skip_load: bool,
}

/// Reports of the stages that ran
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub extract: Option<StageReport>,
    pub transform: Option<StageReport>,
    pub load: Option<StageReport>,
    pub elapsed_secs: f64,
}

impl RunSummary {
    /// Whether every stage that ran finished without entity failures
    pub fn is_clean(&self) -> bool {
        [&self.extract, &self.transform, &self.load]
            .into_iter()
            .flatten()
            .all(StageReport::is_clean)
    }
}

pub struct Pipeline {
    config: IngestConfig,
    staging: Staging,
}

impl Pipeline {
    pub fn new(config: IngestConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            staging: Staging::new(&config.staging),
            config,
        })
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn staging(&self) -> &Staging {
        &self.staging
    }

    /// Run the selected stages against the configured SQLite database
    pub async fn run(&self, options: RunOptions) -> Result<RunSummary> {
        if options.skip_load {
            return self.run_with_sink::<SqliteSink>(options, None).await;
        }

        let sink = SqliteSink::connect(&self.config.database.url).await?;
        let summary = self.run_with_sink(options, Some(&sink)).await;
        sink.close().await;
        summary
    }

    /// Run the selected stages, loading into `sink` when given
    pub async fn run_with_sink<S: Sink + ?Sized>(
        &self,
        options: RunOptions,
        sink: Option<&S>,
    ) -> Result<RunSummary> {
        let started = Instant::now();
        let mut summary = RunSummary::default();

        info!(
            start_year = self.config.extraction.start_year,
            end_year = self.config.extraction.end_year,
            raw_dir = %self.config.staging.raw_dir.display(),
            processed_dir = %self.config.staging.processed_dir.display(),
            "Starting pipeline"
        );

        if options.skip_extract {
            info!("Skipping extraction");
        } else {
            let client = ApiClient::new(self.config.api.clone())?;
            let extractor = Extractor::new(&client, &self.staging, &self.config.extraction);
            summary.extract = Some(extractor.extract_all().await);
        }

        if options.skip_transform {
            info!("Skipping transformation");
        } else {
            summary.transform = Some(Transformer::new(&self.staging).transform_all());
        }

        match (options.skip_load, sink) {
            (true, _) => info!("Skipping load"),
            (false, Some(sink)) => {
                summary.load = Some(Loader::new(&self.staging, sink).load_all().await?);
            },
            (false, None) => warn!("No sink configured, skipping load"),
        }

        summary.elapsed_secs = started.elapsed().as_secs_f64();
        info!(
            elapsed_secs = summary.elapsed_secs,
            clean = summary.is_clean(),
            "Pipeline finished"
        );
        Ok(summary)
    }
}
