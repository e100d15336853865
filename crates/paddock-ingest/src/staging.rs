//! CSV staging area
//!
//! Extraction writes one file per entity under the raw directory, transformation
//! reads those and writes the processed directory, and loading reads the processed
//! files. Files are rewritten in full on every run.

use crate::config::StagingConfig;
use crate::error::{IngestError, Result};
use crate::models::Entity;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Raw,
    Processed,
}

#[derive(Debug, Clone)]
pub struct Staging {
    raw_dir: PathBuf,
    processed_dir: PathBuf,
}

impl Staging {
    pub fn new(config: &StagingConfig) -> Self {
        Self {
            raw_dir: config.raw_dir.clone(),
            processed_dir: config.processed_dir.clone(),
        }
    }

    pub fn dir(&self, stage: Stage) -> &Path {
        match stage {
            Stage::Raw => &self.raw_dir,
            Stage::Processed => &self.processed_dir,
        }
    }

    pub fn path(&self, stage: Stage, entity: Entity) -> PathBuf {
        self.dir(stage).join(entity.file_name())
    }

    /// Replace the staged file of `entity` with `rows`
    ///
    /// An empty slice produces an empty file, which reads back as zero rows.
    pub fn write<T: Serialize>(&self, stage: Stage, entity: Entity, rows: &[T]) -> Result<PathBuf> {
        std::fs::create_dir_all(self.dir(stage))?;
        let path = self.path(stage, entity);

        let mut writer = csv::Writer::from_path(&path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        debug!(path = %path.display(), rows = rows.len(), "Wrote staged file");
        Ok(path)
    }

    /// Read the staged file of `entity`
    ///
    /// Fails with [`IngestError::MissingStage`] when the file does not exist.
    pub fn read<T: DeserializeOwned>(&self, stage: Stage, entity: Entity) -> Result<Vec<T>> {
        let path = self.path(stage, entity);
        if !path.exists() {
            return Err(IngestError::MissingStage(path));
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let rows = reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;

        debug!(path = %path.display(), rows = rows.len(), "Read staged file");
        Ok(rows)
    }
}
