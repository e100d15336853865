//! Loading: processed staging files to the sink
//!
//! Unlike the earlier stages, loading is all-or-nothing per run: a missing
//! processed file is skipped with a warning, but any sink error ends the run.

use crate::error::{IngestError, Result};
use crate::models::{
    Circuit, Constructor, ConstructorStanding, Driver, DriverStanding, Entity, PitStop,
    Qualifying, Race, RaceResult, Season,
};
use crate::pipeline::StageReport;
use crate::sink::{Sink, Table, TableRow};
use crate::staging::Staging;
use crate::transform::read_processed;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

/// Load order; reference tables before the tables pointing at them
pub const LOAD_ORDER: [Entity; 10] = [
    Entity::Seasons,
    Entity::Circuits,
    Entity::Constructors,
    Entity::Drivers,
    Entity::Races,
    Entity::Results,
    Entity::Qualifying,
    Entity::PitStops,
    Entity::ConstructorStandings,
    Entity::DriverStandings,
];

pub struct Loader<'a, S: Sink + ?Sized> {
    staging: &'a Staging,
    sink: &'a S,
}

impl<'a, S: Sink + ?Sized> Loader<'a, S> {
    pub fn new(staging: &'a Staging, sink: &'a S) -> Self {
        Self { staging, sink }
    }

    /// Load every processed table, stopping at the first sink error
    pub async fn load_all(&self) -> Result<StageReport> {
        let mut report = StageReport::default();
        info!("Starting load");

        for entity in LOAD_ORDER {
            let table = match self.table(entity) {
                Ok(table) => table,
                Err(IngestError::MissingStage(path)) => {
                    warn!(entity = %entity, path = %path.display(), "No processed file, skipping");
                    report.fail(entity, format!("missing {}", path.display()));
                    continue;
                },
                Err(e) => {
                    warn!(entity = %entity, error = %e, "Unreadable processed file, skipping");
                    report.fail(entity, e.to_string());
                    continue;
                },
            };

            let written = self.sink.load(&table).await?;
            report.record(entity, Ok(written as usize));
        }

        info!(rows = report.total_rows(), "Load finished");
        Ok(report)
    }

    /// Read the processed file of `entity` as a sink table
    pub fn table(&self, entity: Entity) -> Result<Table> {
        match entity {
            Entity::Seasons => self.read::<Season>(entity),
            Entity::Circuits => self.read::<Circuit>(entity),
            Entity::Constructors => self.read::<Constructor>(entity),
            Entity::Drivers => self.read::<Driver>(entity),
            Entity::Races => self.read::<Race>(entity),
            Entity::Results => self.read::<RaceResult>(entity),
            Entity::Qualifying => self.read::<Qualifying>(entity),
            Entity::PitStops => self.read::<PitStop>(entity),
            Entity::ConstructorStandings => self.read::<ConstructorStanding>(entity),
            Entity::DriverStandings => self.read::<DriverStanding>(entity),
        }
    }

    fn read<T: TableRow + DeserializeOwned>(&self, entity: Entity) -> Result<Table> {
        let rows: Vec<T> = read_processed(self.staging, entity)?;
        Ok(Table::from_rows(&rows))
    }
}
