//! Transformation: raw staging files to processed staging files
//!
//! Entities are transformed independently. A failing entity (missing input,
//! unreadable CSV, missing reference table) is logged, gets an empty processed
//! file so that later stages see "no rows" rather than stale data, and does not
//! stop the others.

use crate::error::Result;
use crate::models::{
    CircuitRow, ConstructorRow, ConstructorStandingRow, DriverRow, DriverStandingRow, Entity,
    PitStopRow, QualifyingRow, RaceRow, ResultRow, Season,
};
use crate::normalize::entities;
use crate::pipeline::StageReport;
use crate::resolve::{Lookup, ReferenceRow};
use crate::staging::{Stage, Staging};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info};

/// Transformation order; reference tables come first
pub const TRANSFORM_ORDER: [Entity; 10] = [
    Entity::Circuits,
    Entity::Constructors,
    Entity::Drivers,
    Entity::Seasons,
    Entity::Races,
    Entity::Results,
    Entity::Qualifying,
    Entity::PitStops,
    Entity::ConstructorStandings,
    Entity::DriverStandings,
];

pub struct Transformer<'a> {
    staging: &'a Staging,
}

impl<'a> Transformer<'a> {
    pub fn new(staging: &'a Staging) -> Self {
        Self { staging }
    }

    pub fn transform_all(&self) -> StageReport {
        let mut report = StageReport::default();
        info!("Starting transformation");

        for entity in TRANSFORM_ORDER {
            let outcome = self.transform(entity);
            if let Err(ref e) = outcome {
                error!(entity = %entity, error = %e, "Transformation failed, writing empty output");
                if let Err(write_err) = self.clear(entity) {
                    error!(entity = %entity, error = %write_err, "Could not clear processed output");
                }
            }
            report.record(entity, outcome);
        }

        info!(rows = report.total_rows(), failed = report.failures.len(), "Transformation finished");
        report
    }

    /// Transform one entity and write its processed file
    pub fn transform(&self, entity: Entity) -> Result<usize> {
        let count = match entity {
            Entity::Circuits => self.write(entity, &entities::circuits(self.raw(entity)?))?,
            Entity::Constructors => self.write(entity, &entities::constructors(self.raw(entity)?))?,
            Entity::Drivers => self.write(entity, &entities::drivers(self.raw(entity)?))?,
            Entity::Seasons => self.write(entity, &self.raw::<Season>(entity)?)?,
            Entity::Races => {
                let rows: Vec<RaceRow> = self.raw(entity)?;
                let circuits = self.lookup::<CircuitRow>(Entity::Circuits)?;
                self.write(entity, &entities::races(rows, &circuits))?
            },
            Entity::Results => {
                let rows: Vec<ResultRow> = self.raw(entity)?;
                let drivers = self.lookup::<DriverRow>(Entity::Drivers)?;
                let constructors = self.lookup::<ConstructorRow>(Entity::Constructors)?;
                self.write(entity, &entities::results(rows, &drivers, &constructors))?
            },
            Entity::Qualifying => {
                let rows: Vec<QualifyingRow> = self.raw(entity)?;
                let drivers = self.lookup::<DriverRow>(Entity::Drivers)?;
                let constructors = self.lookup::<ConstructorRow>(Entity::Constructors)?;
                self.write(entity, &entities::qualifying(rows, &drivers, &constructors))?
            },
            Entity::PitStops => {
                let rows: Vec<PitStopRow> = self.raw(entity)?;
                let drivers = self.lookup::<DriverRow>(Entity::Drivers)?;
                self.write(entity, &entities::pit_stops(rows, &drivers))?
            },
            Entity::ConstructorStandings => {
                let rows: Vec<ConstructorStandingRow> = self.raw(entity)?;
                let constructors = self.lookup::<ConstructorRow>(Entity::Constructors)?;
                self.write(entity, &entities::constructor_standings(rows, &constructors))?
            },
            Entity::DriverStandings => {
                let rows: Vec<DriverStandingRow> = self.raw(entity)?;
                let drivers = self.lookup::<DriverRow>(Entity::Drivers)?;
                self.write(entity, &entities::driver_standings(rows, &drivers))?
            },
        };

        info!(entity = %entity, rows = count, "Transformed");
        Ok(count)
    }

    fn raw<T: DeserializeOwned>(&self, entity: Entity) -> Result<Vec<T>> {
        self.staging.read(Stage::Raw, entity)
    }

    /// Lookup over a raw reference table, built the same way its clean ids are
    fn lookup<R: ReferenceRow + DeserializeOwned>(&self, entity: Entity) -> Result<Lookup> {
        let rows: Vec<R> = self.raw(entity)?;
        Ok(Lookup::build(&rows))
    }

    fn write<T: Serialize>(&self, entity: Entity, rows: &[T]) -> Result<usize> {
        self.staging.write(Stage::Processed, entity, rows)?;
        Ok(rows.len())
    }

    fn clear(&self, entity: Entity) -> Result<()> {
        // Element type is irrelevant for an empty file
        self.staging.write::<Season>(Stage::Processed, entity, &[])?;
        Ok(())
    }
}

/// Typed read of a processed file, used by the loader
pub fn read_processed<T: DeserializeOwned>(staging: &Staging, entity: Entity) -> Result<Vec<T>> {
    staging.read(Stage::Processed, entity)
}
