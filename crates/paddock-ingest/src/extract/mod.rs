//! Extraction: upstream API to raw staging files
//!
//! Each entity is fetched in full, mapped to its raw row shape and written to the
//! raw staging directory. Mapping is done by pure functions in the submodules; the
//! [`Extractor`] only sequences requests and writes files.

pub mod events;
pub mod reference;
pub mod standings;

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::fetcher::ApiClient;
use crate::models::Entity;
use crate::pipeline::StageReport;
use crate::staging::{Stage, Staging};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

pub const CIRCUIT_TABLE: &str = "CircuitTable";
pub const SEASON_TABLE: &str = "SeasonTable";
pub const CONSTRUCTOR_TABLE: &str = "ConstructorTable";
pub const DRIVER_TABLE: &str = "DriverTable";
pub const RACE_TABLE: &str = "RaceTable";
pub const STANDINGS_TABLE: &str = "StandingsTable";

/// Decode upstream records, skipping the ones that do not fit `T`
pub fn decode_records<T: DeserializeOwned>(records: Vec<Value>, entity: Entity) -> Vec<T> {
    let total = records.len();
    let decoded: Vec<T> = records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(entity = %entity, error = %e, "Skipping undecodable record");
                None
            },
        })
        .collect();

    if decoded.len() < total {
        warn!(
            entity = %entity,
            skipped = total - decoded.len(),
            total,
            "Skipped records that could not be decoded"
        );
    }
    decoded
}

/// Runs every extraction step against one API client
pub struct Extractor<'a> {
    client: &'a ApiClient,
    staging: &'a Staging,
    config: &'a ExtractionConfig,
}

impl<'a> Extractor<'a> {
    pub fn new(client: &'a ApiClient, staging: &'a Staging, config: &'a ExtractionConfig) -> Self {
        Self {
            client,
            staging,
            config,
        }
    }

    /// Extract every entity in dependency order
    ///
    /// A step that fails to stage its output is recorded and the remaining steps
    /// still run.
    pub async fn extract_all(&self) -> StageReport {
        let mut report = StageReport::default();
        info!(
            start_year = self.config.start_year,
            end_year = self.config.end_year,
            "Starting extraction"
        );

        report.record(Entity::Circuits, self.extract_circuits().await);
        report.record(Entity::Seasons, self.extract_seasons().await);
        report.record(Entity::Constructors, self.extract_constructors().await);
        report.record(Entity::Drivers, self.extract_drivers().await);
        report.record(Entity::Races, self.extract_races().await);
        report.record(Entity::Results, self.extract_results().await);
        report.record(Entity::Qualifying, self.extract_qualifying().await);
        report.record(Entity::PitStops, self.extract_pit_stops().await);

        match self.extract_standings().await {
            Ok((constructors, drivers)) => {
                report.record(Entity::ConstructorStandings, Ok(constructors));
                report.record(Entity::DriverStandings, Ok(drivers));
            },
            Err(e) => {
                let message = e.to_string();
                report.fail(Entity::ConstructorStandings, message.clone());
                report.fail(Entity::DriverStandings, message);
            },
        }

        info!(rows = report.total_rows(), failed = report.failures.len(), "Extraction finished");
        report
    }

    pub async fn extract_circuits(&self) -> Result<usize> {
        let records = self.client.fetch_records("circuits", CIRCUIT_TABLE).await;
        let rows = reference::circuit_rows(decode_records(records, Entity::Circuits));
        self.stage(Entity::Circuits, &rows)
    }

    pub async fn extract_seasons(&self) -> Result<usize> {
        let records = self.client.fetch_records("seasons", SEASON_TABLE).await;
        let rows = reference::season_rows(decode_records(records, Entity::Seasons));
        self.stage(Entity::Seasons, &rows)
    }

    pub async fn extract_constructors(&self) -> Result<usize> {
        let records = self.client.fetch_records("constructors", CONSTRUCTOR_TABLE).await;
        let rows = reference::constructor_rows(decode_records(records, Entity::Constructors));
        self.stage(Entity::Constructors, &rows)
    }

    pub async fn extract_drivers(&self) -> Result<usize> {
        let records = self.client.fetch_records("drivers", DRIVER_TABLE).await;
        let rows = reference::driver_rows(decode_records(records, Entity::Drivers));
        self.stage(Entity::Drivers, &rows)
    }

    pub async fn extract_races(&self) -> Result<usize> {
        let mut rows = Vec::new();
        for year in self.config.years() {
            let races = self.season_races(year, "races", Entity::Races).await;
            rows.extend(events::race_rows(&races, year));
        }
        self.stage(Entity::Races, &rows)
    }

    pub async fn extract_results(&self) -> Result<usize> {
        let mut rows = Vec::new();
        for year in self.config.years() {
            let races = self.season_races(year, "results", Entity::Results).await;
            rows.extend(events::result_rows(&races, year));
        }
        self.stage(Entity::Results, &rows)
    }

    pub async fn extract_qualifying(&self) -> Result<usize> {
        let mut rows = Vec::new();
        for year in self.config.years() {
            let races = self.season_races(year, "qualifying", Entity::Qualifying).await;
            rows.extend(events::qualifying_rows(&races, year));
        }
        self.stage(Entity::Qualifying, &rows)
    }

    /// Pit stops, limited to seasons with published stop timing
    pub async fn extract_pit_stops(&self) -> Result<usize> {
        let mut rows = Vec::new();
        for year in self.config.pit_stop_years() {
            let races = self.season_races(year, "pitstops", Entity::PitStops).await;
            rows.extend(events::pit_stop_rows(&races, year));
        }
        self.stage(Entity::PitStops, &rows)
    }

    /// Constructor and driver standings after every round
    ///
    /// Rounds 1 to the configured maximum are probed per season; rounds with no
    /// standings (not yet run, or beyond the season length) are skipped.
    pub async fn extract_standings(&self) -> Result<(usize, usize)> {
        let mut constructor_rows = Vec::new();
        let mut driver_rows = Vec::new();

        for year in self.config.years() {
            for round in 1..=self.config.max_standings_rounds {
                let endpoint = format!("{year}/{round}/constructorStandings");
                let lists = standings::standings_lists(
                    self.client.fetch_records(&endpoint, STANDINGS_TABLE).await,
                );
                let rows = standings::constructor_standing_rows(&lists, year, round);
                if rows.is_empty() {
                    debug!(year, round, "No constructor standings for round");
                }
                constructor_rows.extend(rows);

                let endpoint = format!("{year}/{round}/driverStandings");
                let lists = standings::standings_lists(
                    self.client.fetch_records(&endpoint, STANDINGS_TABLE).await,
                );
                let rows = standings::driver_standing_rows(&lists, year, round);
                if rows.is_empty() {
                    debug!(year, round, "No driver standings for round");
                }
                driver_rows.extend(rows);
            }
        }

        let constructors = self.stage(Entity::ConstructorStandings, &constructor_rows)?;
        let drivers = self.stage(Entity::DriverStandings, &driver_rows)?;
        Ok((constructors, drivers))
    }

    async fn season_races(
        &self,
        year: i32,
        resource: &str,
        entity: Entity,
    ) -> Vec<crate::api::ApiRace> {
        let endpoint = format!("{year}/{resource}");
        let records = self.client.fetch_records(&endpoint, RACE_TABLE).await;
        decode_records(records, entity)
    }

    fn stage<T: Serialize>(&self, entity: Entity, rows: &[T]) -> Result<usize> {
        let path = self.staging.write(Stage::Raw, entity, rows)?;
        info!(entity = %entity, rows = rows.len(), path = %path.display(), "Extracted");
        Ok(rows.len())
    }
}
