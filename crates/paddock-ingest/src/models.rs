//! Row types for every entity, in their staged (raw) and normalized (clean) shapes
//!
//! Raw rows keep upstream scalars as text so that nothing is lost before
//! normalization; absent CSV columns deserialize to their defaults. Clean rows carry
//! the final column types and surrogate ids.

use crate::resolve::ReferenceRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ten entities moved through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Circuits,
    Seasons,
    Constructors,
    Drivers,
    Races,
    Results,
    Qualifying,
    PitStops,
    ConstructorStandings,
    DriverStandings,
}

impl Entity {
    pub const ALL: [Entity; 10] = [
        Entity::Circuits,
        Entity::Seasons,
        Entity::Constructors,
        Entity::Drivers,
        Entity::Races,
        Entity::Results,
        Entity::Qualifying,
        Entity::PitStops,
        Entity::ConstructorStandings,
        Entity::DriverStandings,
    ];

    /// Table name in the sink and file stem in the staging area
    pub fn table_name(self) -> &'static str {
        match self {
            Entity::Circuits => "circuits",
            Entity::Seasons => "seasons",
            Entity::Constructors => "constructors",
            Entity::Drivers => "drivers",
            Entity::Races => "races",
            Entity::Results => "results",
            Entity::Qualifying => "qualifying",
            Entity::PitStops => "pit_stops",
            Entity::ConstructorStandings => "constructor_standings",
            Entity::DriverStandings => "driver_standings",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.csv", self.table_name())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

// ============================================================================
// Raw rows
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitRow {
    pub circuit_id: Option<i64>,
    pub circuit_ref: String,
    pub circuit_name: String,
    pub location: String,
    pub country: String,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub altitude: Option<String>,
    pub url: String,
}

/// Seasons need no normalization; the same shape is staged and loaded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Season {
    pub year: i64,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructorRow {
    pub constructor_id: Option<i64>,
    pub constructor_ref: String,
    pub constructor_name: String,
    pub nationality: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverRow {
    pub driver_id: Option<i64>,
    pub driver_ref: String,
    pub driver_number: Option<String>,
    pub code: Option<String>,
    pub forename: String,
    pub surname: String,
    pub dob: Option<String>,
    pub nationality: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceRow {
    pub race_id: i64,
    pub year: i64,
    pub round: i64,
    pub circuit_ref: String,
    pub race_name: String,
    pub race_date: Option<String>,
    pub race_time: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultRow {
    pub race_id: i64,
    pub driver_ref: String,
    pub constructor_ref: String,
    pub number: Option<String>,
    pub grid: Option<String>,
    pub position: Option<String>,
    pub position_text: Option<String>,
    pub position_order: Option<String>,
    pub points: Option<String>,
    pub laps: Option<String>,
    pub time_result: Option<String>,
    pub milliseconds: Option<String>,
    pub fastest_lap: Option<String>,
    pub fastest_lap_rank: Option<String>,
    pub fastest_lap_time: Option<String>,
    pub fastest_lap_speed: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualifyingRow {
    pub race_id: i64,
    pub driver_ref: String,
    pub constructor_ref: String,
    pub number: Option<String>,
    pub position: Option<String>,
    pub q1: Option<String>,
    pub q2: Option<String>,
    pub q3: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitStopRow {
    pub race_id: i64,
    pub driver_ref: String,
    pub stop: Option<String>,
    pub lap: Option<String>,
    pub time_of_day: Option<String>,
    pub duration: Option<String>,
    pub milliseconds: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructorStandingRow {
    pub race_id: i64,
    pub constructor_ref: String,
    pub points: Option<String>,
    pub position: Option<String>,
    pub position_text: Option<String>,
    pub wins: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverStandingRow {
    pub race_id: i64,
    pub driver_ref: String,
    pub points: Option<String>,
    pub position: Option<String>,
    pub position_text: Option<String>,
    pub wins: Option<String>,
}

impl ReferenceRow for CircuitRow {
    fn natural_key(&self) -> &str {
        &self.circuit_ref
    }

    fn surrogate_key(&self) -> Option<i64> {
        self.circuit_id
    }
}

impl ReferenceRow for ConstructorRow {
    fn natural_key(&self) -> &str {
        &self.constructor_ref
    }

    fn surrogate_key(&self) -> Option<i64> {
        self.constructor_id
    }
}

impl ReferenceRow for DriverRow {
    fn natural_key(&self) -> &str {
        &self.driver_ref
    }

    fn surrogate_key(&self) -> Option<i64> {
        self.driver_id
    }
}

// ============================================================================
// Clean rows
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    pub circuit_id: i64,
    pub circuit_ref: String,
    pub circuit_name: String,
    pub location: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constructor {
    pub constructor_id: i64,
    pub constructor_ref: String,
    pub constructor_name: String,
    pub nationality: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub driver_id: i64,
    pub driver_ref: String,
    pub driver_number: i64,
    pub code: String,
    pub forename: String,
    pub surname: String,
    pub dob: Option<NaiveDate>,
    pub nationality: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub race_id: i64,
    pub year: i64,
    pub round: i64,
    pub circuit_id: i64,
    pub race_name: String,
    pub race_date: Option<NaiveDate>,
    pub race_time: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub race_id: i64,
    pub driver_id: i64,
    pub constructor_id: i64,
    pub number: i64,
    pub grid: i64,
    pub position: Option<i64>,
    pub position_text: String,
    pub position_order: i64,
    pub points: f64,
    pub laps: i64,
    pub time_result: String,
    pub milliseconds: i64,
    pub fastest_lap: i64,
    pub fastest_lap_rank: i64,
    pub fastest_lap_time: String,
    pub fastest_lap_speed: f64,
    pub status_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Qualifying {
    pub race_id: i64,
    pub driver_id: i64,
    pub constructor_id: i64,
    pub number: i64,
    pub position: i64,
    pub q1: String,
    pub q2: String,
    pub q3: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitStop {
    pub race_id: i64,
    pub driver_id: i64,
    pub stop: i64,
    pub lap: i64,
    pub time_of_day: String,
    pub duration: String,
    pub milliseconds: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorStanding {
    pub race_id: i64,
    pub constructor_id: i64,
    pub points: f64,
    pub position: i64,
    pub position_text: String,
    pub wins: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverStanding {
    pub race_id: i64,
    pub driver_id: i64,
    pub points: f64,
    pub position: i64,
    pub position_text: String,
    pub wins: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_names() {
        assert_eq!(Entity::PitStops.table_name(), "pit_stops");
        assert_eq!(Entity::DriverStandings.file_name(), "driver_standings.csv");
        assert_eq!(Entity::Circuits.to_string(), "circuits");
    }

    #[test]
    fn test_entity_names_are_unique() {
        let mut names: Vec<_> = Entity::ALL.iter().map(|e| e.table_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Entity::ALL.len());
    }
}
