//! Reference entities: circuits, seasons, constructors, drivers
//!
//! Circuits, constructors and drivers receive surrogate ids in the order they are
//! returned upstream. Records without a natural key are dropped, and a key seen
//! twice (pages can overlap when the upstream list changes mid-run) keeps its first
//! record.

use crate::api::{ApiCircuit, ApiConstructor, ApiDriver, ApiSeason};
use crate::models::{CircuitRow, ConstructorRow, DriverRow, Season};
use crate::normalize::parse_int;
use crate::resolve::SurrogateKeys;
use tracing::warn;

/// Assign an id to `key` if it is new; `None` for blank or repeated keys
fn first_sighting(keys: &mut SurrogateKeys, key: &str, entity: &str) -> Option<i64> {
    if key.trim().is_empty() {
        warn!(entity, "Dropping record without a natural key");
        return None;
    }
    if keys.get(key).is_some() {
        return None;
    }
    Some(keys.assign(key))
}

pub fn circuit_rows(circuits: Vec<ApiCircuit>) -> Vec<CircuitRow> {
    let mut keys = SurrogateKeys::new();
    circuits
        .into_iter()
        .filter_map(|circuit| {
            let id = first_sighting(&mut keys, &circuit.circuit_id, "circuits")?;
            let location = circuit.location;
            Some(CircuitRow {
                circuit_id: Some(id),
                circuit_ref: circuit.circuit_id,
                circuit_name: circuit.circuit_name,
                location: location.locality,
                country: location.country,
                lat: location.lat,
                lng: location.long,
                altitude: location.alt,
                url: circuit.url,
            })
        })
        .collect()
}

pub fn season_rows(seasons: Vec<ApiSeason>) -> Vec<Season> {
    seasons
        .into_iter()
        .filter_map(|season| match parse_int(season.season.as_deref()) {
            Some(year) => Some(Season {
                year,
                url: season.url,
            }),
            None => {
                warn!(season = ?season.season, "Dropping season without a numeric year");
                None
            },
        })
        .collect()
}

pub fn constructor_rows(constructors: Vec<ApiConstructor>) -> Vec<ConstructorRow> {
    let mut keys = SurrogateKeys::new();
    constructors
        .into_iter()
        .filter_map(|constructor| {
            let id = first_sighting(&mut keys, &constructor.constructor_id, "constructors")?;
            Some(ConstructorRow {
                constructor_id: Some(id),
                constructor_ref: constructor.constructor_id,
                constructor_name: constructor.name,
                nationality: constructor.nationality,
                url: constructor.url,
            })
        })
        .collect()
}

pub fn driver_rows(drivers: Vec<ApiDriver>) -> Vec<DriverRow> {
    let mut keys = SurrogateKeys::new();
    drivers
        .into_iter()
        .filter_map(|driver| {
            let id = first_sighting(&mut keys, &driver.driver_id, "drivers")?;
            Some(DriverRow {
                driver_id: Some(id),
                driver_ref: driver.driver_id,
                driver_number: driver.permanent_number,
                code: driver.code,
                forename: driver.given_name,
                surname: driver.family_name,
                dob: driver.date_of_birth,
                nationality: driver.nationality,
                url: driver.url,
            })
        })
        .collect()
}
