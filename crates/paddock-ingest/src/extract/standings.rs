//! Championship standings after each round
//!
//! A standings response holds a list of standings lists, normally one per
//! request. Some mirrors wrap it once more in a `StandingsLists` key of the item
//! itself; both shapes are flattened here.

use crate::api::{ApiStandingsList, STANDINGS_LISTS};
use crate::models::{ConstructorStandingRow, DriverStandingRow, Entity};
use crate::normalize::{parse_int, race_id};
use serde_json::Value;

use super::decode_records;

/// Flatten and decode the standings lists of one response
pub fn standings_lists(records: Vec<Value>) -> Vec<ApiStandingsList> {
    let flattened: Vec<Value> = records
        .into_iter()
        .flat_map(|record| match record.get(STANDINGS_LISTS) {
            Some(Value::Array(nested)) => nested.clone(),
            Some(nested @ Value::Object(_)) => vec![nested.clone()],
            _ => vec![record],
        })
        .collect();

    // Driver and constructor lists share a shape; the entity only labels log lines
    decode_records(flattened, Entity::DriverStandings)
}

/// Race id of a standings list, falling back to the probed season and round
///
/// `None` when the list's season or round cannot be encoded; its standings are skipped.
fn list_race_id(list: &ApiStandingsList, year: i32, round: u32) -> Option<i64> {
    let year = parse_int(list.season.as_deref()).unwrap_or(i64::from(year));
    let round = parse_int(list.round.as_deref()).unwrap_or(i64::from(round));
    race_id(year, round)
}

/// Lists paired with their race id, dropping the ones without one
fn keyed_lists<'a>(
    lists: &'a [ApiStandingsList],
    year: i32,
    round: u32,
) -> impl Iterator<Item = (i64, &'a ApiStandingsList)> + 'a {
    lists
        .iter()
        .filter_map(move |list| list_race_id(list, year, round).map(|id| (id, list)))
}

pub fn constructor_standing_rows(
    lists: &[ApiStandingsList],
    year: i32,
    round: u32,
) -> Vec<ConstructorStandingRow> {
    keyed_lists(lists, year, round)
        .flat_map(|(race_id, list)| {
            list.constructor_standings
                .iter()
                .map(move |standing| ConstructorStandingRow {
                    race_id,
                    constructor_ref: standing.constructor.constructor_id.clone(),
                    points: standing.points.clone(),
                    position: standing.position.clone(),
                    position_text: standing.position_text.clone(),
                    wins: standing.wins.clone(),
                })
        })
        .collect()
}

pub fn driver_standing_rows(
    lists: &[ApiStandingsList],
    year: i32,
    round: u32,
) -> Vec<DriverStandingRow> {
    keyed_lists(lists, year, round)
        .flat_map(|(race_id, list)| {
            list.driver_standings
                .iter()
                .map(move |standing| DriverStandingRow {
                    race_id,
                    driver_ref: standing.driver.driver_id.clone(),
                    points: standing.points.clone(),
                    position: standing.position.clone(),
                    position_text: standing.position_text.clone(),
                    wins: standing.wins.clone(),
                })
        })
        .collect()
}
