//! Race-scoped entities: races, results, qualifying, pit stops
//!
//! Every row carries the race id computed from its season and round. Races
//! without a round cannot be identified and are skipped.

use crate::api::ApiRace;
use crate::models::{PitStopRow, QualifyingRow, RaceRow, ResultRow};
use crate::normalize::{parse_int, race_id};
use tracing::warn;

/// Status recorded when upstream omits one
const DEFAULT_STATUS: &str = "Finished";

/// `(year, round, race_id)`; the race's own season wins over the requested one
fn race_key(race: &ApiRace, requested_year: i32) -> Option<(i64, i64, i64)> {
    let year = parse_int(race.season.as_deref()).unwrap_or(i64::from(requested_year));
    let Some(round) = parse_int(race.round.as_deref()) else {
        warn!(year, race = %race.race_name, "Skipping race without a round");
        return None;
    };
    let race_id = race_id(year, round)?;
    Some((year, round, race_id))
}

pub fn race_rows(races: &[ApiRace], year: i32) -> Vec<RaceRow> {
    races
        .iter()
        .filter_map(|race| {
            let (year, round, race_id) = race_key(race, year)?;
            Some(RaceRow {
                race_id,
                year,
                round,
                circuit_ref: race.circuit.circuit_id.clone(),
                race_name: race.race_name.clone(),
                race_date: race.date.clone(),
                race_time: race.time.clone(),
                url: race.url.clone(),
            })
        })
        .collect()
}

pub fn result_rows(races: &[ApiRace], year: i32) -> Vec<ResultRow> {
    let mut rows = Vec::new();
    for race in races {
        let Some((_, _, race_id)) = race_key(race, year) else {
            continue;
        };

        for result in &race.results {
            let fastest = result.fastest_lap.as_ref();
            let classified = result
                .position
                .clone()
                .filter(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));

            rows.push(ResultRow {
                race_id,
                driver_ref: result.driver.driver_id.clone(),
                constructor_ref: result.constructor.constructor_id.clone(),
                number: result.number.clone(),
                grid: result.grid.clone(),
                position: result.position.clone(),
                position_text: result.position_text.clone(),
                position_order: classified,
                points: result.points.clone(),
                laps: result.laps.clone(),
                time_result: result.time.as_ref().and_then(|t| t.time.clone()),
                milliseconds: result.time.as_ref().and_then(|t| t.millis.clone()),
                fastest_lap: fastest.and_then(|f| f.lap.clone()),
                fastest_lap_rank: fastest.and_then(|f| f.rank.clone()),
                fastest_lap_time: fastest
                    .and_then(|f| f.time.as_ref())
                    .and_then(|t| t.time.clone()),
                fastest_lap_speed: fastest
                    .and_then(|f| f.average_speed.as_ref())
                    .and_then(|s| s.speed.clone()),
                status: Some(
                    result
                        .status
                        .clone()
                        .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
                ),
            });
        }
    }
    rows
}

pub fn qualifying_rows(races: &[ApiRace], year: i32) -> Vec<QualifyingRow> {
    let mut rows = Vec::new();
    for race in races {
        let Some((_, _, race_id)) = race_key(race, year) else {
            continue;
        };

        rows.extend(race.qualifying_results.iter().map(|q| QualifyingRow {
            race_id,
            driver_ref: q.driver.driver_id.clone(),
            constructor_ref: q.constructor.constructor_id.clone(),
            number: q.number.clone(),
            position: q.position.clone(),
            q1: q.q1.clone(),
            q2: q.q2.clone(),
            q3: q.q3.clone(),
        }));
    }
    rows
}

pub fn pit_stop_rows(races: &[ApiRace], year: i32) -> Vec<PitStopRow> {
    let mut rows = Vec::new();
    for race in races {
        let Some((_, _, race_id)) = race_key(race, year) else {
            continue;
        };

        rows.extend(race.pit_stops.iter().map(|stop| PitStopRow {
            race_id,
            driver_ref: stop.driver_ref().to_string(),
            stop: stop.stop.clone(),
            lap: stop.lap.clone(),
            time_of_day: stop.time.clone(),
            duration: stop.duration.clone(),
            milliseconds: None,
        }));
    }
    rows
}
