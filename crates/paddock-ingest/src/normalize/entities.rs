//! Row-level normalization, one function per entity
//!
//! Reference tables get their ids from the same [`Lookup`] that dependent tables
//! resolve against, so the two always agree. Rows repeating a natural key (or, for
//! races, a race id) are dropped after the first.

use super::{
    float_or_zero, int_or_zero, parse_date, parse_int, pit_stop_millis, position_order,
    status_id, text_or_empty, time_of_day,
};
use crate::models::{
    Circuit, CircuitRow, Constructor, ConstructorRow, ConstructorStanding, ConstructorStandingRow,
    Driver, DriverRow, DriverStanding, DriverStandingRow, PitStop, PitStopRow, Qualifying,
    QualifyingRow, Race, RaceResult, RaceRow, ResultRow,
};
use crate::resolve::{Lookup, ReferenceRow, ResolveStats};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Keep the first row of every natural key, dropping rows without one
fn first_per_key<R: ReferenceRow>(rows: Vec<R>, entity: &str) -> Vec<R> {
    let mut seen = BTreeSet::new();
    let before = rows.len();
    let kept: Vec<R> = rows
        .into_iter()
        .filter(|row| row.has_key() && seen.insert(row.natural_key().to_string()))
        .collect();

    if kept.len() < before {
        warn!(
            entity,
            dropped = before - kept.len(),
            "Dropped rows with blank or duplicate natural keys"
        );
    }
    kept
}

fn report(entity: &str, reference: &str, stats: ResolveStats) {
    if stats.unresolved > 0 {
        warn!(
            entity,
            reference,
            resolved = stats.resolved,
            unresolved = stats.unresolved,
            "Unresolved references mapped to id 0"
        );
    } else {
        debug!(entity, reference, resolved = stats.resolved, "All references resolved");
    }
}

// ============================================================================
// Reference tables
// ============================================================================

pub fn circuits(rows: Vec<CircuitRow>) -> Vec<Circuit> {
    let lookup = Lookup::build(&rows);
    first_per_key(rows, "circuits")
        .into_iter()
        .map(|row| Circuit {
            circuit_id: lookup.resolve(&row.circuit_ref),
            lat: float_or_zero(row.lat.as_deref()),
            lng: float_or_zero(row.lng.as_deref()),
            altitude: float_or_zero(row.altitude.as_deref()),
            circuit_ref: row.circuit_ref,
            circuit_name: row.circuit_name,
            location: row.location,
            country: row.country,
            url: row.url,
        })
        .collect()
}

pub fn constructors(rows: Vec<ConstructorRow>) -> Vec<Constructor> {
    let lookup = Lookup::build(&rows);
    first_per_key(rows, "constructors")
        .into_iter()
        .map(|row| Constructor {
            constructor_id: lookup.resolve(&row.constructor_ref),
            constructor_ref: row.constructor_ref,
            constructor_name: row.constructor_name,
            nationality: row.nationality,
            url: row.url,
        })
        .collect()
}

pub fn drivers(rows: Vec<DriverRow>) -> Vec<Driver> {
    let lookup = Lookup::build(&rows);
    first_per_key(rows, "drivers")
        .into_iter()
        .map(|row| Driver {
            driver_id: lookup.resolve(&row.driver_ref),
            driver_number: int_or_zero(row.driver_number.as_deref()),
            dob: parse_date(row.dob.as_deref()),
            code: text_or_empty(row.code),
            driver_ref: row.driver_ref,
            forename: row.forename,
            surname: row.surname,
            nationality: row.nationality,
            url: row.url,
        })
        .collect()
}

// ============================================================================
// Race-scoped tables
// ============================================================================

pub fn races(rows: Vec<RaceRow>, circuits: &Lookup) -> Vec<Race> {
    let mut stats = ResolveStats::default();
    let mut seen = BTreeSet::new();

    let races: Vec<Race> = rows
        .into_iter()
        .filter(|row| seen.insert(row.race_id))
        .map(|row| Race {
            race_id: row.race_id,
            year: row.year,
            round: row.round,
            circuit_id: stats.resolve(circuits, &row.circuit_ref),
            race_name: row.race_name,
            race_date: parse_date(row.race_date.as_deref()),
            race_time: time_of_day(row.race_time.as_deref()),
            url: row.url,
        })
        .collect();

    report("races", "circuits", stats);
    races
}

pub fn results(rows: Vec<ResultRow>, drivers: &Lookup, constructors: &Lookup) -> Vec<RaceResult> {
    let mut driver_stats = ResolveStats::default();
    let mut constructor_stats = ResolveStats::default();

    let results: Vec<RaceResult> = rows
        .into_iter()
        .map(|row| {
            let position = parse_int(row.position.as_deref());
            RaceResult {
                race_id: row.race_id,
                driver_id: driver_stats.resolve(drivers, &row.driver_ref),
                constructor_id: constructor_stats.resolve(constructors, &row.constructor_ref),
                number: int_or_zero(row.number.as_deref()),
                grid: int_or_zero(row.grid.as_deref()),
                position,
                position_order: position_order(position, row.position_order.as_deref()),
                position_text: text_or_empty(row.position_text),
                points: float_or_zero(row.points.as_deref()),
                laps: int_or_zero(row.laps.as_deref()),
                time_result: text_or_empty(row.time_result),
                milliseconds: int_or_zero(row.milliseconds.as_deref()),
                fastest_lap: int_or_zero(row.fastest_lap.as_deref()),
                fastest_lap_rank: int_or_zero(row.fastest_lap_rank.as_deref()),
                fastest_lap_time: text_or_empty(row.fastest_lap_time),
                fastest_lap_speed: float_or_zero(row.fastest_lap_speed.as_deref()),
                status_id: status_id(row.status.as_deref()),
            }
        })
        .collect();

    report("results", "drivers", driver_stats);
    report("results", "constructors", constructor_stats);
    results
}

pub fn qualifying(rows: Vec<QualifyingRow>, drivers: &Lookup, constructors: &Lookup) -> Vec<Qualifying> {
    let mut driver_stats = ResolveStats::default();
    let mut constructor_stats = ResolveStats::default();

    let qualifying: Vec<Qualifying> = rows
        .into_iter()
        .map(|row| Qualifying {
            race_id: row.race_id,
            driver_id: driver_stats.resolve(drivers, &row.driver_ref),
            constructor_id: constructor_stats.resolve(constructors, &row.constructor_ref),
            number: int_or_zero(row.number.as_deref()),
            position: int_or_zero(row.position.as_deref()),
            q1: text_or_empty(row.q1),
            q2: text_or_empty(row.q2),
            q3: text_or_empty(row.q3),
        })
        .collect();

    report("qualifying", "drivers", driver_stats);
    report("qualifying", "constructors", constructor_stats);
    qualifying
}

pub fn pit_stops(rows: Vec<PitStopRow>, drivers: &Lookup) -> Vec<PitStop> {
    let mut stats = ResolveStats::default();

    let pit_stops: Vec<PitStop> = rows
        .into_iter()
        .map(|row| PitStop {
            race_id: row.race_id,
            driver_id: stats.resolve(drivers, &row.driver_ref),
            stop: int_or_zero(row.stop.as_deref()),
            lap: int_or_zero(row.lap.as_deref()),
            time_of_day: time_of_day(row.time_of_day.as_deref()),
            milliseconds: pit_stop_millis(row.milliseconds.as_deref(), row.duration.as_deref()),
            duration: text_or_empty(row.duration),
        })
        .collect();

    report("pit_stops", "drivers", stats);
    pit_stops
}

pub fn constructor_standings(
    rows: Vec<ConstructorStandingRow>,
    constructors: &Lookup,
) -> Vec<ConstructorStanding> {
    let mut stats = ResolveStats::default();

    let standings: Vec<ConstructorStanding> = rows
        .into_iter()
        .map(|row| ConstructorStanding {
            race_id: row.race_id,
            constructor_id: stats.resolve(constructors, &row.constructor_ref),
            points: float_or_zero(row.points.as_deref()),
            position: int_or_zero(row.position.as_deref()),
            position_text: text_or_empty(row.position_text),
            wins: int_or_zero(row.wins.as_deref()),
        })
        .collect();

    report("constructor_standings", "constructors", stats);
    standings
}

pub fn driver_standings(rows: Vec<DriverStandingRow>, drivers: &Lookup) -> Vec<DriverStanding> {
    let mut stats = ResolveStats::default();

    let standings: Vec<DriverStanding> = rows
        .into_iter()
        .map(|row| DriverStanding {
            race_id: row.race_id,
            driver_id: stats.resolve(drivers, &row.driver_ref),
            points: float_or_zero(row.points.as_deref()),
            position: int_or_zero(row.position.as_deref()),
            position_text: text_or_empty(row.position_text),
            wins: int_or_zero(row.wins.as_deref()),
        })
        .collect();

    report("driver_standings", "drivers", stats);
    standings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{Status, UNCLASSIFIED_POSITION_ORDER};
    use crate::resolve::UNRESOLVED_ID;

    fn driver(driver_ref: &str) -> DriverRow {
        DriverRow {
            driver_ref: driver_ref.to_string(),
            ..DriverRow::default()
        }
    }

    fn constructor(constructor_ref: &str) -> ConstructorRow {
        ConstructorRow {
            constructor_ref: constructor_ref.to_string(),
            ..ConstructorRow::default()
        }
    }

    #[test]
    fn test_drivers_get_ids_in_row_order_and_lose_duplicates() {
        let rows = vec![driver("max_verstappen"), driver("hamilton"), driver("max_verstappen")];
        let clean = drivers(rows);

        assert_eq!(clean.len(), 2);
        assert_eq!(clean[0].driver_id, 1);
        assert_eq!(clean[1].driver_id, 2);
        assert_eq!(clean[0].driver_number, 0);
        assert_eq!(clean[0].code, "");
    }

    #[test]
    fn test_blank_driver_refs_are_dropped_and_never_match() {
        let staged = vec![driver(""), driver("bearman")];
        let lookup = Lookup::build(&staged);
        let clean = drivers(staged);

        assert_eq!(clean.len(), 1);
        assert_eq!(clean[0].driver_ref, "bearman");
        assert_eq!(clean[0].driver_id, 1);

        let stops = pit_stops(
            vec![PitStopRow {
                race_id: 202401,
                driver_ref: String::new(),
                ..PitStopRow::default()
            }],
            &lookup,
        );
        assert_eq!(stops[0].driver_id, UNRESOLVED_ID);
    }

    #[test]
    fn test_driver_fields_are_coerced() {
        let row = DriverRow {
            driver_id: Some(33),
            driver_number: Some("33".to_string()),
            code: Some("VER".to_string()),
            dob: Some("1997-09-30".to_string()),
            ..driver("max_verstappen")
        };
        let clean = drivers(vec![row]);

        assert_eq!(clean[0].driver_id, 33);
        assert_eq!(clean[0].driver_number, 33);
        assert_eq!(clean[0].dob.map(|d| d.to_string()).as_deref(), Some("1997-09-30"));
    }

    #[test]
    fn test_circuit_coordinates_default_to_zero() {
        let rows = vec![CircuitRow {
            circuit_ref: "monza".to_string(),
            lat: Some("45.6156".to_string()),
            ..CircuitRow::default()
        }];
        let clean = circuits(rows);

        assert_eq!(clean[0].circuit_id, 1);
        assert_eq!(clean[0].lat, 45.6156);
        assert_eq!(clean[0].lng, 0.0);
        assert_eq!(clean[0].altitude, 0.0);
    }

    #[test]
    fn test_races_resolve_circuits_and_default_time() {
        let circuit_lookup = Lookup::build(&[CircuitRow {
            circuit_id: Some(1),
            circuit_ref: "bahrain".to_string(),
            ..CircuitRow::default()
        }]);
        let rows = vec![
            RaceRow {
                race_id: 202401,
                year: 2024,
                round: 1,
                circuit_ref: "bahrain".to_string(),
                race_date: Some("2024-03-02".to_string()),
                race_time: Some("15:00:00Z".to_string()),
                ..RaceRow::default()
            },
            RaceRow {
                race_id: 202402,
                year: 2024,
                round: 2,
                circuit_ref: "jeddah".to_string(),
                ..RaceRow::default()
            },
        ];

        let clean = races(rows, &circuit_lookup);
        assert_eq!(clean[0].circuit_id, 1);
        assert_eq!(clean[0].race_time, "15:00:00");
        assert_eq!(clean[1].circuit_id, UNRESOLVED_ID);
        assert_eq!(clean[1].race_time, "00:00:00");
        assert_eq!(clean[1].race_date, None);
    }

    #[test]
    fn test_races_drop_repeated_race_ids() {
        let row = RaceRow {
            race_id: 202401,
            ..RaceRow::default()
        };
        assert_eq!(races(vec![row.clone(), row], &Lookup::default()).len(), 1);
    }

    #[test]
    fn test_results_resolution_and_defaults() {
        let driver_lookup = Lookup::build(&[driver("max_verstappen")]);
        let constructor_lookup = Lookup::build(&[constructor("red_bull")]);
        let rows = vec![
            ResultRow {
                race_id: 202401,
                driver_ref: "max_verstappen".to_string(),
                constructor_ref: "red_bull".to_string(),
                position: Some("1".to_string()),
                points: Some("25.5".to_string()),
                status: Some("Finished".to_string()),
                ..ResultRow::default()
            },
            ResultRow {
                race_id: 202401,
                driver_ref: "unknown_driver".to_string(),
                constructor_ref: "red_bull".to_string(),
                position_text: Some("R".to_string()),
                status: Some("Hydraulics".to_string()),
                ..ResultRow::default()
            },
        ];

        let clean = results(rows, &driver_lookup, &constructor_lookup);

        assert_eq!(clean[0].driver_id, 1);
        assert_eq!(clean[0].constructor_id, 1);
        assert_eq!(clean[0].position_order, 1);
        assert_eq!(clean[0].points, 25.5);
        assert_eq!(clean[0].status_id, Status::Finished.id());

        assert_eq!(clean[1].driver_id, UNRESOLVED_ID);
        assert_eq!(clean[1].position, None);
        assert_eq!(clean[1].position_order, UNCLASSIFIED_POSITION_ORDER);
        assert_eq!(clean[1].position_text, "R");
        assert_eq!(clean[1].status_id, Status::Retired.id());
        assert_eq!(clean[1].laps, 0);
        assert_eq!(clean[1].milliseconds, 0);
    }

    #[test]
    fn test_qualifying_blank_sessions_become_empty() {
        let lookup = Lookup::build(&[driver("norris")]);
        let rows = vec![QualifyingRow {
            race_id: 202401,
            driver_ref: "norris".to_string(),
            position: Some("P3".to_string()),
            q1: Some("1:30.031".to_string()),
            ..QualifyingRow::default()
        }];

        let clean = qualifying(rows, &lookup, &Lookup::default());
        assert_eq!(clean[0].driver_id, 1);
        assert_eq!(clean[0].constructor_id, UNRESOLVED_ID);
        assert_eq!(clean[0].position, 0);
        assert_eq!(clean[0].q1, "1:30.031");
        assert_eq!(clean[0].q3, "");
    }

    #[test]
    fn test_pit_stop_millis_derived_from_duration() {
        let lookup = Lookup::build(&[driver("alonso")]);
        let rows = vec![PitStopRow {
            race_id: 202401,
            driver_ref: "alonso".to_string(),
            stop: Some("1".to_string()),
            lap: Some("12".to_string()),
            time_of_day: Some("17:05:23".to_string()),
            duration: Some("21.5".to_string()),
            milliseconds: None,
        }];

        let clean = pit_stops(rows, &lookup);
        assert_eq!(clean[0].milliseconds, 21_500);
        assert_eq!(clean[0].duration, "21.5");
        assert_eq!(clean[0].lap, 12);
        assert_eq!(clean[0].time_of_day, "17:05:23");
    }

    #[test]
    fn test_standings_default_points_and_wins() {
        let lookup = Lookup::build(&[constructor("ferrari")]);
        let rows = vec![ConstructorStandingRow {
            race_id: 202403,
            constructor_ref: "ferrari".to_string(),
            position: Some("2".to_string()),
            ..ConstructorStandingRow::default()
        }];

        let clean = constructor_standings(rows, &lookup);
        assert_eq!(clean[0].constructor_id, 1);
        assert_eq!(clean[0].points, 0.0);
        assert_eq!(clean[0].wins, 0);
        assert_eq!(clean[0].position, 2);

        let drivers = driver_standings(
            vec![DriverStandingRow {
                race_id: 202403,
                driver_ref: "leclerc".to_string(),
                points: Some("43".to_string()),
                wins: Some("1".to_string()),
                ..DriverStandingRow::default()
            }],
            &Lookup::default(),
        );
        assert_eq!(drivers[0].driver_id, UNRESOLVED_ID);
        assert_eq!(drivers[0].points, 43.0);
        assert_eq!(drivers[0].wins, 1);
    }
}
