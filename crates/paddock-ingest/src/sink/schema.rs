//! Table layouts of the clean row types

use super::SqlType::{Integer, Real, Text};
use super::{column, Column, SqlValue, TableRow};
use crate::models::{
    Circuit, Constructor, ConstructorStanding, Driver, DriverStanding, Entity, PitStop,
    Qualifying, Race, RaceResult, Season,
};

impl TableRow for Season {
    const ENTITY: Entity = Entity::Seasons;

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[column("year", Integer), column("url", Text)];
        COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![self.year.into(), self.url.as_str().into()]
    }
}

impl TableRow for Circuit {
    const ENTITY: Entity = Entity::Circuits;

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            column("circuit_id", Integer),
            column("circuit_ref", Text),
            column("circuit_name", Text),
            column("location", Text),
            column("country", Text),
            column("lat", Real),
            column("lng", Real),
            column("altitude", Real),
            column("url", Text),
        ];
        COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.circuit_id.into(),
            self.circuit_ref.as_str().into(),
            self.circuit_name.as_str().into(),
            self.location.as_str().into(),
            self.country.as_str().into(),
            self.lat.into(),
            self.lng.into(),
            self.altitude.into(),
            self.url.as_str().into(),
        ]
    }
}

impl TableRow for Constructor {
    const ENTITY: Entity = Entity::Constructors;

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            column("constructor_id", Integer),
            column("constructor_ref", Text),
            column("constructor_name", Text),
            column("nationality", Text),
            column("url", Text),
        ];
        COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.constructor_id.into(),
            self.constructor_ref.as_str().into(),
            self.constructor_name.as_str().into(),
            self.nationality.as_str().into(),
            self.url.as_str().into(),
        ]
    }
}

impl TableRow for Driver {
    const ENTITY: Entity = Entity::Drivers;

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            column("driver_id", Integer),
            column("driver_ref", Text),
            column("driver_number", Integer),
            column("code", Text),
            column("forename", Text),
            column("surname", Text),
            column("dob", Text),
            column("nationality", Text),
            column("url", Text),
        ];
        COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.driver_id.into(),
            self.driver_ref.as_str().into(),
            self.driver_number.into(),
            self.code.as_str().into(),
            self.forename.as_str().into(),
            self.surname.as_str().into(),
            self.dob.into(),
            self.nationality.as_str().into(),
            self.url.as_str().into(),
        ]
    }
}

impl TableRow for Race {
    const ENTITY: Entity = Entity::Races;

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            column("race_id", Integer),
            column("year", Integer),
            column("round", Integer),
            column("circuit_id", Integer),
            column("race_name", Text),
            column("race_date", Text),
            column("race_time", Text),
            column("url", Text),
        ];
        COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.race_id.into(),
            self.year.into(),
            self.round.into(),
            self.circuit_id.into(),
            self.race_name.as_str().into(),
            self.race_date.into(),
            self.race_time.as_str().into(),
            self.url.as_str().into(),
        ]
    }
}

impl TableRow for RaceResult {
    const ENTITY: Entity = Entity::Results;

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            column("race_id", Integer),
            column("driver_id", Integer),
            column("constructor_id", Integer),
            column("number", Integer),
            column("grid", Integer),
            column("position", Integer),
            column("position_text", Text),
            column("position_order", Integer),
            column("points", Real),
            column("laps", Integer),
            column("time_result", Text),
            column("milliseconds", Integer),
            column("fastest_lap", Integer),
            column("fastest_lap_rank", Integer),
            column("fastest_lap_time", Text),
            column("fastest_lap_speed", Real),
            column("status_id", Integer),
        ];
        COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.race_id.into(),
            self.driver_id.into(),
            self.constructor_id.into(),
            self.number.into(),
            self.grid.into(),
            self.position.into(),
            self.position_text.as_str().into(),
            self.position_order.into(),
            self.points.into(),
            self.laps.into(),
            self.time_result.as_str().into(),
            self.milliseconds.into(),
            self.fastest_lap.into(),
            self.fastest_lap_rank.into(),
            self.fastest_lap_time.as_str().into(),
            self.fastest_lap_speed.into(),
            self.status_id.into(),
        ]
    }
}

impl TableRow for Qualifying {
    const ENTITY: Entity = Entity::Qualifying;

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            column("race_id", Integer),
            column("driver_id", Integer),
            column("constructor_id", Integer),
            column("number", Integer),
            column("position", Integer),
            column("q1", Text),
            column("q2", Text),
            column("q3", Text),
        ];
        COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.race_id.into(),
            self.driver_id.into(),
            self.constructor_id.into(),
            self.number.into(),
            self.position.into(),
            self.q1.as_str().into(),
            self.q2.as_str().into(),
            self.q3.as_str().into(),
        ]
    }
}

impl TableRow for PitStop {
    const ENTITY: Entity = Entity::PitStops;

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            column("race_id", Integer),
            column("driver_id", Integer),
            column("stop", Integer),
            column("lap", Integer),
            column("time_of_day", Text),
            column("duration", Text),
            column("milliseconds", Integer),
        ];
        COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.race_id.into(),
            self.driver_id.into(),
            self.stop.into(),
            self.lap.into(),
            self.time_of_day.as_str().into(),
            self.duration.as_str().into(),
            self.milliseconds.into(),
        ]
    }
}

impl TableRow for ConstructorStanding {
    const ENTITY: Entity = Entity::ConstructorStandings;

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            column("race_id", Integer),
            column("constructor_id", Integer),
            column("points", Real),
            column("position", Integer),
            column("position_text", Text),
            column("wins", Integer),
        ];
        COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.race_id.into(),
            self.constructor_id.into(),
            self.points.into(),
            self.position.into(),
            self.position_text.as_str().into(),
            self.wins.into(),
        ]
    }
}

impl TableRow for DriverStanding {
    const ENTITY: Entity = Entity::DriverStandings;

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            column("race_id", Integer),
            column("driver_id", Integer),
            column("points", Real),
            column("position", Integer),
            column("position_text", Text),
            column("wins", Integer),
        ];
        COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.race_id.into(),
            self.driver_id.into(),
            self.points.into(),
            self.position.into(),
            self.position_text.as_str().into(),
            self.wins.into(),
        ]
    }
}
