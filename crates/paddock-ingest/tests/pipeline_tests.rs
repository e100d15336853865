//! End-to-end pipeline tests
//!
//! A mock Ergast server serves one short season; the pipeline runs against a
//! temporary staging area and a temporary SQLite file.

use paddock_ingest::config::{
    ApiConfig, DatabaseConfig, ExtractionConfig, IngestConfig, StagingConfig,
};
use paddock_ingest::models::{ConstructorRow, DriverRow, Entity, ResultRow, Season};
use paddock_ingest::staging::Stage;
use paddock_ingest::{Pipeline, RunOptions};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

// ============================================================================
// Fixtures
// ============================================================================

fn mr_data(table: &str, list: &str, items: Value) -> Value {
    let total = items.as_array().map(Vec::len).unwrap_or(0);
    json!({
        "MRData": {
            "limit": "100",
            "offset": "0",
            "total": total.to_string(),
            table: { list: items }
        }
    })
}

fn driver(id: &str, given: &str, family: &str) -> Value {
    json!({ "driverId": id, "givenName": given, "familyName": family, "nationality": "Unknown" })
}

fn constructor(id: &str, name: &str) -> Value {
    json!({ "constructorId": id, "name": name, "nationality": "Unknown" })
}

fn result(position: &str, text: &str, driver_id: &str, constructor_id: &str, status: &str) -> Value {
    json!({
        "position": position,
        "positionText": text,
        "points": if position == "1" { "25" } else { "0" },
        "grid": position,
        "laps": "57",
        "status": status,
        "Driver": { "driverId": driver_id },
        "Constructor": { "constructorId": constructor_id }
    })
}

async fn mount(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{endpoint}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a two-race 2024 season
async fn mock_season(server: &MockServer) {
    mount(
        server,
        "circuits",
        mr_data(
            "CircuitTable",
            "Circuits",
            json!([
                { "circuitId": "bahrain", "circuitName": "Bahrain International Circuit",
                  "Location": { "lat": "26.0325", "long": "50.5106", "locality": "Sakhir", "country": "Bahrain" } },
                { "circuitId": "jeddah", "circuitName": "Jeddah Corniche Circuit",
                  "Location": { "locality": "Jeddah", "country": "Saudi Arabia" } }
            ]),
        ),
    )
    .await;

    mount(
        server,
        "seasons",
        mr_data("SeasonTable", "Seasons", json!([{ "season": "2024", "url": "https://example.org/2024" }])),
    )
    .await;

    mount(
        server,
        "constructors",
        mr_data(
            "ConstructorTable",
            "Constructors",
            json!([constructor("red_bull", "Red Bull"), constructor("ferrari", "Ferrari")]),
        ),
    )
    .await;

    mount(
        server,
        "drivers",
        mr_data(
            "DriverTable",
            "Drivers",
            json!([
                driver("max_verstappen", "Max", "Verstappen"),
                driver("leclerc", "Charles", "Leclerc")
            ]),
        ),
    )
    .await;

    mount(
        server,
        "2024/races",
        mr_data(
            "RaceTable",
            "Races",
            json!([
                { "season": "2024", "round": "1", "raceName": "Bahrain Grand Prix",
                  "Circuit": { "circuitId": "bahrain" }, "date": "2024-03-02", "time": "15:00:00Z" },
                { "season": "2024", "round": "2", "raceName": "Saudi Arabian Grand Prix",
                  "Circuit": { "circuitId": "jeddah" }, "date": "2024-03-09" }
            ]),
        ),
    )
    .await;

    mount(
        server,
        "2024/results",
        mr_data(
            "RaceTable",
            "Races",
            json!([
                { "season": "2024", "round": "1", "Results": [
                    result("1", "1", "max_verstappen", "red_bull", "Finished"),
                    result("2", "2", "leclerc", "ferrari", "+1 Lap")
                ]},
                { "season": "2024", "round": "2", "Results": [
                    result("1", "1", "max_verstappen", "red_bull", "Finished"),
                    { "positionText": "R", "status": "Hydraulics",
                      "Driver": { "driverId": "ghost" }, "Constructor": { "constructorId": "ferrari" } }
                ]}
            ]),
        ),
    )
    .await;

    mount(
        server,
        "2024/qualifying",
        mr_data(
            "RaceTable",
            "Races",
            json!([
                { "season": "2024", "round": "1", "QualifyingResults": [
                    { "number": "1", "position": "1", "Driver": { "driverId": "max_verstappen" },
                      "Constructor": { "constructorId": "red_bull" }, "Q1": "1:30.031", "Q2": "1:29.374", "Q3": "1:29.179" }
                ]}
            ]),
        ),
    )
    .await;

    mount(
        server,
        "2024/pitstops",
        mr_data(
            "RaceTable",
            "Races",
            json!([
                { "season": "2024", "round": "1", "PitStops": [
                    { "driverId": "leclerc", "lap": "17", "stop": "1", "time": "18:21:07", "duration": "21.5" }
                ]}
            ]),
        ),
    )
    .await;

    mount(
        server,
        "2024/1/constructorStandings",
        mr_data(
            "StandingsTable",
            "StandingsLists",
            json!([{ "season": "2024", "round": "1", "ConstructorStandings": [
                { "position": "1", "positionText": "1", "points": "44", "wins": "1",
                  "Constructor": { "constructorId": "red_bull" } }
            ]}]),
        ),
    )
    .await;

    mount(
        server,
        "2024/1/driverStandings",
        mr_data(
            "StandingsTable",
            "StandingsLists",
            json!([{ "season": "2024", "round": "1", "DriverStandings": [
                { "position": "1", "positionText": "1", "points": "26", "wins": "1",
                  "Driver": { "driverId": "max_verstappen" } },
                { "position": "2", "positionText": "2", "points": "18", "wins": "0",
                  "Driver": { "driverId": "leclerc" } }
            ]}]),
        ),
    )
    .await;
    // Round 2 standings are left unmounted: the 404 reads as "no standings yet"
}

fn config(server: &MockServer, dir: &TempDir) -> IngestConfig {
    IngestConfig {
        api: ApiConfig {
            base_url: server.uri(),
            rate_limit_delay_ms: 0,
            timeout_secs: 5,
            page_size: 100,
            max_retries: 0,
            retry_backoff_ms: 10,
        },
        extraction: ExtractionConfig {
            start_year: 2024,
            end_year: 2024,
            pit_stop_first_year: 2012,
            max_standings_rounds: 2,
        },
        staging: StagingConfig {
            raw_dir: dir.path().join("raw"),
            processed_dir: dir.path().join("processed"),
        },
        database: DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("f1.db").display()),
        },
    }
}

async fn open(config: &IngestConfig) -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&config.database.url)
        .await
        .unwrap()
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query(&format!("SELECT COUNT(*) AS n FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
        .get("n")
}

type ResultKey = (i64, i64, i64, i64, f64, i64);

async fn results(pool: &SqlitePool) -> Vec<ResultKey> {
    sqlx::query(
        "SELECT race_id, driver_id, constructor_id, position_order, points, status_id \
         FROM results ORDER BY race_id, position_order",
    )
    .fetch_all(pool)
    .await
    .unwrap()
    .into_iter()
    .map(|row| {
        (
            row.get("race_id"),
            row.get("driver_id"),
            row.get("constructor_id"),
            row.get("position_order"),
            row.get("points"),
            row.get("status_id"),
        )
    })
    .collect()
}

// ============================================================================
// Full runs
// ============================================================================

#[tokio::test]
async fn test_full_run_loads_every_table() {
    let server = MockServer::start().await;
    mock_season(&server).await;
    let dir = TempDir::new().unwrap();
    let config = config(&server, &dir);

    let summary = Pipeline::new(config.clone())
        .unwrap()
        .run(RunOptions::default())
        .await
        .unwrap();

    let extract = summary.extract.as_ref().unwrap();
    assert!(extract.is_clean());
    assert_eq!(extract.rows(Entity::Results), Some(4));
    assert_eq!(extract.rows(Entity::ConstructorStandings), Some(1));
    assert!(summary.transform.as_ref().unwrap().is_clean());
    assert_eq!(summary.load.as_ref().unwrap().rows(Entity::DriverStandings), Some(2));

    let pool = open(&config).await;
    assert_eq!(count(&pool, "seasons").await, 1);
    assert_eq!(count(&pool, "circuits").await, 2);
    assert_eq!(count(&pool, "drivers").await, 2);
    assert_eq!(count(&pool, "races").await, 2);
    assert_eq!(count(&pool, "qualifying").await, 1);
    assert_eq!(count(&pool, "pit_stops").await, 1);

    assert_eq!(
        results(&pool).await,
        vec![
            (202401, 1, 1, 1, 25.0, 1),
            (202401, 2, 2, 2, 0.0, 11),
            (202402, 1, 1, 1, 25.0, 1),
            // unknown driver, unclassified, status outside the vocabulary
            (202402, 0, 2, 999, 0.0, 14),
        ]
    );

    let race = sqlx::query("SELECT circuit_id, race_time FROM races WHERE race_id = 202401")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(race.get::<i64, _>("circuit_id"), 1);
    assert_eq!(race.get::<String, _>("race_time"), "15:00:00");

    let stop = sqlx::query("SELECT driver_id, milliseconds FROM pit_stops")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stop.get::<i64, _>("driver_id"), 2);
    assert_eq!(stop.get::<i64, _>("milliseconds"), 21_500);

    let standing = sqlx::query(
        "SELECT race_id, driver_id, points FROM driver_standings WHERE driver_id = 1",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(standing.get::<i64, _>("race_id"), 202401);
    assert_eq!(standing.get::<f64, _>("points"), 26.0);
}

#[tokio::test]
async fn test_rerun_produces_identical_tables() {
    let server = MockServer::start().await;
    mock_season(&server).await;
    let dir = TempDir::new().unwrap();
    let config = config(&server, &dir);
    let pipeline = Pipeline::new(config.clone()).unwrap();

    pipeline.run(RunOptions::default()).await.unwrap();
    let pool = open(&config).await;
    let first = results(&pool).await;
    let first_drivers = count(&pool, "drivers").await;
    pool.close().await;

    pipeline.run(RunOptions::default()).await.unwrap();
    let pool = open(&config).await;

    assert_eq!(results(&pool).await, first);
    assert_eq!(count(&pool, "drivers").await, first_drivers);
    assert_eq!(count(&pool, "results").await, 4);
}

#[tokio::test]
async fn test_empty_year_does_not_abort_the_range() {
    let server = MockServer::start().await;
    mock_season(&server).await;
    // 2023 serves an empty race table; its other endpoints 404
    mount(&server, "2023/races", mr_data("RaceTable", "Races", json!([]))).await;

    let dir = TempDir::new().unwrap();
    let mut config = config(&server, &dir);
    config.extraction.start_year = 2023;

    let summary = Pipeline::new(config.clone())
        .unwrap()
        .run(RunOptions::default())
        .await
        .unwrap();

    let extract = summary.extract.as_ref().unwrap();
    assert!(extract.is_clean());
    assert_eq!(extract.rows(Entity::Races), Some(2));
    assert_eq!(extract.rows(Entity::Results), Some(4));
    assert_eq!(extract.rows(Entity::DriverStandings), Some(2));
    assert!(summary.is_clean());

    let pool = open(&config).await;
    assert_eq!(count(&pool, "races").await, 2);
    assert_eq!(count(&pool, "pit_stops").await, 1);
    assert_eq!(results(&pool).await.len(), 4);
    let earliest: i64 = sqlx::query("SELECT MIN(race_id) AS id FROM races")
        .fetch_one(&pool)
        .await
        .unwrap()
        .get("id");
    assert_eq!(earliest, 202401);
}

#[tokio::test]
async fn test_unreachable_api_leaves_empty_staging() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config(&server, &dir);

    let summary = Pipeline::new(config.clone())
        .unwrap()
        .run(RunOptions {
            skip_load: true,
            ..RunOptions::default()
        })
        .await
        .unwrap();

    let extract = summary.extract.unwrap();
    assert!(extract.is_clean());
    assert_eq!(extract.total_rows(), 0);
    assert!(summary.load.is_none());

    let pipeline = Pipeline::new(config).unwrap();
    let drivers: Vec<DriverRow> = pipeline.staging().read(Stage::Raw, Entity::Drivers).unwrap();
    assert!(drivers.is_empty());
}

// ============================================================================
// Skipped stages
// ============================================================================

#[tokio::test]
async fn test_skip_extract_uses_staged_files() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config(&server, &dir);
    let pipeline = Pipeline::new(config.clone()).unwrap();
    let staging = pipeline.staging();

    staging
        .write(
            Stage::Raw,
            Entity::Seasons,
            &[Season {
                year: 2023,
                url: String::new(),
            }],
        )
        .unwrap();
    staging
        .write(
            Stage::Raw,
            Entity::Drivers,
            &[DriverRow {
                driver_ref: "alonso".to_string(),
                ..DriverRow::default()
            }],
        )
        .unwrap();
    staging
        .write(
            Stage::Raw,
            Entity::Constructors,
            &[ConstructorRow {
                constructor_ref: "aston_martin".to_string(),
                ..ConstructorRow::default()
            }],
        )
        .unwrap();
    staging
        .write(
            Stage::Raw,
            Entity::Results,
            &[ResultRow {
                race_id: 202301,
                driver_ref: "alonso".to_string(),
                constructor_ref: "aston_martin".to_string(),
                position: Some("3".to_string()),
                points: Some("15".to_string()),
                status: Some("Finished".to_string()),
                ..ResultRow::default()
            }],
        )
        .unwrap();

    let summary = pipeline
        .run(RunOptions {
            skip_extract: true,
            ..RunOptions::default()
        })
        .await
        .unwrap();

    assert!(summary.extract.is_none());
    let transform = summary.transform.unwrap();
    assert!(transform.failures.contains_key(&Entity::Circuits));
    assert_eq!(transform.rows(Entity::Results), Some(1));

    let pool = open(&config).await;
    assert_eq!(results(&pool).await, vec![(202301, 1, 1, 3, 15.0, 1)]);
    assert_eq!(count(&pool, "seasons").await, 1);
}
