//! Upstream wire format
//!
//! Responses look like `{"MRData": {"total": "37", "CircuitTable": {"Circuits": [...]}}}`.
//! Scalar values are usually strings, occasionally numbers; nested collections are
//! usually arrays, occasionally a single object. The types below accept both.

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

/// Suffix shared by every table container key under `MRData`
pub const TABLE_SUFFIX: &str = "Table";

/// Nesting used by the standings endpoints
pub const STANDINGS_LISTS: &str = "StandingsLists";

/// One page of table records together with the upstream record count
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    /// `MRData.total`: number of matching records across all pages, when reported
    pub total: Option<u64>,
}

/// Locate the record list of a response
///
/// Looks up `MRData.<table_name>` first, then the first key ending in `Table`.
/// Inside the container the first array value is the record list, with a
/// `StandingsLists` key accepted as well. Anything else is an empty page.
pub fn extract_table(payload: &Value, table_name: &str) -> Page {
    let Some(mr_data) = payload.get("MRData").and_then(Value::as_object) else {
        return Page::default();
    };

    let total = mr_data.get("total").and_then(scalar_to_u64);

    let container = mr_data
        .get(table_name)
        .filter(|v| v.is_object())
        .or_else(|| {
            mr_data
                .iter()
                .find(|(key, value)| key.ends_with(TABLE_SUFFIX) && value.is_object())
                .map(|(_, value)| value)
        });

    let Some(container) = container.and_then(Value::as_object) else {
        return Page { items: Vec::new(), total };
    };

    let items = container
        .values()
        .find_map(|v| v.as_array().cloned())
        .or_else(|| container.get(STANDINGS_LISTS).map(one_or_many_values))
        .unwrap_or_default();

    Page { items, total }
}

fn scalar_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn one_or_many_values(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

// ============================================================================
// Lenient field decoders
// ============================================================================

/// Scalar as text: strings pass through, numbers and booleans are rendered,
/// null and blank strings become `None`
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Collection that may arrive as an array, a single object, or not at all
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => vec![other],
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
        .collect()
}

// ============================================================================
// Reference entities
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiCircuit {
    pub circuit_id: String,
    pub url: String,
    pub circuit_name: String,
    #[serde(rename = "Location")]
    pub location: ApiLocation,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiLocation {
    #[serde(deserialize_with = "opt_text")]
    pub lat: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub long: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub alt: Option<String>,
    pub locality: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiSeason {
    #[serde(deserialize_with = "opt_text")]
    pub season: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConstructor {
    pub constructor_id: String,
    pub url: String,
    pub name: String,
    pub nationality: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiDriver {
    pub driver_id: String,
    #[serde(deserialize_with = "opt_text")]
    pub permanent_number: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub code: Option<String>,
    pub url: String,
    pub given_name: String,
    pub family_name: String,
    #[serde(deserialize_with = "opt_text")]
    pub date_of_birth: Option<String>,
    pub nationality: String,
}

// ============================================================================
// Race-scoped entities
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiRace {
    #[serde(deserialize_with = "opt_text")]
    pub season: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub round: Option<String>,
    pub url: String,
    pub race_name: String,
    #[serde(rename = "Circuit")]
    pub circuit: ApiCircuit,
    #[serde(deserialize_with = "opt_text")]
    pub date: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub time: Option<String>,
    #[serde(rename = "Results", deserialize_with = "one_or_many")]
    pub results: Vec<ApiResult>,
    #[serde(rename = "QualifyingResults", deserialize_with = "one_or_many")]
    pub qualifying_results: Vec<ApiQualifying>,
    #[serde(rename = "PitStops", deserialize_with = "one_or_many")]
    pub pit_stops: Vec<ApiPitStop>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiResult {
    #[serde(deserialize_with = "opt_text")]
    pub number: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub position: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub position_text: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub points: Option<String>,
    #[serde(rename = "Driver")]
    pub driver: ApiDriver,
    #[serde(rename = "Constructor")]
    pub constructor: ApiConstructor,
    #[serde(deserialize_with = "opt_text")]
    pub grid: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub laps: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub status: Option<String>,
    #[serde(rename = "Time")]
    pub time: Option<ApiTime>,
    #[serde(rename = "FastestLap")]
    pub fastest_lap: Option<ApiFastestLap>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiTime {
    #[serde(deserialize_with = "opt_text")]
    pub millis: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiFastestLap {
    #[serde(deserialize_with = "opt_text")]
    pub rank: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub lap: Option<String>,
    #[serde(rename = "Time")]
    pub time: Option<ApiTime>,
    #[serde(rename = "AverageSpeed")]
    pub average_speed: Option<ApiAverageSpeed>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiAverageSpeed {
    pub units: String,
    #[serde(deserialize_with = "opt_text")]
    pub speed: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiQualifying {
    #[serde(deserialize_with = "opt_text")]
    pub number: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub position: Option<String>,
    #[serde(rename = "Driver")]
    pub driver: ApiDriver,
    #[serde(rename = "Constructor")]
    pub constructor: ApiConstructor,
    #[serde(rename = "Q1", deserialize_with = "opt_text")]
    pub q1: Option<String>,
    #[serde(rename = "Q2", deserialize_with = "opt_text")]
    pub q2: Option<String>,
    #[serde(rename = "Q3", deserialize_with = "opt_text")]
    pub q3: Option<String>,
}

/// Pit stops carry the driver slug inline; a nested `Driver` object is accepted too
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiPitStop {
    pub driver_id: String,
    #[serde(rename = "Driver")]
    pub driver: Option<ApiDriver>,
    #[serde(deserialize_with = "opt_text")]
    pub lap: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub stop: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub time: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub duration: Option<String>,
}

impl ApiPitStop {
    pub fn driver_ref(&self) -> &str {
        if !self.driver_id.is_empty() {
            return &self.driver_id;
        }
        self.driver.as_ref().map(|d| d.driver_id.as_str()).unwrap_or("")
    }
}

// ============================================================================
// Standings
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiStandingsList {
    #[serde(deserialize_with = "opt_text")]
    pub season: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub round: Option<String>,
    #[serde(rename = "DriverStandings", deserialize_with = "one_or_many")]
    pub driver_standings: Vec<ApiDriverStanding>,
    #[serde(rename = "ConstructorStandings", deserialize_with = "one_or_many")]
    pub constructor_standings: Vec<ApiConstructorStanding>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiDriverStanding {
    #[serde(deserialize_with = "opt_text")]
    pub position: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub position_text: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub points: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub wins: Option<String>,
    #[serde(rename = "Driver")]
    pub driver: ApiDriver,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConstructorStanding {
    #[serde(deserialize_with = "opt_text")]
    pub position: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub position_text: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub points: Option<String>,
    #[serde(deserialize_with = "opt_text")]
    pub wins: Option<String>,
    #[serde(rename = "Constructor")]
    pub constructor: ApiConstructor,
}
