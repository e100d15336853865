//! Storage sinks
//!
//! A [`Sink`] receives one fully materialized [`Table`] at a time and replaces
//! whatever it held under that name. Clean row types describe their own layout via
//! [`TableRow`], so the sink never needs to know about entities.

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteSink;

use crate::error::Result;
use crate::models::Entity;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Storage class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Real,
    Text,
}

impl SqlType {
    pub fn as_sql(self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
}

pub const fn column(name: &'static str, sql_type: SqlType) -> Column {
    Column { name, sql_type }
}

/// One cell
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Null,
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

/// Dates are stored as ISO-8601 text
impl From<NaiveDate> for SqlValue {
    fn from(value: NaiveDate) -> Self {
        SqlValue::Text(value.format("%Y-%m-%d").to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// A row type with a fixed table layout
pub trait TableRow {
    const ENTITY: Entity;

    fn columns() -> &'static [Column];

    /// Cell values in [`TableRow::columns`] order
    fn values(&self) -> Vec<SqlValue>;
}

/// A named, typed, fully materialized table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl Table {
    pub fn from_rows<T: TableRow>(rows: &[T]) -> Self {
        Self {
            name: T::ENTITY.table_name().to_string(),
            columns: T::columns().to_vec(),
            rows: rows.iter().map(TableRow::values).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Destination of normalized tables
///
/// `load` replaces the table named `table.name` with exactly the given rows and
/// returns the number of rows written. Any error is fatal for the run.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn load(&self, table: &Table) -> Result<u64>;
}
