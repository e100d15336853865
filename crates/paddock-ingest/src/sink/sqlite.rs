//! SQLite sink
//!
//! Every load drops the target table, recreates it from the column layout and
//! inserts all rows inside one transaction, so readers see either the previous
//! table or the complete new one.

use super::{Sink, SqlValue, Table};
use crate::error::{IngestError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// SQLite caps host parameters per statement at 32766
const MAX_BIND_PARAMS: usize = 32_766;

const MAX_ROWS_PER_INSERT: usize = 500;

pub struct SqliteSink {
    pool: SqlitePool,
}

impl SqliteSink {
    /// Open (creating if needed) the database at `url`, e.g. `sqlite://f1_analytics.db`
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        info!(url, "Connected to SQLite sink");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Quote an identifier for SQLite
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_table_sql(table: &Table) -> String {
    let columns = table
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(c.name), c.sql_type.as_sql()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({})", quote_ident(&table.name), columns)
}

fn insert_prefix(table: &Table) -> String {
    let columns = table
        .columns
        .iter()
        .map(|c| quote_ident(c.name))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {} ({}) ", quote_ident(&table.name), columns)
}

fn validate(table: &Table) -> Result<()> {
    if table.columns.is_empty() {
        return Err(IngestError::sink(format!("Table '{}' has no columns", table.name)));
    }
    if let Some((index, row)) = table
        .rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != table.columns.len())
    {
        return Err(IngestError::sink(format!(
            "Row {} of '{}' has {} values, expected {}",
            index,
            table.name,
            row.len(),
            table.columns.len()
        )));
    }
    Ok(())
}

#[async_trait]
impl Sink for SqliteSink {
    async fn load(&self, table: &Table) -> Result<u64> {
        if table.is_empty() {
            warn!(table = %table.name, "No rows to load, leaving table untouched");
            return Ok(0);
        }
        validate(table)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote_ident(&table.name)))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&create_table_sql(table))
            .execute(&mut *tx)
            .await?;

        let rows_per_insert = (MAX_BIND_PARAMS / table.columns.len()).clamp(1, MAX_ROWS_PER_INSERT);
        let prefix = insert_prefix(table);
        let mut written = 0u64;

        for chunk in table.rows.chunks(rows_per_insert) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(prefix.as_str());
            builder.push_values(chunk, |mut separated, row| {
                for value in row {
                    match value {
                        SqlValue::Integer(v) => {
                            separated.push_bind(*v);
                        },
                        SqlValue::Real(v) => {
                            separated.push_bind(*v);
                        },
                        SqlValue::Text(v) => {
                            separated.push_bind(v.clone());
                        },
                        SqlValue::Null => {
                            separated.push_bind(None::<i64>);
                        },
                    }
                }
            });

            written += builder.build().execute(&mut *tx).await?.rows_affected();
            debug!(table = %table.name, written, "Inserted batch");
        }

        tx.commit().await?;
        info!(table = %table.name, rows = written, "Loaded table");
        Ok(written)
    }
}
