//! DuckDB-backed database session
//!
//! A [`Session`] owns one DuckDB connection for the whole run. Native DuckDB
//! targets are opened directly; SQLite and PostgreSQL targets are attached
//! through DuckDB extensions and made the default catalog, so statements
//! can use unqualified table names everywhere.

use super::target::{TargetConfig, TargetEngine};
use crate::error::{Error, Result};
use crate::sql::{quote_text, Dialect, DuckDbDialect, SqlValue};
use crate::types::JsonValue;
use duckdb::types::{TimeUnit, Value as DuckValue};
use duckdb::{Connection, Transaction};

/// Alias of the attached target database
const TARGET_ALIAS: &str = "target_db";

/// An open connection to a load target
pub struct Session {
    conn: Connection,
    target: TargetConfig,
    connection_string: String,
}

impl Session {
    /// Open the target and verify it answers queries
    pub fn connect(target: &TargetConfig) -> Result<Self> {
        let connection_string = target.connection_string()?;

        let conn = match target.engine {
            TargetEngine::Duckdb if connection_string == ":memory:" => {
                Connection::open_in_memory()
            }
            TargetEngine::Duckdb => Connection::open(&connection_string),
            TargetEngine::Sqlite | TargetEngine::Postgres => Connection::open_in_memory(),
        }
        .map_err(|e| Error::connection(format!("Failed to open DuckDB connection: {e}")))?;

        let session = Self {
            conn,
            target: target.clone(),
            connection_string,
        };

        session.attach_target()?;
        session.check_connection()?;

        tracing::info!("Connected to {}", session.connection_info());
        Ok(session)
    }

    /// Attach an external target and make it the default catalog
    fn attach_target(&self) -> Result<()> {
        let (extension, type_name, default_schema) = match self.target.engine {
            TargetEngine::Duckdb => return Ok(()),
            TargetEngine::Sqlite => ("sqlite", "SQLITE", TARGET_ALIAS.to_string()),
            TargetEngine::Postgres => ("postgres", "POSTGRES", format!("{TARGET_ALIAS}.public")),
        };

        self.conn
            .execute_batch(&format!("INSTALL {extension}; LOAD {extension};"))
            .map_err(|e| {
                Error::connection(format!("Failed to load {extension} extension: {e}"))
            })?;

        let attach_sql = format!(
            "ATTACH {} AS {TARGET_ALIAS} (TYPE {type_name}); USE {default_schema};",
            quote_text(&self.connection_string)
        );
        self.conn.execute_batch(&attach_sql).map_err(|e| {
            Error::connection(format!(
                "Failed to attach {} database: {e}",
                self.target.engine
            ))
        })?;

        Ok(())
    }

    /// Test the connection with a trivial query against the target
    pub fn check_connection(&self) -> Result<()> {
        let query = match self.target.engine {
            TargetEngine::Postgres => "SELECT 1 FROM target_db.pg_catalog.pg_tables LIMIT 1",
            TargetEngine::Sqlite => "SELECT 1 FROM target_db.sqlite_master LIMIT 1",
            TargetEngine::Duckdb => "SELECT 1",
        };

        let mut stmt = self
            .conn
            .prepare(query)
            .map_err(|e| Error::connection(format!("Connection check failed: {e}")))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| Error::connection(format!("Connection check failed: {e}")))?;
        rows.next()
            .map_err(|e| Error::connection(format!("Connection check failed: {e}")))?;

        Ok(())
    }

    /// Dialect of statements run through this session
    pub fn dialect(&self) -> &'static dyn Dialect {
        &DuckDbDialect
    }

    /// Target description for logging
    pub fn connection_info(&self) -> String {
        self.target.describe()
    }

    /// Run statements outside of any explicit transaction
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        tracing::debug!("Executing: {}", sql);
        self.conn
            .execute_batch(sql)
            .map_err(|e| Error::load(format!("{e}")))
    }

    /// Start the transaction a load runs in
    ///
    /// Dropping the transaction without committing rolls it back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        self.conn
            .transaction()
            .map_err(|e| Error::load(format!("Failed to start transaction: {e}")))
    }

    /// Whether a table exists in the target
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_catalog = current_database() AND table_name = ?",
                [table],
                |row| row.get(0),
            )
            .map_err(|e| Error::load(format!("Failed to look up table {table}: {e}")))?;
        Ok(count > 0)
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.dialect().quote_identifier(table));
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| Error::load(format!("Failed to count rows of {table}: {e}")))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Column names of a table, in table order
    pub fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let rows = self.query_json(&format!(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_catalog = current_database() AND table_name = {} \
             ORDER BY ordinal_position",
            quote_text(table)
        ))?;

        Ok(rows
            .into_iter()
            .filter_map(|mut row| match row.pop() {
                Some(JsonValue::String(name)) => Some(name),
                _ => None,
            })
            .collect())
    }

    /// Run a query and return every row as JSON values
    pub fn query_json(&self, sql: &str) -> Result<Vec<Vec<JsonValue>>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| Error::load(format!("Failed to prepare query: {e}")))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| Error::load(format!("Query failed: {e}")))?;

        let mut result = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| Error::load(format!("Query failed: {e}")))?
        {
            let width = row.as_ref().column_count();
            let mut values = Vec::with_capacity(width);
            for index in 0..width {
                let value: DuckValue = row
                    .get(index)
                    .map_err(|e| Error::load(format!("Failed to read column {index}: {e}")))?;
                values.push(duckdb_value_to_json(value));
            }
            result.push(values);
        }

        Ok(result)
    }
}

/// Convert a coerced column value to a DuckDB parameter
pub fn to_duckdb_value(value: &SqlValue) -> DuckValue {
    match value {
        SqlValue::Null => DuckValue::Null,
        SqlValue::Bit(b) => DuckValue::Boolean(*b),
        SqlValue::Integer(i) => DuckValue::BigInt(*i),
        SqlValue::Float(f) => DuckValue::Double(*f),
        SqlValue::Timestamp(ts) => {
            DuckValue::Timestamp(TimeUnit::Microsecond, ts.and_utc().timestamp_micros())
        }
        SqlValue::Text(s) => DuckValue::Text(s.clone()),
    }
}

/// Convert a DuckDB value to JSON
fn duckdb_value_to_json(value: DuckValue) -> JsonValue {
    match value {
        DuckValue::Null => JsonValue::Null,
        DuckValue::Boolean(b) => JsonValue::Bool(b),
        DuckValue::TinyInt(i) => JsonValue::Number(i.into()),
        DuckValue::SmallInt(i) => JsonValue::Number(i.into()),
        DuckValue::Int(i) => JsonValue::Number(i.into()),
        DuckValue::BigInt(i) => JsonValue::Number(i.into()),
        DuckValue::HugeInt(i) => JsonValue::String(i.to_string()),
        DuckValue::UTinyInt(i) => JsonValue::Number(i.into()),
        DuckValue::USmallInt(i) => JsonValue::Number(i.into()),
        DuckValue::UInt(i) => JsonValue::Number(i.into()),
        DuckValue::UBigInt(i) => JsonValue::Number(i.into()),
        DuckValue::Float(f) => {
            serde_json::Number::from_f64(f64::from(f)).map_or(JsonValue::Null, JsonValue::Number)
        }
        DuckValue::Double(f) => {
            serde_json::Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number)
        }
        DuckValue::Text(s) => JsonValue::String(s),
        DuckValue::Blob(b) => JsonValue::String(format!("<{} bytes>", b.len())),
        DuckValue::Timestamp(unit, t) => {
            let micros = match unit {
                TimeUnit::Second => t.saturating_mul(1_000_000),
                TimeUnit::Millisecond => t.saturating_mul(1_000),
                TimeUnit::Microsecond => t,
                TimeUnit::Nanosecond => t / 1_000,
            };
            chrono::DateTime::from_timestamp_micros(micros)
                .map(|dt| {
                    JsonValue::String(dt.naive_utc().format("%Y-%m-%d %H:%M:%S%.f").to_string())
                })
                .unwrap_or(JsonValue::Number(t.into()))
        }
        DuckValue::Date32(d) => {
            // 719163 days from 1 CE to 1970-01-01
            chrono::NaiveDate::from_num_days_from_ce_opt(d + 719_163)
                .map(|date| JsonValue::String(date.format("%Y-%m-%d").to_string()))
                .unwrap_or(JsonValue::Number(d.into()))
        }
        other => JsonValue::String(format!("{other:?}")),
    }
}
