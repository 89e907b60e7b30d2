//! Read → infer → load pipeline
//!
//! [`migrate`] replaces the target table with the contents of a record set:
//! drop, create, then one parameterized INSERT per row, all inside a single
//! transaction. Nothing is committed unless every statement succeeds.

use crate::database::{to_duckdb_value, Session};
use crate::dbf::{DbfReader, ReadOptions};
use crate::error::{Error, Result};
use crate::schema::{infer_schema, table_name_for, ColumnDef, TableSchema};
use crate::sql::{coerce_row, ddl_statements};
use crate::types::RecordSet;
use duckdb::types::Value as DuckValue;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Outcome of a successful migration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationReport {
    pub table: String,
    pub target: String,
    pub columns: Vec<ColumnDef>,
    pub rows_read: usize,
    pub rows_inserted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<PathBuf>,
    /// Fields that failed to decode and were loaded as null
    pub invalid_fields: usize,
    pub duration_ms: u64,
}

/// Replace the schema's table in the target with the given records
pub fn migrate(
    session: &mut Session,
    records: &RecordSet,
    schema: &TableSchema,
) -> Result<MigrationReport> {
    if records.columns().len() != schema.columns.len() {
        return Err(Error::load(format!(
            "Record set has {} columns but table {} has {}",
            records.columns().len(),
            schema.name,
            schema.columns.len()
        )));
    }

    let start = Instant::now();
    let dialect = session.dialect();
    let target = session.connection_info();
    let types = schema.types();

    tracing::info!(
        "Loading {} rows into {} ({})",
        records.len(),
        schema.name,
        target
    );

    let tx = session.transaction()?;

    for statement in ddl_statements(dialect, schema) {
        tracing::debug!("Executing: {}", statement);
        tx.execute_batch(&statement)
            .map_err(|e| Error::load(format!("{e}")))?;
    }

    let insert_sql = dialect.insert_placeholders(&schema.name, schema.columns.len());
    tracing::debug!("Prepared: {}", insert_sql);

    let mut inserted = 0;
    {
        let mut stmt = tx
            .prepare(&insert_sql)
            .map_err(|e| Error::load(format!("Failed to prepare insert: {e}")))?;

        for (index, row) in records.rows().iter().enumerate() {
            let params: Vec<DuckValue> = coerce_row(row, &types)
                .iter()
                .map(to_duckdb_value)
                .collect();
            inserted += stmt
                .execute(duckdb::params_from_iter(params))
                .map_err(|e| Error::load(format!("Row {}: {e}", index + 1)))?;
        }
    }

    tx.commit()
        .map_err(|e| Error::load(format!("Commit failed: {e}")))?;

    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::info!(
        "Loaded {} rows into {} in {}ms",
        inserted,
        schema.name,
        duration_ms
    );

    Ok(MigrationReport {
        table: schema.name.clone(),
        target,
        columns: schema.columns.clone(),
        rows_read: records.len(),
        rows_inserted: inserted,
        source: None,
        memo: None,
        invalid_fields: 0,
        duration_ms,
    })
}

/// Read a table file, infer its schema and load it
///
/// The table name defaults to the file's base name. A read failure is
/// returned before anything touches the target.
pub fn migrate_file(
    session: &mut Session,
    path: &Path,
    options: &ReadOptions,
    table: Option<&str>,
) -> Result<MigrationReport> {
    let table_name = match table {
        Some(name) => name.to_string(),
        None => table_name_for(path).ok_or_else(|| {
            Error::config(format!("Cannot derive a table name from {}", path.display()))
        })?,
    };

    let dbf = DbfReader::new(options.clone()).read(path)?;
    let schema = infer_schema(table_name, &dbf.records);

    let mut report = migrate(session, &dbf.records, &schema)?;
    report.source = Some(path.to_path_buf());
    report.memo = dbf.memo_path;
    report.invalid_fields = dbf.invalid_fields;
    Ok(report)
}

#[cfg(test)]
mod tests;
