//! SQL dialects
//!
//! A dialect knows how to quote identifiers, name column types and render
//! the handful of statements a load needs.

use crate::schema::TableSchema;
use crate::types::SqlType;
use serde::{Deserialize, Serialize};

/// Statement rendering for one SQL flavour
pub trait Dialect {
    /// Short name for logs and reports
    fn name(&self) -> &'static str;

    /// Quote an identifier so reserved words and special characters survive
    fn quote_identifier(&self, ident: &str) -> String;

    /// Column type name for a SQL type
    fn type_name(&self, sql_type: SqlType) -> &'static str;

    /// Statement dropping a table when it exists
    fn drop_table_if_exists(&self, table: &str) -> String;

    /// Statement creating a table with the schema's columns, in order
    fn create_table(&self, schema: &TableSchema) -> String {
        let columns: Vec<String> = schema
            .columns
            .iter()
            .map(|c| {
                format!(
                    "{} {}",
                    self.quote_identifier(&c.name),
                    self.type_name(c.sql_type)
                )
            })
            .collect();

        format!(
            "CREATE TABLE {} ({})",
            self.quote_identifier(&schema.name),
            columns.join(", ")
        )
    }

    /// INSERT statement with the given already-rendered values
    fn insert(&self, table: &str, values: &[String]) -> String {
        format!(
            "INSERT INTO {} VALUES ({})",
            self.quote_identifier(table),
            values.join(", ")
        )
    }

    /// INSERT statement with one `?` placeholder per column
    fn insert_placeholders(&self, table: &str, columns: usize) -> String {
        self.insert(table, &vec!["?".to_string(); columns])
    }
}

/// DuckDB, the live execution engine
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbDialect;

impl Dialect for DuckDbDialect {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn type_name(&self, sql_type: SqlType) -> &'static str {
        match sql_type {
            SqlType::Bit => "BOOLEAN",
            SqlType::Int => "BIGINT",
            SqlType::Float => "DOUBLE",
            SqlType::DateTime => "TIMESTAMP",
            SqlType::Text => "VARCHAR",
        }
    }

    fn drop_table_if_exists(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", self.quote_identifier(table))
    }
}

/// Microsoft SQL Server (T-SQL)
#[derive(Debug, Clone, Copy, Default)]
pub struct TsqlDialect;

impl Dialect for TsqlDialect {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("[{}]", ident.replace(']', "]]"))
    }

    fn type_name(&self, sql_type: SqlType) -> &'static str {
        match sql_type {
            SqlType::Bit => "BIT",
            SqlType::Int => "INT",
            SqlType::Float => "FLOAT",
            SqlType::DateTime => "DATETIME",
            SqlType::Text => "NVARCHAR(MAX)",
        }
    }

    fn drop_table_if_exists(&self, table: &str) -> String {
        let quoted = self.quote_identifier(table);
        format!(
            "IF OBJECT_ID(N'{}', N'U') IS NOT NULL DROP TABLE {}",
            quoted.replace('\'', "''"),
            quoted
        )
    }
}

/// Dialect selection for configuration and the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    Tsql,
    Duckdb,
}

impl DialectKind {
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            DialectKind::Tsql => &TsqlDialect,
            DialectKind::Duckdb => &DuckDbDialect,
        }
    }
}

impl std::str::FromStr for DialectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsql" | "mssql" | "sqlserver" => Ok(DialectKind::Tsql),
            "duckdb" => Ok(DialectKind::Duckdb),
            other => Err(format!("Unknown SQL dialect: {other}")),
        }
    }
}
