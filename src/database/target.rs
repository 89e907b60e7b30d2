//! Target database description

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Database engine of a load target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetEngine {
    /// Native DuckDB database file, or `:memory:`
    #[default]
    Duckdb,
    /// SQLite database file, written through DuckDB's sqlite extension
    Sqlite,
    /// PostgreSQL server, written through DuckDB's postgres extension
    Postgres,
}

impl std::str::FromStr for TargetEngine {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "duckdb" => Ok(TargetEngine::Duckdb),
            "sqlite" => Ok(TargetEngine::Sqlite),
            "postgres" | "postgresql" => Ok(TargetEngine::Postgres),
            other => Err(format!("Unknown target engine: {other}")),
        }
    }
}

impl std::fmt::Display for TargetEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TargetEngine::Duckdb => "duckdb",
            TargetEngine::Sqlite => "sqlite",
            TargetEngine::Postgres => "postgres",
        };
        f.write_str(name)
    }
}

/// Where a load goes
///
/// Authentication is always the operating-system identity of the running
/// process: there are no user, password, port or TLS settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub engine: TargetEngine,
    /// Database file path (`duckdb`, `sqlite`) or database name (`postgres`)
    pub database: String,
    /// Server host, `postgres` only
    pub server: Option<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            engine: TargetEngine::Duckdb,
            database: ":memory:".to_string(),
            server: None,
        }
    }
}

impl TargetConfig {
    pub fn duckdb(database: impl Into<String>) -> Self {
        Self {
            engine: TargetEngine::Duckdb,
            database: database.into(),
            server: None,
        }
    }

    pub fn sqlite(database: impl Into<String>) -> Self {
        Self {
            engine: TargetEngine::Sqlite,
            database: database.into(),
            server: None,
        }
    }

    pub fn postgres(server: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            engine: TargetEngine::Postgres,
            database: database.into(),
            server: Some(server.into()),
        }
    }

    /// Check that the settings needed by the engine are present
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(Error::config("Target database must not be empty"));
        }
        match self.engine {
            TargetEngine::Postgres => {
                if self.server.as_deref().unwrap_or_default().trim().is_empty() {
                    return Err(Error::config("Postgres target requires a server"));
                }
            }
            TargetEngine::Sqlite if self.database == ":memory:" => {
                return Err(Error::config("SQLite target requires a database file"));
            }
            _ => {}
        }
        Ok(())
    }

    /// Connection string handed to DuckDB
    pub fn connection_string(&self) -> Result<String> {
        self.validate()?;

        match self.engine {
            TargetEngine::Duckdb | TargetEngine::Sqlite => Ok(self.database.clone()),
            TargetEngine::Postgres => {
                // libpq key/value form; no credentials so the OS identity is used
                let host = self.server.as_deref().unwrap_or("localhost");
                Ok(format!(
                    "host={} dbname={}",
                    libpq_value(host),
                    libpq_value(&self.database)
                ))
            }
        }
    }

    /// Human readable description for logs and reports
    pub fn describe(&self) -> String {
        match (&self.engine, &self.server) {
            (TargetEngine::Postgres, Some(server)) => {
                format!("postgres://{}/{}", server, self.database)
            }
            (engine, _) => format!("{}:{}", engine, self.database),
        }
    }
}

fn libpq_value(value: &str) -> String {
    if !value.is_empty() && !value.contains([' ', '\'', '\\']) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
