//! Target database support via DuckDB
//!
//! This module provides the load-side connection. DuckDB is the execution
//! engine: it writes its own database files and reaches SQLite and
//! PostgreSQL targets through its extensions.

mod session;
mod target;

pub use session::{to_duckdb_value, Session};
pub use target::{TargetConfig, TargetEngine};
