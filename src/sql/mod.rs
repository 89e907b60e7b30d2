//! SQL generation
//!
//! Turns an inferred schema and a record set into statements for a target
//! database:
//!
//! - [`literal`]: value coercion per column type and SQL literal rendering
//! - [`dialect`]: identifier quoting, type names and statement shapes
//! - [`statements`]: DDL, INSERT and full-script builders

mod dialect;
mod literal;
mod statements;

pub use dialect::{Dialect, DialectKind, DuckDbDialect, TsqlDialect};
pub use literal::{coerce, coerce_row, parse_timestamp, quote_text, SqlValue, TIMESTAMP_FORMAT};
pub use statements::{ddl_statements, insert_literal, load_statements, render_script};
