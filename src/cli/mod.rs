//! CLI module
//!
//! Command-line interface for migrating dBASE tables.
//!
//! # Commands
//!
//! - `inspect` - Show header, data preview and inferred schema
//! - `check` - Test connection to the target database
//! - `migrate` - Read a table and replace it in the target
//! - `script` - Write the SQL load script without connecting

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, SourceArgs, TargetArgs};
pub use runner::Runner;
