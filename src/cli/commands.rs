//! CLI commands and argument parsing

use crate::database::TargetEngine;
use crate::sql::DialectKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// dBASE table migration CLI
#[derive(Parser, Debug)]
#[command(name = "dbf-migrate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Source table arguments shared by the file commands
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// dBASE table file (.dbf)
    pub file: PathBuf,

    /// Memo file (.fpt / .dbt); looked up next to the table when omitted
    #[arg(short, long)]
    pub memo: Option<PathBuf>,

    /// Lowercase column names
    #[arg(long)]
    pub lowercase: bool,

    /// Fail on the first field that cannot be decoded
    #[arg(long)]
    pub strict: bool,
}

/// Target database arguments
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Target engine (duckdb, sqlite, postgres)
    #[arg(long)]
    pub engine: Option<TargetEngine>,

    /// Target database file or name
    #[arg(short, long)]
    pub database: Option<String>,

    /// Target server (postgres)
    #[arg(short, long)]
    pub server: Option<String>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read a table and show its header, a data preview and the inferred schema
    Inspect {
        #[command(flatten)]
        source: SourceArgs,

        /// Number of preview rows
        #[arg(long)]
        rows: Option<usize>,
    },

    /// Test connection to the target database
    Check {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Read a table and replace it in the target database
    Migrate {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        target: TargetArgs,

        /// Target table name (defaults to the file's base name)
        #[arg(short, long)]
        table: Option<String>,

        /// Number of preview rows
        #[arg(long)]
        rows: Option<usize>,
    },

    /// Write the SQL script that would load a table, without connecting
    Script {
        #[command(flatten)]
        source: SourceArgs,

        /// Target table name (defaults to the file's base name)
        #[arg(short, long)]
        table: Option<String>,

        /// SQL dialect (tsql, duckdb)
        #[arg(long)]
        dialect: Option<DialectKind>,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
