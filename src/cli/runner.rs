//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, SourceArgs, TargetArgs};
use crate::config::{load_config, validate_config, AppConfig};
use crate::database::Session;
use crate::dbf::{DbfReader, DbfTable};
use crate::error::{Error, Result, ResultExt};
use crate::migration::migrate;
use crate::schema::{infer_schema, table_name_for, TableSchema};
use crate::sql::{render_script, DialectKind};
use crate::types::FieldErrorPolicy;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Inspect { source, rows } => self.inspect(source, *rows),
            Commands::Check { target } => self.check(target),
            Commands::Migrate {
                source,
                target,
                table,
                rows,
            } => self.migrate(source, target, table.as_deref(), *rows),
            Commands::Script {
                source,
                table,
                dialect,
                output,
            } => self.script(source, table.as_deref(), *dialect, output.as_deref()),
        }
    }

    /// Load the configuration file, or defaults when none is given
    fn load_config(&self) -> Result<AppConfig> {
        match &self.cli.config {
            Some(path) => load_config(path),
            None => Ok(AppConfig::default()),
        }
    }

    /// Configuration with command-line overrides applied
    fn resolve_config(
        &self,
        source: Option<&SourceArgs>,
        target: Option<&TargetArgs>,
    ) -> Result<AppConfig> {
        let mut config = self.load_config()?;

        if let Some(source) = source {
            if source.memo.is_some() {
                config.reader.memo_path.clone_from(&source.memo);
            }
            if source.lowercase {
                config.reader.lowercase_names = true;
            }
            if source.strict {
                config.reader.field_errors = FieldErrorPolicy::FailFast;
            }
        }

        if let Some(target) = target {
            if let Some(engine) = target.engine {
                config.target.engine = engine;
            }
            if let Some(database) = &target.database {
                config.target.database.clone_from(database);
            }
            if target.server.is_some() {
                config.target.server.clone_from(&target.server);
            }
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Read the source table
    fn read_table(&self, path: &Path, config: &AppConfig) -> Result<DbfTable> {
        let table = DbfReader::new(config.reader.clone()).read(path)?;

        self.output_message(&json!({
            "type": "RECORD_COUNT",
            "source": path.display().to_string(),
            "count": table.records.len(),
            "invalid_fields": table.invalid_fields,
        }));
        Ok(table)
    }

    /// Infer the schema and report it
    fn schema_for(
        &self,
        path: &Path,
        table: Option<&str>,
        config: &AppConfig,
        dbf: &DbfTable,
    ) -> Result<TableSchema> {
        let schema = infer_schema(target_table_name(path, table, config)?, &dbf.records);
        self.output_message(&json!({
            "type": "SCHEMA",
            "schema": schema,
        }));
        Ok(schema)
    }

    /// Read a table and show what a migration would create
    fn inspect(&self, source: &SourceArgs, rows: Option<usize>) -> Result<()> {
        let config = self.resolve_config(Some(source), None)?;
        let dbf = self.read_table(&source.file, &config)?;

        self.output_message(&json!({
            "type": "HEADER",
            "header": dbf.header,
            "memo": dbf.memo_path.as_ref().map(|p| p.display().to_string()),
        }));

        let preview_rows = rows.unwrap_or(config.preview_rows);
        self.output_message(&json!({
            "type": "PREVIEW",
            "records": dbf.records.preview_json(preview_rows),
        }));

        self.schema_for(&source.file, None, &config, &dbf)?;
        Ok(())
    }

    /// Check the target connection
    fn check(&self, target: &TargetArgs) -> Result<()> {
        let config = self.resolve_config(None, Some(target))?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!("Checking connection to {}", config.target.describe())
            }
        }));

        match Session::connect(&config.target) {
            Ok(_) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "SUCCEEDED",
                        "message": "Connection successful"
                    }
                }));
                Ok(())
            }
            Err(e) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "FAILED",
                        "message": e.to_string()
                    }
                }));
                Err(e)
            }
        }
    }

    /// Connect, read, infer and load
    fn migrate(
        &self,
        source: &SourceArgs,
        target: &TargetArgs,
        table: Option<&str>,
        rows: Option<usize>,
    ) -> Result<()> {
        let config = self.resolve_config(Some(source), Some(target))?;
        let mut session = Session::connect(&config.target)?;

        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {
                "status": "SUCCEEDED",
                "message": format!("Connected to {}", session.connection_info())
            }
        }));

        // A read failure ends the run before anything touches the target
        let dbf = self.read_table(&source.file, &config)?;

        let preview_rows = rows.unwrap_or(config.preview_rows);
        self.output_message(&json!({
            "type": "PREVIEW",
            "records": dbf.records.preview_json(preview_rows),
        }));

        let schema = self.schema_for(&source.file, table, &config, &dbf)?;

        let mut report = migrate(&mut session, &dbf.records, &schema)?;
        report.source = Some(source.file.clone());
        report.memo = dbf.memo_path;
        report.invalid_fields = dbf.invalid_fields;

        self.output_message(&json!({
            "type": "MIGRATION",
            "status": "SUCCEEDED",
            "message": format!("Data migrated successfully to table {}", report.table),
            "report": report,
        }));
        Ok(())
    }

    /// Write the load script for a table
    fn script(
        &self,
        source: &SourceArgs,
        table: Option<&str>,
        dialect: Option<DialectKind>,
        output: Option<&Path>,
    ) -> Result<()> {
        let config = self.resolve_config(Some(source), None)?;

        // Messages stay off stdout when the script goes there
        let dbf = DbfReader::new(config.reader.clone()).read(&source.file)?;
        let schema = infer_schema(
            target_table_name(&source.file, table, &config)?,
            &dbf.records,
        );

        let dialect = dialect.unwrap_or(config.dialect).dialect();
        let script = render_script(dialect, &schema, &dbf.records);

        match output {
            Some(path) => {
                fs::write(path, &script)
                    .with_context(|| format!("Failed to write script to {}", path.display()))?;
                tracing::info!("Wrote {} script to {}", dialect.name(), path.display());
                self.output_message(&json!({
                    "type": "SCRIPT",
                    "path": path.display().to_string(),
                    "table": schema.name,
                    "rows": dbf.records.len(),
                }));
            }
            None => print!("{script}"),
        }
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Target table name: the flag, then the config file, then the file's base name
fn target_table_name(path: &Path, table: Option<&str>, config: &AppConfig) -> Result<String> {
    table
        .map(String::from)
        .or_else(|| config.table.clone())
        .or_else(|| table_name_for(path))
        .ok_or_else(|| Error::config(format!("Cannot derive a table name from {}", path.display())))
}
