//! Configuration types

use crate::database::TargetConfig;
use crate::dbf::ReadOptions;
use crate::sql::DialectKind;
use serde::{Deserialize, Serialize};

/// Rows shown by `inspect` and `migrate` unless configured
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Complete run configuration loaded from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Load target
    #[serde(default)]
    pub target: TargetConfig,

    /// Table reader options
    #[serde(default)]
    pub reader: ReadOptions,

    /// Number of rows in data previews
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    /// Target table name; the data file's base name when unset
    #[serde(default)]
    pub table: Option<String>,

    /// Dialect of generated scripts
    #[serde(default)]
    pub dialect: DialectKind,
}

fn default_preview_rows() -> usize {
    DEFAULT_PREVIEW_ROWS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            reader: ReadOptions::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            table: None,
            dialect: DialectKind::default(),
        }
    }
}
