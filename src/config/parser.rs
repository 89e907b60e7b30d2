//! YAML parser for run configuration

use super::types::AppConfig;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Load a configuration file
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    tracing::debug!("Loaded config from {}", path.display());
    load_config_from_str(&content)
}

/// Load a configuration from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<AppConfig> {
    // An empty document means "all defaults"
    if yaml.trim().is_empty() {
        return Ok(AppConfig::default());
    }

    let config: AppConfig = serde_yaml::from_str(yaml)?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate a configuration
pub(crate) fn validate_config(config: &AppConfig) -> Result<()> {
    config.target.validate()?;

    if let Some(table) = &config.table {
        if table.trim().is_empty() {
            return Err(Error::config("Table name cannot be empty"));
        }
    }

    if let Some(memo) = &config.reader.memo_path {
        if memo.as_os_str().is_empty() {
            return Err(Error::config("Reader memo_path cannot be empty"));
        }
    }

    Ok(())
}
