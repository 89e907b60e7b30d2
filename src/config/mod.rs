//! Run configuration
//!
//! Parse run settings from YAML files.
//!
//! # Overview
//!
//! The config module provides:
//! - `AppConfig` - target, reader options, preview size and script dialect
//! - YAML parsing with validation
//!
//! Every section is optional; command-line flags override file values.

mod parser;
mod types;

pub use parser::{load_config, load_config_from_str};
pub(crate) use parser::validate_config;
pub use types::{AppConfig, DEFAULT_PREVIEW_ROWS};
