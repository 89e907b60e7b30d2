//! Error types for dbf-migrate
//!
//! This module defines the error hierarchy for the whole crate.
//! Reading, connecting and loading are separate failure domains and each
//! gets its own variant so callers can report them independently.

use thiserror::Error;

/// Errors raised while reading a dBASE table
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Failed to open '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid table header: {message}")]
    BadHeader { message: String },

    #[error("Unsupported dBASE version byte 0x{version:02X}")]
    UnsupportedVersion { version: u8 },

    #[error("Memo file not found for '{path}'")]
    MissingMemo { path: String },

    #[error("Invalid memo file: {message}")]
    InvalidMemo { message: String },

    #[error("Record {record}, field '{field}': {message}")]
    InvalidField {
        record: usize,
        field: String,
        message: String,
    },
}

impl ReadError {
    /// Create a bad header error
    pub fn bad_header(message: impl Into<String>) -> Self {
        Self::BadHeader {
            message: message.into(),
        }
    }

    /// Create an invalid memo error
    pub fn invalid_memo(message: impl Into<String>) -> Self {
        Self::InvalidMemo {
            message: message.into(),
        }
    }
}

/// The main error type for dbf-migrate
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse config YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Source Errors
    // ============================================================================
    #[error("Error reading DBF file: {0}")]
    Read(#[from] ReadError),

    // ============================================================================
    // Database Errors
    // ============================================================================
    #[error("Connection failed: {message}")]
    Connection { message: String },

    #[error("Error migrating data: {message}")]
    Load { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a load error
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
        }
    }

    /// Whether this error came from reading the source table
    pub fn is_read_error(&self) -> bool {
        matches!(self, Error::Read(_))
    }
}

/// Result type alias for dbf-migrate
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
