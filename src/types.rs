//! Common types used throughout dbf-migrate
//!
//! This module contains the dynamic value model produced by the reader,
//! the record set that carries it, and the target column types.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// One row of a record set, one value per column
pub type Row = Vec<Value>;

// ============================================================================
// Dynamic Values
// ============================================================================

/// A raw field value as decoded from the source table
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Logical(bool),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
    Binary(Vec<u8>),
}

/// The dynamic type of a non-null value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Logical,
    Integer,
    Float,
    Date,
    DateTime,
    Text,
    Binary,
}

impl Value {
    /// Dynamic type of this value, `None` for null
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Null => None,
            Value::Logical(_) => Some(ValueKind::Logical),
            Value::Integer(_) => Some(ValueKind::Integer),
            Value::Float(_) => Some(ValueKind::Float),
            Value::Date(_) => Some(ValueKind::Date),
            Value::DateTime(_) => Some(ValueKind::DateTime),
            Value::Text(_) => Some(ValueKind::Text),
            Value::Binary(_) => Some(ValueKind::Binary),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert to JSON for previews and reports
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Logical(b) => JsonValue::Bool(*b),
            Value::Integer(i) => JsonValue::Number((*i).into()),
            Value::Float(f) => {
                serde_json::Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number)
            }
            Value::Binary(bytes) => JsonValue::String(format!("<{} bytes>", bytes.len())),
            other => JsonValue::String(other.to_string()),
        }
    }
}

/// The string form of a value, used by text literals and the `nan`/BIT checks
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Logical(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            // Debug keeps the trailing ".0" on whole floats
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::Text(s) => f.write_str(s),
            Value::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

// ============================================================================
// Record Set
// ============================================================================

/// Rectangular in-memory table: ordered columns and ordered rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl RecordSet {
    /// Create an empty record set with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; it must have exactly one value per column
    pub fn push_row(&mut self, row: Row) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate the values of one column in row order
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// First `limit` rows as JSON objects keyed by column name
    pub fn preview_json(&self, limit: usize) -> Vec<JsonValue> {
        self.rows
            .iter()
            .take(limit)
            .map(|row| {
                let object: serde_json::Map<String, JsonValue> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect();
                JsonValue::Object(object)
            })
            .collect()
    }
}

// ============================================================================
// Target Column Types
// ============================================================================

/// SQL column type assigned to a whole column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlType {
    Bit,
    Int,
    Float,
    DateTime,
    Text,
}

impl SqlType {
    /// Numeric columns get `0` instead of `NULL` for absent values
    pub fn is_numeric(self) -> bool {
        matches!(self, SqlType::Int | SqlType::Float)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlType::Bit => "BIT",
            SqlType::Int => "INT",
            SqlType::Float => "FLOAT",
            SqlType::DateTime => "DATETIME",
            SqlType::Text => "TEXT",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Reader Policies
// ============================================================================

/// What to do when a single field cannot be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorPolicy {
    /// Replace the field with null and keep reading
    #[default]
    NullOnError,
    /// Abort the whole read
    FailFast,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_string_form() {
        assert_eq!(Value::Logical(true).to_string(), "true");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Float(f64::NAN).to_string(), "NaN");
        assert_eq!(
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()).to_string(),
            "2024-01-05"
        );
        let dt = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(13, 30, 0)
            .unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2024-01-05 13:30:00");
    }

    #[test]
    fn test_value_to_json() {
        assert_eq!(Value::Null.to_json(), JsonValue::Null);
        assert_eq!(Value::Integer(7).to_json(), serde_json::json!(7));
        assert_eq!(Value::Float(f64::NAN).to_json(), JsonValue::Null);
        assert_eq!(Value::Binary(vec![1, 2, 3]).to_json(), serde_json::json!("<3 bytes>"));
    }

    #[test]
    fn test_record_set_preview() {
        let mut set = RecordSet::new(vec!["ID".to_string(), "NAME".to_string()]);
        set.push_row(vec![Value::Integer(1), Value::Text("a".to_string())]);
        set.push_row(vec![Value::Integer(2), Value::Null]);

        assert_eq!(set.len(), 2);
        let preview = set.preview_json(1);
        assert_eq!(preview.len(), 1);
        assert_eq!(preview[0], serde_json::json!({"ID": 1, "NAME": "a"}));

        let ids: Vec<_> = set.column_values(0).cloned().collect();
        assert_eq!(ids, vec![Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn test_sql_type_display() {
        assert_eq!(SqlType::Bit.to_string(), "BIT");
        assert_eq!(SqlType::DateTime.to_string(), "DATETIME");
        assert!(SqlType::Float.is_numeric());
        assert!(!SqlType::Bit.is_numeric());
    }
}
