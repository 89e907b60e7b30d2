//! Value coercion for target columns
//!
//! [`coerce`] turns a decoded field value into the value stored in a column
//! of a given SQL type. Both the literal insert statements of a script and
//! the parameter bindings of a live load go through it, so the two paths
//! always agree on what lands in the table.

use crate::types::{SqlType, Value};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// Timestamp layout of DATETIME literals
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// A value ready to be written to a target column
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bit(bool),
    /// Whole number; numeric columns fall back to `Integer(0)`
    Integer(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl SqlValue {
    /// Render as a SQL literal
    pub fn to_literal(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bit(b) => u8::from(*b).to_string(),
            SqlValue::Integer(i) => i.to_string(),
            SqlValue::Float(f) => format!("{f:?}"),
            SqlValue::Timestamp(ts) => quote_text(&ts.format(TIMESTAMP_FORMAT).to_string()),
            SqlValue::Text(s) => quote_text(s),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

/// Wrap text in single quotes, doubling embedded quotes
pub fn quote_text(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Coerce a decoded value to the representation of a target column type
///
/// Missing values (null, binary, or anything whose string form is `nan`)
/// become `0` in numeric and BIT columns and `NULL` elsewhere. Values that
/// cannot be converted fall back the same way, except text which always
/// succeeds.
pub fn coerce(value: &Value, sql_type: SqlType) -> SqlValue {
    if is_missing(value) {
        return missing(sql_type);
    }

    match sql_type {
        SqlType::Int | SqlType::Float => to_number(value)
            .map(SqlValue::Float)
            .unwrap_or(SqlValue::Integer(0)),
        SqlType::Bit => {
            let text = value.to_string().to_lowercase();
            SqlValue::Bit(matches!(text.as_str(), "true" | "1" | "yes"))
        }
        SqlType::DateTime => to_timestamp(value)
            .map(SqlValue::Timestamp)
            .unwrap_or(SqlValue::Null),
        SqlType::Text => SqlValue::Text(value.to_string()),
    }
}

/// Coerce a whole row against its column types
pub fn coerce_row(row: &[Value], types: &[SqlType]) -> Vec<SqlValue> {
    row.iter()
        .zip(types)
        .map(|(value, sql_type)| coerce(value, *sql_type))
        .collect()
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null | Value::Binary(_) => true,
        Value::Float(f) => f.is_nan(),
        Value::Text(s) => s.eq_ignore_ascii_case("nan"),
        _ => false,
    }
}

fn missing(sql_type: SqlType) -> SqlValue {
    match sql_type {
        SqlType::Int | SqlType::Float => SqlValue::Integer(0),
        SqlType::Bit => SqlValue::Bit(false),
        SqlType::DateTime | SqlType::Text => SqlValue::Null,
    }
}

fn to_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Logical(b) => f64::from(u8::from(*b)),
        Value::Integer(i) => *i as f64,
        Value::Float(f) => *f,
        Value::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn to_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Date(d) => d.and_hms_opt(0, 0, 0),
        Value::DateTime(dt) => Some(*dt),
        Value::Text(s) => parse_timestamp(s),
        _ => None,
    }
}

/// Parse a timestamp from the text layouts commonly found in legacy tables
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
