//! Column type inference from a record set
//!
//! Each column gets exactly one type from the aggregate storage class of all
//! its values. This is not a per-value compatibility scan: a column whose
//! values do not all fit one storage class falls back to text, and values
//! that do not fit the chosen type are coerced when rows are serialized.
//! Only timestamp columns are temporal: plain dates are stored as text.

use super::types::{ColumnDef, StorageClass, TableSchema};
use crate::types::{RecordSet, SqlType, Value, ValueKind};
use std::collections::HashSet;
use std::path::Path;

/// Aggregate statistics for one column
#[derive(Debug, Clone, Default)]
pub struct ColumnProfile {
    /// Number of null values
    pub nulls: usize,
    /// Number of non-null values
    pub values: usize,
    /// Distinct dynamic types among the non-null values
    pub kinds: HashSet<ValueKind>,
    /// First non-null value
    pub sample: Option<Value>,
}

impl ColumnProfile {
    /// Profile a column from its values
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut profile = Self::default();
        for value in values {
            match value.kind() {
                None => profile.nulls += 1,
                Some(kind) => {
                    profile.values += 1;
                    profile.kinds.insert(kind);
                    if profile.sample.is_none() {
                        profile.sample = Some(value.clone());
                    }
                }
            }
        }
        profile
    }

    /// Sample value, empty text when the column has no values
    pub fn sample(&self) -> Value {
        self.sample
            .clone()
            .unwrap_or_else(|| Value::Text(String::new()))
    }

    fn only(&self, allowed: &[ValueKind]) -> bool {
        self.values > 0 && self.kinds.iter().all(|k| allowed.contains(k))
    }

    /// Storage class of the whole column
    pub fn storage_class(&self) -> StorageClass {
        if self.only(&[ValueKind::Logical]) {
            StorageClass::Boolean
        } else if self.only(&[ValueKind::Integer]) && self.nulls == 0 {
            StorageClass::Integral
        } else if self.only(&[ValueKind::Integer, ValueKind::Float]) {
            StorageClass::Floating
        } else if self.only(&[ValueKind::DateTime]) {
            StorageClass::Temporal
        } else {
            StorageClass::Text
        }
    }

    /// SQL type for the column
    pub fn sql_type(&self) -> SqlType {
        let sample = self.sample();
        let single_kind = self.kinds.len() == 1;

        if single_kind && matches!(sample, Value::Logical(_)) {
            return SqlType::Bit;
        }
        match self.storage_class() {
            StorageClass::Integral => SqlType::Int,
            StorageClass::Floating => SqlType::Float,
            StorageClass::Temporal => SqlType::DateTime,
            StorageClass::Boolean | StorageClass::Text => SqlType::Text,
        }
    }
}

/// Infer the SQL type of one column
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = &'a Value>) -> SqlType {
    ColumnProfile::from_values(values).sql_type()
}

/// Infer the target schema of a record set
pub fn infer_schema(table_name: impl Into<String>, records: &RecordSet) -> TableSchema {
    let columns = records
        .columns()
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let sql_type = infer_column_type(records.column_values(index));
            tracing::debug!("Column '{}' inferred as {}", name, sql_type);
            ColumnDef::new(name.clone(), sql_type)
        })
        .collect();

    TableSchema::new(table_name, columns)
}

/// Target table name for a data file: its base name without extension
pub fn table_name_for(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
}
