//! Table reader: header, memo lookup and record iteration

use super::fields::FieldDecoder;
use super::header::TableHeader;
use super::memo::{find_memo_file, MemoFile};
use crate::error::ReadError;
use crate::types::{FieldErrorPolicy, RecordSet, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const LIVE: u8 = b' ';
const DELETED: u8 = b'*';
const END_OF_FILE: u8 = 0x1A;

/// Reader options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// What to do with fields that fail to decode
    pub field_errors: FieldErrorPolicy,
    /// Read memo fields as null when the memo file is missing
    pub ignore_missing_memo: bool,
    /// Also return records flagged as deleted
    pub include_deleted: bool,
    /// Lowercase column names
    pub lowercase_names: bool,
    /// Explicit memo file, instead of looking next to the table
    pub memo_path: Option<PathBuf>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            field_errors: FieldErrorPolicy::NullOnError,
            ignore_missing_memo: true,
            include_deleted: false,
            lowercase_names: false,
            memo_path: None,
        }
    }
}

/// A table read into memory
#[derive(Debug, Clone)]
pub struct DbfTable {
    pub header: TableHeader,
    pub records: RecordSet,
    /// Memo file that was used, if any
    pub memo_path: Option<PathBuf>,
    /// Fields replaced by null because they failed to decode
    pub invalid_fields: usize,
}

/// Reads dBASE tables with a fixed set of options
#[derive(Debug, Clone, Default)]
pub struct DbfReader {
    options: ReadOptions,
}

impl DbfReader {
    pub fn new(options: ReadOptions) -> Self {
        Self { options }
    }

    /// Read a table file and its memo file
    pub fn read(&self, path: &Path) -> Result<DbfTable, ReadError> {
        let data = std::fs::read(path).map_err(|source| ReadError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let header = TableHeader::parse(&data)?;

        let (memo, memo_path) = if header.has_memo_fields() {
            self.open_memo(path, header.version)?
        } else {
            (None, None)
        };

        let mut table = self.read_records(&data, header, memo.as_ref())?;
        table.memo_path = memo_path;

        tracing::info!(
            "Read {} records ({} columns) from {}",
            table.records.len(),
            table.records.columns().len(),
            path.display()
        );
        Ok(table)
    }

    /// Read a table from bytes already in memory
    pub fn read_bytes(&self, data: &[u8], memo: Option<&MemoFile>) -> Result<DbfTable, ReadError> {
        let header = TableHeader::parse(data)?;
        self.read_records(data, header, memo)
    }

    fn open_memo(
        &self,
        path: &Path,
        version: u8,
    ) -> Result<(Option<MemoFile>, Option<PathBuf>), ReadError> {
        let memo_path = self
            .options
            .memo_path
            .clone()
            .or_else(|| find_memo_file(path))
            .filter(|p| p.is_file());

        match memo_path {
            Some(memo_path) => {
                let memo = MemoFile::open(&memo_path, version)?;
                tracing::debug!("Using memo file {}", memo_path.display());
                Ok((Some(memo), Some(memo_path)))
            }
            None if self.options.ignore_missing_memo => {
                tracing::warn!(
                    "No memo file found for {}, memo fields will be null",
                    path.display()
                );
                Ok((None, None))
            }
            None => Err(ReadError::MissingMemo {
                path: path.display().to_string(),
            }),
        }
    }

    fn read_records(
        &self,
        data: &[u8],
        header: TableHeader,
        memo: Option<&MemoFile>,
    ) -> Result<DbfTable, ReadError> {
        let columns = column_names(&header, self.options.lowercase_names);
        let mut records = RecordSet::new(columns);
        let decoder = FieldDecoder::new(memo);
        let mut invalid_fields = 0;

        let record_length = header.record_length;
        let mut offset = header.header_length;
        let mut record_number = 0;

        while offset < data.len() {
            let flag = data[offset];
            if flag == END_OF_FILE {
                break;
            }
            let Some(record) = data.get(offset..offset + record_length) else {
                tracing::warn!("Ignoring truncated record at offset {offset}");
                break;
            };
            offset += record_length;
            record_number += 1;

            match flag {
                LIVE => {}
                DELETED if self.options.include_deleted => {}
                DELETED => continue,
                other => {
                    tracing::debug!(
                        "Skipping record {record_number} with unknown flag 0x{other:02X}"
                    );
                    continue;
                }
            }

            let mut row = Vec::with_capacity(header.fields.len());
            let mut position = 1;
            for field in &header.fields {
                let raw = &record[position..position + field.length];
                position += field.length;

                let value = match decoder.decode(field, raw) {
                    Ok(value) => value,
                    Err(message) => match self.options.field_errors {
                        FieldErrorPolicy::NullOnError => {
                            tracing::debug!(
                                "Record {record_number}, field '{}': {message}, using null",
                                field.name
                            );
                            invalid_fields += 1;
                            Value::Null
                        }
                        FieldErrorPolicy::FailFast => {
                            return Err(ReadError::InvalidField {
                                record: record_number,
                                field: field.name.clone(),
                                message,
                            });
                        }
                    },
                };
                row.push(value);
            }
            records.push_row(row);
        }

        Ok(DbfTable {
            header,
            records,
            memo_path: None,
            invalid_fields,
        })
    }
}

/// Read a table with the given options and return its records
pub fn read_dbf(path: impl AsRef<Path>, options: &ReadOptions) -> Result<RecordSet, ReadError> {
    DbfReader::new(options.clone())
        .read(path.as_ref())
        .map(|table| table.records)
}

/// Column names from the field descriptors, made unique
fn column_names(header: &TableHeader, lowercase: bool) -> Vec<String> {
    let mut seen = HashSet::new();
    header
        .fields
        .iter()
        .map(|field| {
            let base = if lowercase {
                field.name.to_lowercase()
            } else {
                field.name.clone()
            };
            let mut name = base.clone();
            let mut suffix = 2;
            while !seen.insert(name.to_lowercase()) {
                name = format!("{base}_{suffix}");
                suffix += 1;
            }
            name
        })
        .collect()
}
