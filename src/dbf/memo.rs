//! Memo file support (.fpt / .dbt)
//!
//! Memo fields store a block index into a companion file that holds the
//! variable-length text or binary payload.

use crate::error::ReadError;
use std::path::{Path, PathBuf};

const FPT_HEADER_SIZE: usize = 512;
const DBT3_BLOCK_SIZE: usize = 512;
const DBT4_BLOCK_SIZE_OFFSET: usize = 20;
const MEMO_END: u8 = 0x1A;

/// On-disk memo layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoKind {
    /// FoxPro / Visual FoxPro `.fpt`
    FoxPro,
    /// dBASE III `.dbt`
    DBase3,
    /// dBASE IV and later `.dbt`
    DBase4,
}

impl MemoKind {
    /// Pick the layout from the memo file extension and the table version
    pub fn detect(path: &Path, table_version: u8) -> Self {
        let is_fpt = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("fpt"));

        if is_fpt {
            Self::FoxPro
        } else if table_version == 0x83 {
            Self::DBase3
        } else {
            Self::DBase4
        }
    }
}

/// A memo payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Memo {
    Text(Vec<u8>),
    Binary(Vec<u8>),
}

/// Memo file loaded into memory
#[derive(Debug, Clone)]
pub struct MemoFile {
    kind: MemoKind,
    block_size: usize,
    data: Vec<u8>,
}

impl MemoFile {
    /// Open a memo file next to a table of the given version
    pub fn open(path: &Path, table_version: u8) -> Result<Self, ReadError> {
        let data = std::fs::read(path).map_err(|source| ReadError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(data, MemoKind::detect(path, table_version))
    }

    /// Build a memo file from raw bytes
    pub fn from_bytes(data: Vec<u8>, kind: MemoKind) -> Result<Self, ReadError> {
        let block_size = match kind {
            MemoKind::FoxPro => {
                if data.len() < FPT_HEADER_SIZE {
                    return Err(ReadError::invalid_memo(format!(
                        "FPT header needs {FPT_HEADER_SIZE} bytes, file has {}",
                        data.len()
                    )));
                }
                let size = usize::from(u16::from_be_bytes([data[6], data[7]]));
                if size == 0 {
                    return Err(ReadError::invalid_memo("FPT block size is zero"));
                }
                size
            }
            MemoKind::DBase3 => DBT3_BLOCK_SIZE,
            MemoKind::DBase4 => {
                if data.len() < DBT4_BLOCK_SIZE_OFFSET + 2 {
                    return Err(ReadError::invalid_memo("DBT header is truncated"));
                }
                let size = usize::from(u16::from_le_bytes([
                    data[DBT4_BLOCK_SIZE_OFFSET],
                    data[DBT4_BLOCK_SIZE_OFFSET + 1],
                ]));
                if size == 0 {
                    DBT3_BLOCK_SIZE
                } else {
                    size
                }
            }
        };

        Ok(Self {
            kind,
            block_size,
            data,
        })
    }

    /// Fetch the memo stored at a block index
    pub fn get(&self, index: u32) -> Result<Memo, String> {
        let start = (index as usize)
            .checked_mul(self.block_size)
            .filter(|&start| start < self.data.len())
            .ok_or_else(|| format!("memo block {index} is outside the memo file"))?;

        match self.kind {
            MemoKind::FoxPro => {
                let header = self
                    .data
                    .get(start..start + 8)
                    .ok_or_else(|| format!("memo block {index} header is truncated"))?;
                let memo_type = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
                let length =
                    u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;
                let body = self
                    .data
                    .get(start + 8..start + 8 + length)
                    .ok_or_else(|| format!("memo block {index} is truncated"))?
                    .to_vec();
                Ok(if memo_type == 1 {
                    Memo::Text(body)
                } else {
                    Memo::Binary(body)
                })
            }
            MemoKind::DBase3 => {
                let rest = &self.data[start..];
                let end = rest
                    .iter()
                    .position(|&b| b == MEMO_END)
                    .unwrap_or(rest.len());
                Ok(Memo::Text(rest[..end].to_vec()))
            }
            MemoKind::DBase4 => {
                let header = self
                    .data
                    .get(start..start + 8)
                    .ok_or_else(|| format!("memo block {index} header is truncated"))?;
                // Length includes the 8-byte block header
                let length = u32::from_le_bytes([header[4], header[5], header[6], header[7]])
                    as usize;
                let body_len = length.saturating_sub(8);
                let body = self
                    .data
                    .get(start + 8..start + 8 + body_len)
                    .ok_or_else(|| format!("memo block {index} is truncated"))?
                    .to_vec();
                Ok(Memo::Text(body))
            }
        }
    }
}

/// Find the memo file that belongs to a table file
///
/// Looks next to the table for a file with the same stem and a `.fpt` or
/// `.dbt` extension, ignoring case.
pub fn find_memo_file(table_path: &Path) -> Option<PathBuf> {
    let stem = table_path.file_stem()?.to_str()?;
    let dir = match table_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            let same_stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.eq_ignore_ascii_case(stem));
            let memo_ext = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("fpt") || e.eq_ignore_ascii_case("dbt"));
            same_stem && memo_ext && path.is_file()
        })
        .collect();

    candidates.sort();
    candidates.into_iter().next()
}
