//! dBASE table reader
//!
//! Reads dBASE / FoxPro `.dbf` tables and their `.fpt` / `.dbt` memo files
//! into a [`RecordSet`](crate::types::RecordSet).
//!
//! # Features
//!
//! - **Tolerant decoding**: malformed logical, date and numeric fields become
//!   null instead of failing the read (configurable)
//! - **Memo files**: FoxPro and dBASE III/IV layouts, missing file tolerated
//! - **Fixed encoding**: all text is decoded as ISO-8859-1

mod fields;
mod header;
mod memo;
mod reader;

pub use fields::{FieldDecoder, FieldResult};
pub use header::{FieldDescriptor, FieldType, TableHeader, HEADER_SIZE};
pub use memo::{find_memo_file, Memo, MemoFile, MemoKind};
pub use reader::{read_dbf, DbfReader, DbfTable, ReadOptions};

/// Decode ISO-8859-1 bytes; every byte maps to the code point of the same value
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests;
