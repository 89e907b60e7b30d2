//! Schema inference module
//!
//! Assigns one SQL column type to every column of a record set.
//!
//! # Rules
//!
//! Applied per column, in column order:
//!
//! 1. **BIT**: every non-null value is a logical
//! 2. **INT**: integers only, with no missing values
//! 3. **FLOAT**: numbers only (integers with missing values land here)
//! 4. **DATETIME**: dates and timestamps only
//! 5. **TEXT**: everything else, including mixed and empty columns

mod inference;
mod types;

pub use inference::{infer_column_type, infer_schema, table_name_for, ColumnProfile};
pub use types::{ColumnDef, StorageClass, TableSchema};
