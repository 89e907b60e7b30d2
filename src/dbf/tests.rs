//! dBASE reader tests

use super::*;
use crate::error::ReadError;
use crate::types::{FieldErrorPolicy, Value};
use chrono::{Datelike, NaiveDate};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

// ============================================================================
// Fixture builders
// ============================================================================

/// (name, type, length, decimals)
type Field<'a> = (&'a str, u8, u8, u8);

fn build_dbf(version: u8, fields: &[Field], records: &[(u8, Vec<Vec<u8>>)]) -> Vec<u8> {
    let header_len = 32 + 32 * fields.len() + 1;
    let record_len = 1 + fields.iter().map(|f| usize::from(f.2)).sum::<usize>();

    let mut out = vec![0u8; 32];
    out[0] = version;
    out[1] = 124;
    out[2] = 1;
    out[3] = 15;
    out[4..8].copy_from_slice(&(records.len() as u32).to_le_bytes());
    out[8..10].copy_from_slice(&(header_len as u16).to_le_bytes());
    out[10..12].copy_from_slice(&(record_len as u16).to_le_bytes());

    for (name, field_type, length, decimals) in fields {
        let mut desc = [0u8; 32];
        desc[..name.len()].copy_from_slice(name.as_bytes());
        desc[11] = *field_type;
        desc[16] = *length;
        desc[17] = *decimals;
        out.extend_from_slice(&desc);
    }
    out.push(0x0D);

    for (flag, values) in records {
        out.push(*flag);
        for (field, value) in fields.iter().zip(values) {
            let mut cell = value.clone();
            cell.resize(usize::from(field.2), b' ');
            out.extend_from_slice(&cell);
        }
    }
    out.push(0x1A);
    out
}

fn live(values: &[&str]) -> (u8, Vec<Vec<u8>>) {
    (b' ', values.iter().map(|v| v.as_bytes().to_vec()).collect())
}

fn deleted(values: &[&str]) -> (u8, Vec<Vec<u8>>) {
    (b'*', values.iter().map(|v| v.as_bytes().to_vec()).collect())
}

fn read(data: &[u8]) -> DbfTable {
    DbfReader::default().read_bytes(data, None).unwrap()
}

fn column(table: &DbfTable, index: usize) -> Vec<Value> {
    table.records.column_values(index).cloned().collect()
}

// ============================================================================
// Header
// ============================================================================

#[test]
fn test_parse_header() {
    let data = build_dbf(
        0x03,
        &[("NAME", b'C', 10, 0), ("AGE", b'N', 3, 0)],
        &[live(&["Ann", " 30"])],
    );

    let header = TableHeader::parse(&data).unwrap();
    assert_eq!(header.version, 0x03);
    assert_eq!(header.record_count, 1);
    assert_eq!(header.record_length, 14);
    assert_eq!(header.last_update, NaiveDate::from_ymd_opt(2024, 1, 15));
    assert_eq!(header.fields.len(), 2);
    assert_eq!(header.fields[0].name, "NAME");
    assert_eq!(header.fields[0].field_type, FieldType::Character);
    assert_eq!(header.fields[1].field_type, FieldType::Numeric);
    assert!(!header.has_memo_fields());
}

#[test]
fn test_header_too_short() {
    let err = TableHeader::parse(&[0x03; 10]).unwrap_err();
    assert!(matches!(err, ReadError::BadHeader { .. }));
}

#[test]
fn test_header_unknown_version() {
    let mut data = build_dbf(0x03, &[("A", b'C', 1, 0)], &[]);
    data[0] = 0x42;
    let err = TableHeader::parse(&data).unwrap_err();
    assert!(matches!(err, ReadError::UnsupportedVersion { version: 0x42 }));
}

#[test]
fn test_header_missing_terminator() {
    let mut data = build_dbf(0x03, &[("A", b'C', 1, 0)], &[]);
    // Header ends right after the only descriptor, before any terminator
    data[8..10].copy_from_slice(&64u16.to_le_bytes());
    let err = TableHeader::parse(&data).unwrap_err();
    assert!(err.to_string().contains("terminator"));
}

#[test]
fn test_header_fields_wider_than_record() {
    let mut data = build_dbf(0x03, &[("A", b'C', 10, 0)], &[]);
    data[10..12].copy_from_slice(&5u16.to_le_bytes());
    let err = TableHeader::parse(&data).unwrap_err();
    assert!(matches!(err, ReadError::BadHeader { .. }));
}

#[test]
fn test_header_without_fields() {
    let mut data = vec![0u8; 33];
    data[0] = 0x03;
    data[8..10].copy_from_slice(&33u16.to_le_bytes());
    data[10..12].copy_from_slice(&1u16.to_le_bytes());
    data[32] = 0x0D;
    let err = TableHeader::parse(&data).unwrap_err();
    assert!(err.to_string().contains("no fields"));
}

#[test]
fn test_long_character_field_uses_decimal_byte() {
    let mut data = build_dbf(0x30, &[("NOTE", b'C', 44, 1)], &[]);
    data[10..12].copy_from_slice(&301u16.to_le_bytes());
    let header = TableHeader::parse(&data).unwrap();
    assert_eq!(header.fields[0].length, 300);
    assert_eq!(header.fields[0].decimals, 0);
}

// ============================================================================
// Field decoding
// ============================================================================

#[test]
fn test_character_fields_are_trimmed() {
    let table = read(&build_dbf(
        0x03,
        &[("NAME", b'C', 8, 0)],
        &[live(&["Ann"]), live(&["  lead"]), live(&[""])],
    ));
    assert_eq!(
        column(&table, 0),
        vec![
            Value::Text("Ann".to_string()),
            Value::Text("  lead".to_string()),
            Value::Text(String::new()),
        ]
    );
}

#[test]
fn test_character_fields_decode_latin1() {
    let mut record = live(&[""]);
    record.1[0] = vec![b'J', 0xF6, b'r', b'g'];
    let table = read(&build_dbf(0x03, &[("NAME", b'C', 6, 0)], &[record]));
    assert_eq!(column(&table, 0), vec![Value::Text("Jörg".to_string())]);
}

#[test]
fn test_numeric_fields() {
    let table = read(&build_dbf(
        0x03,
        &[("AMOUNT", b'N', 8, 2)],
        &[
            live(&["      12"]),
            live(&["    3.50"]),
            live(&[""]),
            live(&["     1,5"]),
            live(&["****42"]),
            live(&["     abc"]),
        ],
    ));
    assert_eq!(
        column(&table, 0),
        vec![
            Value::Integer(12),
            Value::Float(3.5),
            Value::Null,
            Value::Float(1.5),
            Value::Integer(42),
            Value::Null,
        ]
    );
    assert_eq!(table.invalid_fields, 1);
}

#[test]
fn test_logical_fields() {
    let table = read(&build_dbf(
        0x03,
        &[("ACTIVE", b'L', 1, 0)],
        &[
            live(&["T"]),
            live(&["n"]),
            live(&["Y"]),
            live(&["?"]),
            live(&[" "]),
            live(&["X"]),
        ],
    ));
    assert_eq!(
        column(&table, 0),
        vec![
            Value::Logical(true),
            Value::Logical(false),
            Value::Logical(true),
            Value::Null,
            Value::Null,
            Value::Null,
        ]
    );
}

#[test]
fn test_date_fields() {
    let table = read(&build_dbf(
        0x03,
        &[("BORN", b'D', 8, 0)],
        &[
            live(&["20240105"]),
            live(&[""]),
            live(&["00000000"]),
            live(&["20241345"]),
            live(&["2024XX05"]),
        ],
    ));
    assert_eq!(
        column(&table, 0),
        vec![
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null,
        ]
    );
    assert_eq!(table.invalid_fields, 2);
}

#[test]
fn test_binary_numeric_fields() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
    let julian = date.num_days_from_ce() as u32 + 1_721_425;
    let mut timestamp = julian.to_le_bytes().to_vec();
    timestamp.extend_from_slice(&48_600_000u32.to_le_bytes());

    let record = (
        b' ',
        vec![
            (-5i32).to_le_bytes().to_vec(),
            2.25f64.to_le_bytes().to_vec(),
            123_450_000i64.to_le_bytes().to_vec(),
            timestamp,
        ],
    );
    let table = read(&build_dbf(
        0x30,
        &[
            ("QTY", b'I', 4, 0),
            ("RATE", b'B', 8, 0),
            ("PRICE", b'Y', 8, 4),
            ("STAMP", b'T', 8, 0),
        ],
        &[record],
    ));

    let row = &table.records.rows()[0];
    assert_eq!(row[0], Value::Integer(-5));
    assert_eq!(row[1], Value::Float(2.25));
    assert_eq!(row[2], Value::Float(12_345.0));
    assert_eq!(
        row[3],
        Value::DateTime(date.and_hms_opt(13, 30, 0).unwrap())
    );
}

#[test]
fn test_empty_datetime_is_null() {
    let record = (b' ', vec![vec![0u8; 8]]);
    let table = read(&build_dbf(0x30, &[("STAMP", b'T', 8, 0)], &[record]));
    assert_eq!(column(&table, 0), vec![Value::Null]);
}

#[test]
fn test_datetime_with_julian_day_out_of_range() {
    let stamp = |day: u32| {
        let mut raw = day.to_le_bytes().to_vec();
        raw.extend_from_slice(&0u32.to_le_bytes());
        (b' ', vec![raw])
    };
    let data = build_dbf(
        0x30,
        &[("STAMP", b'T', 8, 0)],
        &[stamp(u32::MAX), stamp(2_000_000_000)],
    );

    let table = read(&data);
    assert_eq!(column(&table, 0), vec![Value::Null, Value::Null]);
    assert_eq!(table.invalid_fields, 2);

    let reader = DbfReader::new(ReadOptions {
        field_errors: FieldErrorPolicy::FailFast,
        ..ReadOptions::default()
    });
    let err = reader.read_bytes(&data, None).unwrap_err();
    assert!(matches!(
        err,
        ReadError::InvalidField { record: 1, ref field, .. } if field == "STAMP"
    ));
}

#[test]
fn test_fail_fast_policy() {
    let data = build_dbf(
        0x03,
        &[("AMOUNT", b'N', 5, 0)],
        &[live(&["   10"]), live(&["  x1z"])],
    );
    let reader = DbfReader::new(ReadOptions {
        field_errors: FieldErrorPolicy::FailFast,
        ..ReadOptions::default()
    });

    let err = reader.read_bytes(&data, None).unwrap_err();
    match err {
        ReadError::InvalidField { record, field, .. } => {
            assert_eq!(record, 2);
            assert_eq!(field, "AMOUNT");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Records and columns
// ============================================================================

#[test]
fn test_deleted_records_are_skipped() {
    let data = build_dbf(
        0x03,
        &[("ID", b'N', 3, 0)],
        &[live(&["  1"]), deleted(&["  2"]), live(&["  3"])],
    );

    let table = read(&data);
    assert_eq!(column(&table, 0), vec![Value::Integer(1), Value::Integer(3)]);

    let reader = DbfReader::new(ReadOptions {
        include_deleted: true,
        ..ReadOptions::default()
    });
    let table = reader.read_bytes(&data, None).unwrap();
    assert_eq!(table.records.len(), 3);
}

#[test]
fn test_records_with_unknown_flag_are_skipped() {
    let mut data = build_dbf(
        0x03,
        &[("CODE", b'C', 4, 0)],
        &[live(&["ok"]), live(&["junk"]), live(&["last"])],
    );
    let header_len = 32 + 32 + 1;
    data[header_len + 5] = 0x00;

    let reader = DbfReader::new(ReadOptions {
        include_deleted: true,
        ..ReadOptions::default()
    });
    let table = reader.read_bytes(&data, None).unwrap();
    assert_eq!(
        column(&table, 0),
        vec![Value::Text("ok".to_string()), Value::Text("last".to_string())]
    );
}

#[test]
fn test_truncated_trailing_record_is_ignored() {
    let mut data = build_dbf(0x03, &[("ID", b'N', 3, 0)], &[live(&["  1"]), live(&["  2"])]);
    // Drop the end marker and half of the last record
    data.truncate(data.len() - 3);
    let table = read(&data);
    assert_eq!(column(&table, 0), vec![Value::Integer(1)]);
}

#[test]
fn test_dbase7_descriptors() {
    let header_len = 68 + 48 + 1;
    let mut data = vec![0u8; 68];
    data[0] = 0x04;
    data[1..4].copy_from_slice(&[124, 1, 15]);
    data[4..8].copy_from_slice(&1u32.to_le_bytes());
    data[8..10].copy_from_slice(&(header_len as u16).to_le_bytes());
    data[10..12].copy_from_slice(&5u16.to_le_bytes());

    let mut desc = [0u8; 48];
    desc[..4].copy_from_slice(b"NAME");
    desc[32] = b'C';
    desc[33] = 4;
    data.extend_from_slice(&desc);
    data.push(0x0D);
    data.extend_from_slice(b" abcd");
    data.push(0x1A);

    let table = read(&data);
    assert_eq!(table.header.version, 0x04);
    assert_eq!(table.header.fields.len(), 1);
    assert_eq!(table.header.fields[0].field_type, FieldType::Character);
    assert_eq!(table.header.fields[0].length, 4);
    assert_eq!(table.records.columns(), ["NAME"]);
    assert_eq!(column(&table, 0), vec![Value::Text("abcd".to_string())]);
}

#[test]
fn test_duplicate_column_names() {
    let data = build_dbf(
        0x03,
        &[("CODE", b'C', 2, 0), ("code", b'C', 2, 0), ("CODE", b'C', 2, 0)],
        &[],
    );
    let table = read(&data);
    assert_eq!(table.records.columns(), ["CODE", "code_2", "CODE_3"]);
}

#[test]
fn test_lowercase_names() {
    let data = build_dbf(0x03, &[("CUSTNO", b'N', 4, 0)], &[]);
    let reader = DbfReader::new(ReadOptions {
        lowercase_names: true,
        ..ReadOptions::default()
    });
    let table = reader.read_bytes(&data, None).unwrap();
    assert_eq!(table.records.columns(), ["custno"]);
}

#[test]
fn test_zero_records_keeps_columns() {
    let table = read(&build_dbf(0x03, &[("A", b'C', 1, 0), ("B", b'L', 1, 0)], &[]));
    assert!(table.records.is_empty());
    assert_eq!(table.records.columns(), ["A", "B"]);
}

// ============================================================================
// Memo files
// ============================================================================

fn fpt_with_text(block: u32, text: &[u8], memo_type: u32) -> Vec<u8> {
    let block_size = 64usize;
    let mut memo = vec![0u8; 512];
    memo[6..8].copy_from_slice(&(block_size as u16).to_be_bytes());
    memo.resize(block as usize * block_size, 0);
    memo.extend_from_slice(&memo_type.to_be_bytes());
    memo.extend_from_slice(&(text.len() as u32).to_be_bytes());
    memo.extend_from_slice(text);
    memo
}

#[test]
fn test_foxpro_memo() {
    let memo = MemoFile::from_bytes(fpt_with_text(8, b"hello", 1), MemoKind::FoxPro).unwrap();
    let data = build_dbf(
        0x30,
        &[("NOTES", b'M', 4, 0)],
        &[
            (b' ', vec![8u32.to_le_bytes().to_vec()]),
            (b' ', vec![0u32.to_le_bytes().to_vec()]),
            (b' ', vec![900u32.to_le_bytes().to_vec()]),
        ],
    );

    let table = DbfReader::default().read_bytes(&data, Some(&memo)).unwrap();
    assert_eq!(
        column(&table, 0),
        vec![Value::Text("hello".to_string()), Value::Null, Value::Null]
    );
    assert_eq!(table.invalid_fields, 1);
}

#[test]
fn test_memo_index_outside_memo_file() {
    let memo = MemoFile::from_bytes(fpt_with_text(8, b"hello", 1), MemoKind::FoxPro).unwrap();
    assert!(memo.get(900).is_err());

    let data = build_dbf(
        0x30,
        &[("ID", b'I', 4, 0), ("NOTES", b'M', 4, 0)],
        &[(
            b' ',
            vec![7i32.to_le_bytes().to_vec(), 900u32.to_le_bytes().to_vec()],
        )],
    );

    let table = DbfReader::default().read_bytes(&data, Some(&memo)).unwrap();
    assert_eq!(column(&table, 1), vec![Value::Null]);
    assert_eq!(table.invalid_fields, 1);

    let reader = DbfReader::new(ReadOptions {
        field_errors: FieldErrorPolicy::FailFast,
        ..ReadOptions::default()
    });
    match reader.read_bytes(&data, Some(&memo)).unwrap_err() {
        ReadError::InvalidField { record, field, message } => {
            assert_eq!(record, 1);
            assert_eq!(field, "NOTES");
            assert!(message.contains("outside the memo file"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_foxpro_picture_memo_is_binary() {
    let memo = MemoFile::from_bytes(fpt_with_text(8, &[1, 2, 3], 0), MemoKind::FoxPro).unwrap();
    let data = build_dbf(
        0x30,
        &[("NOTES", b'M', 4, 0)],
        &[(b' ', vec![8u32.to_le_bytes().to_vec()])],
    );
    let table = DbfReader::default().read_bytes(&data, Some(&memo)).unwrap();
    assert_eq!(column(&table, 0), vec![Value::Binary(vec![1, 2, 3])]);
}

#[test]
fn test_dbase3_memo() {
    let mut memo_bytes = vec![0u8; 512];
    memo_bytes.extend_from_slice(b"line one\x1A\x1A");
    let memo = MemoFile::from_bytes(memo_bytes, MemoKind::DBase3).unwrap();

    let data = build_dbf(
        0x83,
        &[("NOTES", b'M', 10, 0)],
        &[live(&["         1"]), live(&[""])],
    );
    let table = DbfReader::default().read_bytes(&data, Some(&memo)).unwrap();
    assert_eq!(
        column(&table, 0),
        vec![Value::Text("line one".to_string()), Value::Null]
    );
}

#[test]
fn test_dbase4_memo() {
    let mut memo_bytes = vec![0u8; 512];
    memo_bytes[20..22].copy_from_slice(&512u16.to_le_bytes());
    memo_bytes.extend_from_slice(&[0xFF, 0xFF, 0x08, 0x00]);
    memo_bytes.extend_from_slice(&(8u32 + 4).to_le_bytes());
    memo_bytes.extend_from_slice(b"memo");
    let memo = MemoFile::from_bytes(memo_bytes, MemoKind::DBase4).unwrap();

    assert_eq!(memo.get(1).unwrap(), Memo::Text(b"memo".to_vec()));
    assert!(memo.get(50).is_err());
}

#[test]
fn test_missing_memo_is_tolerated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("NOTES.DBF");
    let data = build_dbf(
        0x83,
        &[("ID", b'N', 2, 0), ("NOTES", b'M', 10, 0)],
        &[live(&[" 1", "         1"])],
    );
    std::fs::write(&path, &data).unwrap();

    let table = DbfReader::default().read(&path).unwrap();
    assert_eq!(table.records.rows()[0], vec![Value::Integer(1), Value::Null]);
    assert!(table.memo_path.is_none());

    let strict = DbfReader::new(ReadOptions {
        ignore_missing_memo: false,
        ..ReadOptions::default()
    });
    assert!(matches!(
        strict.read(&path).unwrap_err(),
        ReadError::MissingMemo { .. }
    ));
}

#[test]
fn test_memo_file_found_case_insensitively() {
    let dir = tempdir().unwrap();
    let table_path = dir.path().join("PEOPLE.DBF");
    let memo_path = dir.path().join("people.fpt");
    std::fs::write(&table_path, b"").unwrap();
    std::fs::write(&memo_path, b"").unwrap();

    assert_eq!(find_memo_file(&table_path), Some(memo_path));
}

#[test]
fn test_read_with_memo_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("people.dbf");
    std::fs::write(
        &path,
        build_dbf(
            0xF5,
            &[("NOTES", b'M', 10, 0)],
            &[live(&["         8"])],
        ),
    )
    .unwrap();
    std::fs::write(dir.path().join("PEOPLE.FPT"), fpt_with_text(8, b"vip", 1)).unwrap();

    let table = DbfReader::default().read(&path).unwrap();
    assert_eq!(column(&table, 0), vec![Value::Text("vip".to_string())]);
    assert!(table.memo_path.is_some());
}

#[test]
fn test_open_missing_file() {
    let err = read_dbf("/nonexistent/table.dbf", &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, ReadError::Open { .. }));
}
