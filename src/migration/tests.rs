//! Migration tests against in-memory DuckDB

use super::*;
use crate::database::TargetConfig;
use crate::types::{JsonValue, SqlType, Value};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn session() -> Session {
    Session::connect(&TargetConfig::default()).unwrap()
}

fn records(columns: &[&str], rows: Vec<Vec<Value>>) -> RecordSet {
    let mut set = RecordSet::new(columns.iter().map(|c| c.to_string()).collect());
    for row in rows {
        set.push_row(row);
    }
    set
}

fn column(session: &Session, sql: &str) -> Vec<JsonValue> {
    session
        .query_json(sql)
        .unwrap()
        .into_iter()
        .map(|mut row| row.remove(0))
        .collect()
}

#[test]
fn test_active_flags_load_as_bits() {
    let mut session = session();
    let data = records(
        &["ID", "ACTIVE"],
        vec![
            vec![Value::Integer(1), Value::Logical(true)],
            vec![Value::Integer(2), Value::Logical(false)],
            vec![Value::Integer(3), Value::Logical(true)],
        ],
    );
    let schema = infer_schema("flags", &data);
    assert_eq!(schema.get_column("ACTIVE").unwrap().sql_type, SqlType::Bit);

    let report = migrate(&mut session, &data, &schema).unwrap();
    assert_eq!(report.rows_read, 3);
    assert_eq!(report.rows_inserted, 3);
    assert_eq!(report.table, "flags");

    assert_eq!(
        column(
            &session,
            "SELECT CAST(\"ACTIVE\" AS INTEGER) FROM \"flags\" ORDER BY \"ID\""
        ),
        vec![JsonValue::from(1), JsonValue::from(0), JsonValue::from(1)]
    );
}

#[test]
fn test_rerun_replaces_table() {
    let mut session = session();
    let data = records(
        &["CODE", "PRICE"],
        vec![
            vec![Value::Text("A".into()), Value::Float(1.5)],
            vec![Value::Text("B".into()), Value::Float(2.5)],
        ],
    );
    let schema = infer_schema("prices", &data);

    migrate(&mut session, &data, &schema).unwrap();
    let first_columns = session.table_columns("prices").unwrap();
    migrate(&mut session, &data, &schema).unwrap();

    assert_eq!(session.table_columns("prices").unwrap(), first_columns);
    assert_eq!(first_columns, vec!["CODE", "PRICE"]);
    assert_eq!(session.row_count("prices").unwrap(), 2);
}

#[test]
fn test_unparseable_number_loads_as_zero() {
    let mut session = session();
    let data = records(
        &["AMOUNT"],
        vec![
            vec![Value::Text("N/A".into())],
            vec![Value::Text("12.5".into())],
        ],
    );
    let schema = TableSchema::new("amounts", vec![ColumnDef::new("AMOUNT", SqlType::Float)]);

    migrate(&mut session, &data, &schema).unwrap();
    assert_eq!(
        column(&session, "SELECT \"AMOUNT\" FROM \"amounts\" ORDER BY \"AMOUNT\""),
        vec![JsonValue::from(0.0), JsonValue::from(12.5)]
    );
}

#[test]
fn test_dates_keep_calendar_day() {
    let mut session = session();
    let born = NaiveDate::from_ymd_opt(1987, 11, 23).unwrap();
    let seen = born.and_hms_opt(9, 15, 0).unwrap();
    let data = records(
        &["BORN", "SEEN"],
        vec![
            vec![Value::Date(born), Value::DateTime(seen)],
            vec![Value::Null, Value::Null],
        ],
    );
    let schema = infer_schema("people", &data);
    assert_eq!(schema.types(), vec![SqlType::Text, SqlType::DateTime]);

    migrate(&mut session, &data, &schema).unwrap();
    assert_eq!(
        session
            .query_json(
                "SELECT \"BORN\", CAST(\"SEEN\" AS VARCHAR) FROM \"people\" \
                 ORDER BY 1 NULLS LAST"
            )
            .unwrap(),
        vec![
            vec![JsonValue::from("1987-11-23"), JsonValue::from("1987-11-23 09:15:00")],
            vec![JsonValue::Null, JsonValue::Null],
        ]
    );
}

#[test]
fn test_table_name_is_quoted() {
    let mut session = session();
    let data = records(&["select"], vec![vec![Value::Text("x".into())]]);
    let schema = infer_schema("order", &data);

    migrate(&mut session, &data, &schema).unwrap();
    assert_eq!(session.row_count("order").unwrap(), 1);
}

#[test]
fn test_failed_load_rolls_back() {
    let mut session = session();
    let good = records(&["N"], vec![vec![Value::Integer(1)], vec![Value::Integer(2)]]);
    let schema = infer_schema("numbers", &good);
    migrate(&mut session, &good, &schema).unwrap();

    // A double far outside BIGINT range cannot be stored
    let bad = records(&["N"], vec![vec![Value::Integer(3)], vec![Value::Float(1e300)]]);
    let err = migrate(&mut session, &bad, &schema).unwrap_err();

    assert!(matches!(err, Error::Load { .. }));
    assert!(err.to_string().starts_with("Error migrating data: Row 2"));
    assert_eq!(session.row_count("numbers").unwrap(), 2);
}

#[test]
fn test_column_mismatch_is_rejected_before_loading() {
    let mut session = session();
    let data = records(&["A", "B"], vec![]);
    let schema = TableSchema::new("t", vec![ColumnDef::new("A", SqlType::Text)]);

    let err = migrate(&mut session, &data, &schema).unwrap_err();
    assert!(matches!(err, Error::Load { .. }));
    assert!(!session.table_exists("t").unwrap());
}

#[test]
fn test_empty_record_set_creates_table() {
    let mut session = session();
    let data = records(&["A"], vec![]);
    let schema = infer_schema("empty", &data);

    let report = migrate(&mut session, &data, &schema).unwrap();
    assert_eq!(report.rows_inserted, 0);
    assert!(session.table_exists("empty").unwrap());
    assert_eq!(session.row_count("empty").unwrap(), 0);
}

#[test]
fn test_migrate_file_reports_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.dbf");
    std::fs::write(&path, [0x03, 0x00, 0x01]).unwrap();

    let mut session = session();
    let err = migrate_file(&mut session, &path, &ReadOptions::default(), None).unwrap_err();

    assert!(err.is_read_error());
    assert!(!session.table_exists("broken").unwrap());
}

#[test]
fn test_report_serializes() {
    let report = MigrationReport {
        table: "t".to_string(),
        target: "duckdb::memory:".to_string(),
        columns: vec![ColumnDef::new("A", SqlType::Int)],
        rows_read: 1,
        rows_inserted: 1,
        source: None,
        memo: None,
        invalid_fields: 0,
        duration_ms: 5,
    };
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["columns"][0]["sql_type"], "INT");
    assert!(json.get("source").is_none());
}
