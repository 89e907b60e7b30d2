//! Statement builders shared by the script writer and the live loader

use super::dialect::Dialect;
use super::literal::coerce_row;
use crate::schema::TableSchema;
use crate::types::{RecordSet, Row};

/// Drop-if-exists followed by create, in execution order
pub fn ddl_statements(dialect: &dyn Dialect, schema: &TableSchema) -> Vec<String> {
    vec![
        dialect.drop_table_if_exists(&schema.name),
        dialect.create_table(schema),
    ]
}

/// INSERT with every value embedded as a literal
pub fn insert_literal(dialect: &dyn Dialect, schema: &TableSchema, row: &Row) -> String {
    let values: Vec<String> = coerce_row(row, &schema.types())
        .iter()
        .map(|v| v.to_literal())
        .collect();
    dialect.insert(&schema.name, &values)
}

/// Every statement of a load, DDL first, one INSERT per row
pub fn load_statements(
    dialect: &dyn Dialect,
    schema: &TableSchema,
    records: &RecordSet,
) -> Vec<String> {
    let mut statements = ddl_statements(dialect, schema);
    statements.extend(
        records
            .rows()
            .iter()
            .map(|row| insert_literal(dialect, schema, row)),
    );
    statements
}

/// Full load script, one statement per line inside a transaction
pub fn render_script(dialect: &dyn Dialect, schema: &TableSchema, records: &RecordSet) -> String {
    let mut script = format!(
        "-- Load of table {} ({} rows, {} dialect)\nBEGIN TRANSACTION;\n",
        schema.name,
        records.len(),
        dialect.name()
    );
    for statement in load_statements(dialect, schema, records) {
        script.push_str(&statement);
        script.push_str(";\n");
    }
    script.push_str("COMMIT;\n");
    script
}
