//! Shared test-only helpers for treegrid_core.

use crate::{
    models::column::{ChoiceOption, ColumnDescriptor, ColumnType},
    models::record::Record,
    tree::VisibleRow,
};
use serde_json::json;

/// Five records shaped as:
///
/// ```text
/// 1
/// ├── 1-1
/// │   └── 1-1-1
/// └── 1-2
/// 2
/// ```
pub(crate) fn sample_records() -> Vec<Record> {
    vec![
        Record::new("1").field("name", "Engineering").field("budget", 1000),
        Record::with_parent("1-1", Some("1")).field("name", "Platform"),
        Record::with_parent("1-1-1", Some("1-1")).field("name", "Storage"),
        Record::with_parent("1-2", Some("1")).field("name", "Apps"),
        Record::new("2").field("name", "Operations"),
    ]
}

/// Columns covering every column type.
pub(crate) fn sample_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("name", "Name", ColumnType::PlainText),
        ColumnDescriptor::new("notes", "Notes", ColumnType::LongText),
        ColumnDescriptor::new("budget", "Budget", ColumnType::Numeric),
        ColumnDescriptor::new("status", "Status", ColumnType::SingleChoice).with_options(vec![
            ChoiceOption {
                label: "Open".to_string(),
                value: json!("open"),
            },
            ChoiceOption {
                label: "Done".to_string(),
                value: json!("done"),
            },
        ]),
        ColumnDescriptor {
            select_all: Some(true),
            ..ColumnDescriptor::new("tags", "Tags", ColumnType::MultiChoice)
        },
    ]
}

pub(crate) fn ids_of(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

pub(crate) fn ids_of_rows(rows: &[VisibleRow]) -> Vec<&str> {
    rows.iter().map(|row| row.record.id.as_str()).collect()
}
