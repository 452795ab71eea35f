//! Column descriptors: the display/edit schema layered over record fields.

use crate::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Editor/display type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    PlainText,
    LongText,
    Numeric,
    SingleChoice,
    MultiChoice,
}

/// One selectable choice of a single/multi-choice column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    pub value: Value,
}

/// Schema metadata describing how one record field is typed, labeled, and edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub id: String,
    /// Dotted path of the field this column edits.
    pub field: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ChoiceOption>>,
    /// Row-level "select/deselect all" affordance; only meaningful for multi-choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_all: Option<bool>,
}

impl ColumnDescriptor {
    /// Create a column whose id matches its field path.
    pub fn new(field: &str, label: &str, kind: ColumnType) -> Self {
        Self {
            id: field.to_string(),
            field: field.to_string(),
            label: label.to_string(),
            kind,
            width: None,
            options: None,
            select_all: None,
        }
    }

    /// Attach choice options (builder style).
    pub fn with_options(mut self, options: Vec<ChoiceOption>) -> Self {
        self.options = Some(options);
        self
    }

    /// Whether the multi-choice "select all" affordance is enabled.
    pub fn select_all_enabled(&self) -> bool {
        self.kind == ColumnType::MultiChoice && self.select_all.unwrap_or(false)
    }
}

/// Find the column that edits `field`, if any.
pub fn column_for_field<'a>(
    columns: &'a [ColumnDescriptor],
    field: &str,
) -> Option<&'a ColumnDescriptor> {
    columns.iter().find(|column| column.field == field)
}

/// Validate a full column list before it replaces the schema.
///
/// # Errors
/// Returns [`AppError::BadRequest`] for empty ids/field paths or duplicate ids.
pub fn validate_columns(columns: &[ColumnDescriptor]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for column in columns {
        if column.id.trim().is_empty() {
            return Err(AppError::BadRequest("Column id must not be empty".to_string()));
        }
        if column.field.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "Column '{}' has an empty field path",
                column.id
            )));
        }
        if !seen.insert(column.id.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Duplicate column id '{}'",
                column.id
            )));
        }
    }
    Ok(())
}
