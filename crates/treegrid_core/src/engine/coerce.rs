//! Value coercion for field updates, driven by the column schema.

use crate::{
    models::column::{column_for_field, ColumnDescriptor, ColumnType},
    AppError,
};
use serde_json::{Number, Value};

fn invalid(field: &str, reason: impl Into<String>) -> AppError {
    AppError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn parse_number(raw: &str) -> Option<Number> {
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Number::from(int));
    }
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .and_then(Number::from_f64)
}

/// Coerce `value` for the column that edits `field`.
///
/// Fields without a column are stored as given. Numeric columns accept
/// numbers and numeric strings (blank clears to `null`). Multi-choice columns
/// wrap a single scalar into a list. Single-choice columns with options only
/// accept listed values. Text columns stringify numbers and booleans.
///
/// # Errors
/// Returns [`AppError::InvalidValue`] when the value cannot be coerced
/// without guessing.
pub fn coerce_for_column(
    columns: &[ColumnDescriptor],
    field: &str,
    value: Value,
) -> Result<Value, AppError> {
    let Some(column) = column_for_field(columns, field) else {
        return Ok(value);
    };

    match column.kind {
        ColumnType::Numeric => match value {
            Value::Null | Value::Number(_) => Ok(value),
            Value::String(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                parse_number(trimmed)
                    .map(Value::Number)
                    .ok_or_else(|| invalid(field, format!("'{}' is not a number", raw)))
            }
            other => Err(invalid(field, format!("expected a number, got {}", other))),
        },
        ColumnType::MultiChoice => match value {
            Value::Array(_) => Ok(value),
            Value::Null => Ok(Value::Array(Vec::new())),
            Value::Object(_) => Err(invalid(field, "expected a list of choices")),
            scalar => Ok(Value::Array(vec![scalar])),
        },
        ColumnType::SingleChoice => match value {
            Value::Array(_) | Value::Object(_) => Err(invalid(field, "expected a single choice")),
            Value::Null => Ok(value),
            scalar => match column.options.as_deref() {
                Some(options) if !options.iter().any(|option| option.value == scalar) => Err(
                    invalid(field, format!("{} is not one of the column's choices", scalar)),
                ),
                _ => Ok(scalar),
            },
        },
        ColumnType::PlainText | ColumnType::LongText => match value {
            Value::Null | Value::String(_) => Ok(value),
            Value::Number(number) => Ok(Value::String(number.to_string())),
            Value::Bool(flag) => Ok(Value::String(flag.to_string())),
            _ => Err(invalid(field, "expected text")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_columns;
    use serde_json::json;

    #[test]
    fn numeric_coercion_matrix() {
        let columns = sample_columns();
        let cases = [
            (json!(20000), Some(json!(20000))),
            (json!("20000"), Some(json!(20000))),
            (json!(" 12.5 "), Some(json!(12.5))),
            (json!(""), Some(Value::Null)),
            (json!(null), Some(Value::Null)),
            (json!("twelve"), None),
            (json!("NaN"), None),
            (json!(true), None),
            (json!([1]), None),
        ];
        for (input, expected) in cases {
            let result = coerce_for_column(&columns, "budget", input.clone()).ok();
            assert_eq!(result, expected, "input {}", input);
        }
    }

    #[test]
    fn multi_choice_wraps_scalars() {
        let columns = sample_columns();
        assert_eq!(
            coerce_for_column(&columns, "tags", json!("urgent")).expect("wrap"),
            json!(["urgent"])
        );
        assert_eq!(
            coerce_for_column(&columns, "tags", json!(["a", "b"])).expect("list"),
            json!(["a", "b"])
        );
        assert_eq!(
            coerce_for_column(&columns, "tags", Value::Null).expect("clear"),
            json!([])
        );
        assert!(coerce_for_column(&columns, "tags", json!({"a": 1})).is_err());
    }

    #[test]
    fn single_choice_checks_options() {
        let columns = sample_columns();
        assert_eq!(
            coerce_for_column(&columns, "status", json!("done")).expect("listed"),
            json!("done")
        );
        assert!(matches!(
            coerce_for_column(&columns, "status", json!("archived")),
            Err(AppError::InvalidValue { .. })
        ));
    }

    #[test]
    fn text_and_unknown_fields() {
        let columns = sample_columns();
        assert_eq!(
            coerce_for_column(&columns, "name", json!(42)).expect("stringify"),
            json!("42")
        );
        assert!(coerce_for_column(&columns, "notes", json!(["x"])).is_err());
        assert_eq!(
            coerce_for_column(&columns, "unmapped", json!({"free": "form"})).expect("as-is"),
            json!({"free": "form"})
        );
    }
}
