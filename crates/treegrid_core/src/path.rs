//! Dotted field-path access on records.
//!
//! Paths are split on `.`; `"meta.owner.name"` walks nested mappings. The
//! record members `id` and `parentId` are addressed by their bare names and
//! hold plain strings, so no path may descend into them.

use crate::{
    models::record::{Record, ID_FIELD, PARENT_FIELD},
    AppError,
};
use serde_json::{Map, Value};

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.')
}

/// Split `path` into its segments.
///
/// # Errors
/// Returns [`AppError::InvalidValue`] for an empty path, an empty segment
/// (`"a..b"`), or a path that descends into `id` or `parentId`.
pub fn parse(path: &str) -> Result<Vec<&str>, AppError> {
    let parts: Vec<&str> = segments(path).collect();
    if parts.iter().any(|part| part.is_empty()) {
        return Err(AppError::InvalidValue {
            field: path.to_string(),
            reason: "field paths need non-empty segments".to_string(),
        });
    }
    if let [head @ (ID_FIELD | PARENT_FIELD), _, ..] = parts.as_slice() {
        return Err(AppError::InvalidValue {
            field: path.to_string(),
            reason: format!("'{}' is a string and has no nested fields", head),
        });
    }
    Ok(parts)
}

/// The first segment of `path`.
pub fn root_segment(path: &str) -> &str {
    segments(path).next().unwrap_or(path)
}

/// Read the value at `path` inside `map`.
///
/// Returns `None` when a segment is absent or an intermediate value is not a mapping.
pub fn get_in<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = segments(path);
    let first = parts.next()?;
    let mut current = map.get(first)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Return a copy of `map` with `value` stored at `path`.
///
/// Every mapping along the path is shallow-copied; intermediates that are
/// missing or not mappings are replaced by empty mappings.
pub fn set_in(map: &Map<String, Value>, path: &str, value: Value) -> Map<String, Value> {
    let parts: Vec<&str> = segments(path).collect();
    set_segments(map, &parts, value)
}

fn set_segments(map: &Map<String, Value>, parts: &[&str], value: Value) -> Map<String, Value> {
    let mut copy = map.clone();
    match parts {
        [] => {}
        [leaf] => {
            copy.insert((*leaf).to_string(), value);
        }
        [head, rest @ ..] => {
            let nested = match map.get(*head) {
                Some(Value::Object(inner)) => set_segments(inner, rest, value),
                _ => set_segments(&Map::new(), rest, value),
            };
            copy.insert((*head).to_string(), Value::Object(nested));
        }
    }
    copy
}

/// Read the value at `path` from a record.
///
/// `parentId` reads as `null` for roots. Malformed paths read as `None`.
pub fn get(record: &Record, path: &str) -> Option<Value> {
    parse(path).ok()?;
    match path {
        ID_FIELD => Some(Value::String(record.id.clone())),
        PARENT_FIELD => Some(
            record
                .parent_id
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
        ),
        _ => get_in(&record.fields, path).cloned(),
    }
}

/// Return a new record with `value` stored at `path`; `record` is untouched.
///
/// Structural checks (immutable id, dangling parents) belong to the caller;
/// this only enforces the member types.
///
/// # Errors
/// Returns [`AppError::InvalidValue`] when `path` is malformed (see [`parse`]),
/// when `id` is set to a non-string, or when `parentId` is set to something
/// other than a string or `null`.
pub fn set(record: &Record, path: &str, value: Value) -> Result<Record, AppError> {
    let parts = parse(path)?;
    let mut updated = record.clone();
    match (path, value) {
        (ID_FIELD, Value::String(id)) => updated.id = id,
        (PARENT_FIELD, Value::String(parent_id)) => updated.parent_id = Some(parent_id),
        (PARENT_FIELD, Value::Null) => updated.parent_id = None,
        (ID_FIELD | PARENT_FIELD, other) => {
            return Err(AppError::InvalidValue {
                field: path.to_string(),
                reason: format!("expected a string, got {}", other),
            })
        }
        (_, value) => updated.fields = set_segments(&record.fields, &parts, value),
    }
    Ok(updated)
}
