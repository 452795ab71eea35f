//! Column schema and snapshot import/export handlers.

use crate::{error::HttpError, AppState};
use axum::{extract::State, Json};
use serde_json::Value;
use treegrid_core::{ColumnDescriptor, Event, ImportPayload, Snapshot};

pub async fn get_columns(
    State(state): State<AppState>,
) -> Result<Json<Vec<ColumnDescriptor>>, HttpError> {
    let columns = state.engine()?.columns();
    Ok(Json(columns.to_vec()))
}

/// Replace the column schema wholesale.
///
/// # Returns
/// The `CONFIG_UPDATED` event.
pub async fn replace_columns(
    State(state): State<AppState>,
    Json(columns): Json<Vec<ColumnDescriptor>>,
) -> Result<Json<Event>, HttpError> {
    let event = state.engine()?.replace_columns(columns)?;
    Ok(Json(event))
}

/// Export `{meta, config, data}`. Expansion state is not part of the snapshot.
pub async fn export_snapshot(State(state): State<AppState>) -> Result<Json<Snapshot>, HttpError> {
    Ok(Json(state.engine()?.snapshot()))
}

/// Import a snapshot document, replacing records and (when given) the schema.
///
/// The body is taken as untyped JSON so a missing or non-array `data` member
/// is reported as a 400 with a specific message.
///
/// # Returns
/// The `DATA_IMPORTED` event.
pub async fn import_snapshot(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Event>, HttpError> {
    let payload = ImportPayload::from_value(body)?;
    let event = state.engine()?.import(payload)?;
    Ok(Json(event))
}
