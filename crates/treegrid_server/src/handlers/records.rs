//! Record HTTP handlers.

use crate::{error::HttpError, AppError, AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use treegrid_core::{Event, NewNode, Record};

/// Body of `PUT /api/records/:id/field`.
#[derive(Debug, Deserialize)]
pub struct FieldUpdateRequest {
    pub field: String,
    #[serde(default)]
    pub value: Value,
}

/// Body of `POST /api/records/:id/move`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    #[serde(default)]
    pub new_parent_id: Option<String>,
    pub new_index: usize,
}

/// Body of `POST /api/records/:id/drop`: pointer offset within the hovered row.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropRequest {
    pub target_id: String,
    pub offset: f64,
    pub height: f64,
}

/// List the flat record collection in collection order.
pub async fn list_records(State(state): State<AppState>) -> Result<Json<Vec<Record>>, HttpError> {
    let records = state.engine()?.records();
    Ok(Json(records.to_vec()))
}

/// Fetch one record.
///
/// # Errors
/// Returns 404 when the id is unknown.
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, HttpError> {
    let engine = state.engine()?;
    let record = engine.record(&id).cloned().ok_or(AppError::NodeNotFound(id))?;
    Ok(Json(record))
}

/// Create a record from `{id?, parentId?, data?}`.
///
/// # Returns
/// The `NODE_CREATED` event.
pub async fn create_record(
    State(state): State<AppState>,
    Json(req): Json<NewNode>,
) -> Result<Json<Event>, HttpError> {
    let event = state.engine()?.create_node(req)?;
    Ok(Json(event))
}

/// Update one field path on a record.
///
/// # Returns
/// The `NODE_DATA_UPDATED` event.
pub async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<FieldUpdateRequest>,
) -> Result<Json<Event>, HttpError> {
    let event = state.engine()?.update_field(&id, &req.field, req.value)?;
    Ok(Json(event))
}

/// Move a record under a new parent at a sibling index.
pub async fn move_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<Event>, HttpError> {
    let event = state
        .engine()?
        .move_node(&id, req.new_parent_id.as_deref(), req.new_index)?;
    Ok(Json(event))
}

/// Drop a record onto another row; the pointer offset picks before/inside/after.
pub async fn drop_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DropRequest>,
) -> Result<Json<Event>, HttpError> {
    let event = state
        .engine()?
        .drop_node(&id, &req.target_id, req.offset, req.height)?;
    Ok(Json(event))
}

/// Delete a record and its descendants.
///
/// # Returns
/// The `NODE_DELETED` event listing every removed id.
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, HttpError> {
    let event = state.engine()?.delete_node(&id)?;
    Ok(Json(event))
}
