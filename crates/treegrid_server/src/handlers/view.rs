//! Derived views and expansion state.

use crate::{error::HttpError, AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use treegrid_core::{Node, VisibleRow};

#[derive(Debug, Deserialize)]
pub struct ExpansionRequest {
    pub expanded: bool,
}

#[derive(Debug, Serialize)]
pub struct ExpansionState {
    pub id: String,
    pub expanded: bool,
}

/// Sorted ids of every expanded record.
#[derive(Debug, Serialize)]
pub struct ExpandedIds {
    pub expanded: Vec<String>,
}

fn expanded_ids(state: &AppState) -> Result<ExpandedIds, HttpError> {
    let mut expanded: Vec<String> = state.engine()?.expanded().iter().cloned().collect();
    expanded.sort();
    Ok(ExpandedIds { expanded })
}

pub async fn get_tree(State(state): State<AppState>) -> Result<Json<Vec<Node>>, HttpError> {
    Ok(Json(state.engine()?.tree()))
}

/// Rows a viewer would render under the current expansion state.
pub async fn get_rows(State(state): State<AppState>) -> Result<Json<Vec<VisibleRow>>, HttpError> {
    Ok(Json(state.engine()?.visible_rows()))
}

pub async fn toggle_expansion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExpansionState>, HttpError> {
    let expanded = state.engine()?.toggle_expanded(&id)?;
    Ok(Json(ExpansionState { id, expanded }))
}

pub async fn set_expansion(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ExpansionRequest>,
) -> Result<Json<ExpansionState>, HttpError> {
    state.engine()?.set_expanded(&id, req.expanded)?;
    Ok(Json(ExpansionState {
        id,
        expanded: req.expanded,
    }))
}

pub async fn expand_all(State(state): State<AppState>) -> Result<Json<ExpandedIds>, HttpError> {
    state.engine()?.expand_all();
    Ok(Json(expanded_ids(&state)?))
}

pub async fn collapse_all(State(state): State<AppState>) -> Result<Json<ExpandedIds>, HttpError> {
    state.engine()?.collapse_all();
    Ok(Json(expanded_ids(&state)?))
}
