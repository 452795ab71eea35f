//! Event history and raw intent handlers.

use crate::{error::HttpError, AppState, LoggedEvent};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use treegrid_core::{Event, Intent};

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// Only return events with a sequence number greater than this.
    pub since: Option<u64>,
}

/// List retained events, oldest first.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<LoggedEvent>> {
    Json(state.events.since(query.since.unwrap_or(0)))
}

/// Apply one `{"op": ...}` intent.
pub async fn apply_intent(
    State(state): State<AppState>,
    Json(intent): Json<Intent>,
) -> Result<Json<Event>, HttpError> {
    let event = state.engine()?.apply(intent)?;
    Ok(Json(event))
}
