//! HTTP error mapping for API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use treegrid_core::AppError;

/// Error returned by handlers: a status code plus a JSON `{"error": ...}` body.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    /// Build an error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The shared engine lock was poisoned by a panicking handler.
    pub fn engine_unavailable() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Engine state is unavailable",
        )
    }
}

/// Status code for an engine error.
///
/// Unknown ids are 404, structural conflicts 409, rejected values 422 and
/// malformed input 400.
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::NodeNotFound(_) => StatusCode::NOT_FOUND,
        AppError::ParentNotFound(_) | AppError::Cycle { .. } | AppError::DuplicateId(_) => {
            StatusCode::CONFLICT
        }
        AppError::ImmutableField(_) | AppError::InvalidValue { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AppError::BadRequest(_) | AppError::Serialization(_) => StatusCode::BAD_REQUEST,
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        Self::new(status_for(&err), err.to_string())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        }
        let body = Json(json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}
