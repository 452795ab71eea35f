//! Application error types for the tree engine.
use thiserror::Error;

/// Top-level application error type.
///
/// Reference and structural errors leave engine state untouched; callers may
/// treat them as no-ops.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Parent node not found: {0}")]
    ParentNotFound(String),

    #[error("Moving '{node_id}' under '{parent_id}' would create a cycle")]
    Cycle { node_id: String, parent_id: String },

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Field '{0}' cannot be updated")]
    ImmutableField(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Whether the error names a record that does not exist.
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::NodeNotFound(_))
    }

    /// Whether the error would have broken a structural invariant
    /// (missing parent, cycle, duplicate id).
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::ParentNotFound(_) | Self::Cycle { .. } | Self::DuplicateId(_)
        )
    }
}
