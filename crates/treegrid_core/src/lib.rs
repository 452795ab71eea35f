//! Core engine for TreeGrid (records, tree projections, mutations, events).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across TreeGrid crates.
pub mod constants;
/// Pointer drop-zone classification for interactive reordering.
pub mod drop_zone;
/// Event reducer that applies intents and emits events.
pub mod engine;
/// Process-global environment mutation helpers.
pub mod env;
/// Application error types (reference/structural/input errors).
pub mod error;
/// Data models for records, columns, events, and snapshots.
pub mod models;
/// Dotted field-path access on records.
pub mod path;
/// Tree building and visibility flattening.
pub mod tree;
/// Flat-collection structural operations (descendants, cycles, moves).
pub mod tree_ops;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::{DEFAULT_CLI_SERVER_URL, DEFAULT_PORT};
pub use drop_zone::DropZone;
pub use engine::{Engine, EventObserver, Intent, NewNode};
pub use error::AppError;
pub use models::{
    column::{ChoiceOption, ColumnDescriptor, ColumnType},
    event::{Event, EventKind},
    record::Record,
    snapshot::{ImportPayload, Snapshot},
};
pub use tree::{Node, VisibleRow};
