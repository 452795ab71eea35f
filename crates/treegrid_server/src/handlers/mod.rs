//! HTTP request handlers.

/// Event history and raw intent endpoints.
pub mod events;
/// Record query and mutation endpoints.
pub mod records;
/// Column schema and snapshot endpoints.
pub mod schema;
/// Tree, visible-row, and expansion endpoints.
pub mod view;
