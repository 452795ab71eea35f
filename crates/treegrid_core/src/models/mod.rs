//! Data models for records, schema, events, and snapshots.

/// Column descriptor schema types.
pub mod column;
/// Event records and payloads.
pub mod event;
/// Flat record type.
pub mod record;
/// Snapshot export/import shapes.
pub mod snapshot;

#[cfg(test)]
mod tests;
