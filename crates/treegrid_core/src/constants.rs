//! Shared constants used across TreeGrid crates.

/// Default API port for the TreeGrid server.
pub const DEFAULT_PORT: u16 = 38521;

/// Default maximum request body accepted by the API layer (imports included).
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 16 * 1024 * 1024;

/// Default number of events the server keeps for `/api/events`.
pub const DEFAULT_EVENT_LOG_LIMIT: usize = 10_000;

/// Default base URL for CLI/API clients.
pub const DEFAULT_CLI_SERVER_URL: &str = "http://localhost:38521";

/// Snapshot format version written into exported `meta.version`.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Pointer offsets below this fraction of the row height drop before the row.
pub const DROP_BEFORE_FRACTION: f64 = 0.35;

/// Pointer offsets above this fraction of the row height drop after the row.
pub const DROP_AFTER_FRACTION: f64 = 0.65;
