//! Root crate facade for the TreeGrid engine and HTTP server.

pub use treegrid_core::{
    config, drop_zone, engine, models, path, tree, tree_ops, AppError, ColumnDescriptor,
    ColumnType, Config, DropZone, Engine, Event, EventKind, EventObserver, ImportPayload, Intent,
    NewNode, Node, Record, Snapshot, VisibleRow,
};
pub use treegrid_server::{
    create_app, error, event_log, handlers, resolve_bind_address, serve_router, AppState,
    EventLog,
};
