//! The event reducer: validates an intent, emits exactly one event, and
//! commits the optimistic state change.
//!
//! Every public mutation runs to completion before returning. On success the
//! event is delivered to all observers and the new collection replaces the
//! old one wholesale; on error nothing is emitted and state is untouched.

mod coerce;
mod intent;
mod observer;


pub use coerce::coerce_for_column;
pub use intent::{Intent, NewNode};
pub use observer::EventObserver;

use crate::{
    drop_zone::{self, DropZone},
    models::{
        column::{validate_columns, ColumnDescriptor},
        event::{
            ConfigUpdated, DataImported, Event, EventKind, NodeCreated, NodeDeleted,
            NodeDataUpdated, NodeMoved,
        },
        record::{Record, ID_FIELD, PARENT_FIELD},
        snapshot::{ImportPayload, Snapshot},
    },
    path,
    tree::{self, Node, VisibleRow},
    tree_ops, AppError,
};
use crossbeam_channel::{unbounded, Receiver};
use observer::ChannelObserver;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// State replaced by one commit. `None` members are left as they are.
#[derive(Default)]
struct Commit {
    records: Option<Vec<Record>>,
    columns: Option<Vec<ColumnDescriptor>>,
    expand: Option<String>,
}

/// Owns the record collection, column schema, and expansion state.
pub struct Engine {
    records: Arc<Vec<Record>>,
    columns: Arc<Vec<ColumnDescriptor>>,
    expanded: HashSet<String>,
    observers: Vec<Box<dyn EventObserver>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("records", &self.records.len())
            .field("columns", &self.columns.len())
            .field("expanded", &self.expanded.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn rejected(operation: &str, err: AppError) -> AppError {
    warn!(operation, error = %err, "intent rejected");
    err
}

/// Check that a whole collection can be committed as-is.
fn validate_collection(records: &[Record]) -> Result<(), AppError> {
    if let Some(id) = tree_ops::find_duplicate_id(records) {
        return Err(AppError::DuplicateId(id.to_string()));
    }
    if let Some(id) = tree_ops::find_cycle(records) {
        return Err(AppError::BadRequest(format!(
            "Record '{}' is part of a parent cycle",
            id
        )));
    }
    let ids: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
    let orphans = records
        .iter()
        .filter(|r| r.parent_id.as_deref().is_some_and(|p| !ids.contains(p)))
        .count();
    if orphans > 0 {
        warn!(orphans, "collection references missing parents; showing them as roots");
    }
    Ok(())
}

impl Engine {
    /// Create an empty engine: no records, no columns, nothing expanded.
    pub fn new() -> Self {
        Self {
            records: Arc::new(Vec::new()),
            columns: Arc::new(Vec::new()),
            expanded: HashSet::new(),
            observers: Vec::new(),
        }
    }

    /// Create an engine seeded with existing state. No event is emitted.
    ///
    /// # Errors
    /// Returns [`AppError::DuplicateId`] or [`AppError::BadRequest`] when the
    /// records or columns break collection invariants.
    pub fn with_state(
        records: Vec<Record>,
        columns: Vec<ColumnDescriptor>,
    ) -> Result<Self, AppError> {
        validate_collection(&records)?;
        validate_columns(&columns)?;
        Ok(Self {
            records: Arc::new(records),
            columns: Arc::new(columns),
            ..Self::new()
        })
    }

    /// Register an observer that receives every future event.
    pub fn add_observer(&mut self, observer: impl EventObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Subscribe to future events through a channel.
    ///
    /// The subscription ends when the receiver is dropped.
    pub fn subscribe(&mut self) -> Receiver<Event> {
        let (tx, rx) = unbounded();
        self.add_observer(ChannelObserver::new(tx));
        rx
    }

    // ----- queries -----

    /// Current record collection. The returned `Arc` is never mutated.
    pub fn records(&self) -> Arc<Vec<Record>> {
        Arc::clone(&self.records)
    }

    pub fn record(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Current column schema.
    pub fn columns(&self) -> Arc<Vec<ColumnDescriptor>> {
        Arc::clone(&self.columns)
    }

    /// Export the schema and records. Expansion state is not included.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.columns.to_vec(), self.records.to_vec())
    }

    /// Nested view of the whole collection.
    pub fn tree(&self) -> Vec<Node> {
        tree::build_tree(&self.records, None)
    }

    /// Rows currently visible given the expansion state.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        tree::flatten_visible(&self.tree(), &self.expanded)
    }

    pub fn expanded(&self) -> &HashSet<String> {
        &self.expanded
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    // ----- expansion (view state, no events) -----

    /// Flip the expansion state of `id`.
    ///
    /// # Returns
    /// The new state (`true` when expanded).
    ///
    /// # Errors
    /// Returns [`AppError::NodeNotFound`] for unknown ids.
    pub fn toggle_expanded(&mut self, id: &str) -> Result<bool, AppError> {
        let expand = !self.expanded.contains(id);
        self.set_expanded(id, expand)?;
        Ok(expand)
    }

    /// Expand or collapse `id`.
    ///
    /// # Errors
    /// Returns [`AppError::NodeNotFound`] for unknown ids.
    pub fn set_expanded(&mut self, id: &str, expanded: bool) -> Result<(), AppError> {
        if self.record(id).is_none() {
            return Err(AppError::NodeNotFound(id.to_string()));
        }
        if expanded {
            self.expanded.insert(id.to_string());
        } else {
            self.expanded.remove(id);
        }
        Ok(())
    }

    /// Expand every record that has at least one child.
    pub fn expand_all(&mut self) {
        let parents: HashSet<String> = self
            .records
            .iter()
            .filter_map(|r| r.parent_id.clone())
            .filter(|parent_id| self.record(parent_id).is_some())
            .collect();
        self.expanded.extend(parents);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    // ----- operations -----

    /// Dispatch one [`Intent`] to its operation.
    ///
    /// # Errors
    /// Whatever the underlying operation returns.
    pub fn apply(&mut self, intent: Intent) -> Result<Event, AppError> {
        match intent {
            Intent::UpdateField {
                node_id,
                field,
                value,
            } => self.update_field(&node_id, &field, value),
            Intent::Move {
                node_id,
                new_parent_id,
                new_index,
            } => self.move_node(&node_id, new_parent_id.as_deref(), new_index),
            Intent::Create(node) => self.create_node(node),
            Intent::Delete { node_id } => self.delete_node(&node_id),
            Intent::ReplaceColumns { columns } => self.replace_columns(columns),
            Intent::Import { data, config } => self.import(ImportPayload { data, config }),
        }
    }

    /// Set the value at `field` (a dotted path) on one record.
    ///
    /// The value is coerced through the column editing `field`, if any.
    /// `parentId` updates are checked like a move but keep the record's
    /// position in the collection.
    ///
    /// # Errors
    /// - [`AppError::NodeNotFound`] when `node_id` does not exist.
    /// - [`AppError::ImmutableField`] for `id` or any path under it.
    /// - [`AppError::InvalidValue`] for a malformed path or when coercion fails.
    /// - [`AppError::ParentNotFound`] / [`AppError::Cycle`] for bad `parentId` values.
    pub fn update_field(
        &mut self,
        node_id: &str,
        field: &str,
        value: Value,
    ) -> Result<Event, AppError> {
        const OP: &str = "update_field";
        let position = self
            .position(node_id)
            .ok_or_else(|| rejected(OP, AppError::NodeNotFound(node_id.to_string())))?;
        if path::root_segment(field) == ID_FIELD {
            return Err(rejected(OP, AppError::ImmutableField(field.to_string())));
        }
        path::parse(field).map_err(|e| rejected(OP, e))?;
        let value = coerce_for_column(&self.columns, field, value).map_err(|e| rejected(OP, e))?;
        if field == PARENT_FIELD {
            if let Value::String(parent_id) = &value {
                self.check_parent(node_id, parent_id)
                    .map_err(|e| rejected(OP, e))?;
            }
        }

        let current = &self.records[position];
        let old_value = path::get(current, field);
        let updated = path::set(current, field, value.clone()).map_err(|e| rejected(OP, e))?;

        let mut records = self.records.to_vec();
        records[position] = updated;
        let event = EventKind::NodeDataUpdated(NodeDataUpdated {
            node_id: node_id.to_string(),
            field: field.to_string(),
            old_value,
            new_value: value,
        });
        Ok(self.commit(
            event,
            Commit {
                records: Some(records),
                ..Commit::default()
            },
        ))
    }

    /// Move `node_id` under `new_parent_id` (root when `None`) at sibling
    /// position `new_index`.
    ///
    /// Moving to the current parent and position is allowed and still emits
    /// an event.
    ///
    /// # Errors
    /// - [`AppError::NodeNotFound`] when `node_id` does not exist.
    /// - [`AppError::ParentNotFound`] when `new_parent_id` does not exist.
    /// - [`AppError::Cycle`] when the new parent is the node or one of its descendants.
    pub fn move_node(
        &mut self,
        node_id: &str,
        new_parent_id: Option<&str>,
        new_index: usize,
    ) -> Result<Event, AppError> {
        const OP: &str = "move_node";
        let old_parent_id = self
            .record(node_id)
            .ok_or_else(|| rejected(OP, AppError::NodeNotFound(node_id.to_string())))?
            .parent_id
            .clone();
        if let Some(parent_id) = new_parent_id {
            self.check_parent(node_id, parent_id)
                .map_err(|e| rejected(OP, e))?;
        }

        let records = tree_ops::plan_move(&self.records, node_id, new_parent_id, new_index)
            .ok_or_else(|| rejected(OP, AppError::NodeNotFound(node_id.to_string())))?;
        let event = EventKind::NodeMoved(NodeMoved {
            node_id: node_id.to_string(),
            old_parent_id,
            new_parent_id: new_parent_id.map(str::to_string),
            new_index,
        });
        Ok(self.commit(
            event,
            Commit {
                records: Some(records),
                ..Commit::default()
            },
        ))
    }

    /// Classify a pointer drop over `hovered_id` and move `dragged_id` accordingly.
    ///
    /// # Errors
    /// - [`AppError::NodeNotFound`] when either record does not exist.
    /// - [`AppError::BadRequest`] when a record is dropped onto itself.
    /// - Any error from [`Engine::move_node`].
    pub fn drop_node(
        &mut self,
        dragged_id: &str,
        hovered_id: &str,
        offset: f64,
        height: f64,
    ) -> Result<Event, AppError> {
        const OP: &str = "drop_node";
        for id in [dragged_id, hovered_id] {
            if self.record(id).is_none() {
                return Err(rejected(OP, AppError::NodeNotFound(id.to_string())));
            }
        }
        let zone: DropZone = drop_zone::classify(offset, height);
        let target = drop_zone::drop_target(&self.records, dragged_id, hovered_id, zone)
            .ok_or_else(|| {
                rejected(
                    OP,
                    AppError::BadRequest(format!("Cannot drop '{}' onto itself", dragged_id)),
                )
            })?;
        debug!(dragged_id, hovered_id, ?zone, "drop classified");
        self.move_node(dragged_id, target.new_parent_id.as_deref(), target.new_index)
    }

    /// Append a new record and expand its parent.
    ///
    /// `id`/`parentId` keys inside `data` are ignored; the request's own
    /// members win. Top-level data fields are coerced through their columns.
    ///
    /// # Errors
    /// - [`AppError::BadRequest`] for a blank id.
    /// - [`AppError::DuplicateId`] when the id is taken.
    /// - [`AppError::ParentNotFound`] when the parent does not exist.
    /// - [`AppError::InvalidValue`] when a data field fails coercion.
    pub fn create_node(&mut self, node: NewNode) -> Result<Event, AppError> {
        const OP: &str = "create_node";
        let NewNode {
            id,
            parent_id,
            mut data,
        } = node;
        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        if id.trim().is_empty() {
            return Err(rejected(
                OP,
                AppError::BadRequest("Record id must not be empty".to_string()),
            ));
        }
        if self.record(&id).is_some() {
            return Err(rejected(OP, AppError::DuplicateId(id)));
        }
        if let Some(parent) = parent_id.as_deref() {
            if self.record(parent).is_none() {
                return Err(rejected(OP, AppError::ParentNotFound(parent.to_string())));
            }
        }

        data.remove(ID_FIELD);
        data.remove(PARENT_FIELD);
        for (key, value) in data.iter_mut() {
            *value = coerce_for_column(&self.columns, key, value.take())
                .map_err(|e| rejected(OP, e))?;
        }

        let record = Record {
            id: id.clone(),
            parent_id: parent_id.clone(),
            fields: data.clone(),
        };
        let mut records = self.records.to_vec();
        records.push(record);
        let event = EventKind::NodeCreated(NodeCreated {
            node_id: id,
            parent_id: parent_id.clone(),
            initial_data: data,
        });
        Ok(self.commit(
            event,
            Commit {
                records: Some(records),
                expand: parent_id,
                ..Commit::default()
            },
        ))
    }

    /// Remove `node_id` and all of its descendants.
    ///
    /// # Errors
    /// Returns [`AppError::NodeNotFound`] when `node_id` does not exist.
    pub fn delete_node(&mut self, node_id: &str) -> Result<Event, AppError> {
        if self.record(node_id).is_none() {
            return Err(rejected(
                "delete_node",
                AppError::NodeNotFound(node_id.to_string()),
            ));
        }
        let mut removed = vec![node_id.to_string()];
        removed.extend(tree_ops::descendant_ids(&self.records, node_id));

        let remove_set: HashSet<&str> = removed.iter().map(String::as_str).collect();
        let records: Vec<Record> = self
            .records
            .iter()
            .filter(|r| !remove_set.contains(r.id.as_str()))
            .cloned()
            .collect();
        let event = EventKind::NodeDeleted(NodeDeleted {
            target_node_id: node_id.to_string(),
            all_removed_node_ids: removed,
        });
        Ok(self.commit(
            event,
            Commit {
                records: Some(records),
                ..Commit::default()
            },
        ))
    }

    /// Replace the column schema wholesale.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] for duplicate or blank column ids/fields.
    pub fn replace_columns(&mut self, columns: Vec<ColumnDescriptor>) -> Result<Event, AppError> {
        validate_columns(&columns).map_err(|e| rejected("replace_columns", e))?;
        let event = EventKind::ConfigUpdated(ConfigUpdated {
            new_config: columns.clone(),
        });
        Ok(self.commit(
            event,
            Commit {
                columns: Some(columns),
                ..Commit::default()
            },
        ))
    }

    /// Replace records (and optionally the schema) wholesale.
    ///
    /// # Errors
    /// Returns [`AppError::DuplicateId`] or [`AppError::BadRequest`] when the
    /// payload breaks collection invariants; prior state is kept.
    pub fn import(&mut self, payload: ImportPayload) -> Result<Event, AppError> {
        const OP: &str = "import";
        validate_collection(&payload.data).map_err(|e| rejected(OP, e))?;
        let columns = match payload.config {
            Some(columns) => {
                validate_columns(&columns).map_err(|e| rejected(OP, e))?;
                columns
            }
            None => self.columns.to_vec(),
        };
        let event = EventKind::DataImported(DataImported {
            data: payload.data.clone(),
            config: columns.clone(),
        });
        Ok(self.commit(
            event,
            Commit {
                records: Some(payload.data),
                columns: Some(columns),
                ..Commit::default()
            },
        ))
    }

    /// Import a snapshot document from JSON text.
    ///
    /// # Errors
    /// Input-shape errors from [`ImportPayload::from_json`] plus those of [`Engine::import`].
    pub fn import_json(&mut self, text: &str) -> Result<Event, AppError> {
        let payload = ImportPayload::from_json(text).map_err(|e| rejected("import", e))?;
        self.import(payload)
    }

    // ----- internals -----

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    fn check_parent(&self, node_id: &str, parent_id: &str) -> Result<(), AppError> {
        if self.record(parent_id).is_none() {
            return Err(AppError::ParentNotFound(parent_id.to_string()));
        }
        if tree_ops::introduces_cycle(&self.records, node_id, parent_id) {
            return Err(AppError::Cycle {
                node_id: node_id.to_string(),
                parent_id: parent_id.to_string(),
            });
        }
        Ok(())
    }

    fn commit(&mut self, kind: EventKind, next: Commit) -> Event {
        let event = Event::new(kind);
        for observer in &mut self.observers {
            observer.notify(&event);
        }
        self.observers.retain(|observer| !observer.is_closed());

        if let Some(records) = next.records {
            self.records = Arc::new(records);
        }
        if let Some(columns) = next.columns {
            self.columns = Arc::new(columns);
        }
        if let Some(id) = next.expand {
            self.expanded.insert(id);
        }
        debug!(
            event_id = %event.id,
            kind = event.type_name(),
            records = self.records.len(),
            "event committed"
        );
        event
    }
}
