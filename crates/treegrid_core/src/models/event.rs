//! Immutable event records emitted for every committed mutation.

use super::{column::ColumnDescriptor, record::Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One committed mutation: `{id, timestamp, type, payload}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    /// Stamp a new event with a fresh id and the current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind,
        }
    }

    /// Wire name of the event type (e.g. `NODE_MOVED`).
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Event type plus its payload, serialized as `type` / `payload` members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    NodeDataUpdated(NodeDataUpdated),
    NodeMoved(NodeMoved),
    NodeCreated(NodeCreated),
    NodeDeleted(NodeDeleted),
    ConfigUpdated(ConfigUpdated),
    DataImported(DataImported),
}

impl EventKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::NodeDataUpdated(_) => "NODE_DATA_UPDATED",
            Self::NodeMoved(_) => "NODE_MOVED",
            Self::NodeCreated(_) => "NODE_CREATED",
            Self::NodeDeleted(_) => "NODE_DELETED",
            Self::ConfigUpdated(_) => "CONFIG_UPDATED",
            Self::DataImported(_) => "DATA_IMPORTED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDataUpdated {
    pub node_id: String,
    pub field: String,
    /// Absent when the field did not exist before the update; a field that
    /// held `null` reads back as `Some(Value::Null)`.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub old_value: Option<Value>,
    pub new_value: Value,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMoved {
    pub node_id: String,
    pub old_parent_id: Option<String>,
    pub new_parent_id: Option<String>,
    pub new_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeCreated {
    pub node_id: String,
    pub parent_id: Option<String>,
    pub initial_data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDeleted {
    pub target_node_id: String,
    /// Target first, then every descendant.
    pub all_removed_node_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdated {
    pub new_config: Vec<ColumnDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataImported {
    pub data: Vec<Record>,
    pub config: Vec<ColumnDescriptor>,
}
