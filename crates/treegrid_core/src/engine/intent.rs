//! Structured operation requests accepted by [`super::Engine::apply`].

use crate::models::{column::ColumnDescriptor, record::Record};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request to create a record. A missing `id` gets a generated UUID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// One operation of the fixed operation set, tagged by `op`.
///
/// ```json
/// {"op": "move", "nodeId": "1-1", "newParentId": null, "newIndex": 0}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "op",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Intent {
    UpdateField {
        node_id: String,
        field: String,
        value: Value,
    },
    Move {
        node_id: String,
        #[serde(default)]
        new_parent_id: Option<String>,
        new_index: usize,
    },
    Create(NewNode),
    Delete {
        node_id: String,
    },
    ReplaceColumns {
        columns: Vec<ColumnDescriptor>,
    },
    Import {
        data: Vec<Record>,
        #[serde(default)]
        config: Option<Vec<ColumnDescriptor>>,
    },
}
