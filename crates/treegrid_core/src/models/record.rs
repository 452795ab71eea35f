//! Record model: an identity-bearing row with a parent reference.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the immutable identity member.
pub const ID_FIELD: &str = "id";
/// Name of the parent-reference member.
pub const PARENT_FIELD: &str = "parentId";

/// A flat record: `id`, `parentId`, and an open, key-ordered map of domain fields.
///
/// Serialized as a single JSON object, e.g.
/// `{"id": "2", "parentId": null, "name": "Ops", "budget": 20000}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Create a root record with no domain fields.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            fields: Map::new(),
        }
    }

    /// Create a record under `parent_id` (or a root when `None`).
    pub fn with_parent(id: impl Into<String>, parent_id: Option<&str>) -> Self {
        Self {
            parent_id: parent_id.map(str::to_string),
            ..Self::new(id)
        }
    }

    /// Builder-style helper that sets a top-level domain field.
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Returns `true` when the record has no parent reference.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Returns `true` when the record's parent equals `parent_id`.
    pub fn has_parent(&self, parent_id: Option<&str>) -> bool {
        self.parent_id.as_deref() == parent_id
    }
}
