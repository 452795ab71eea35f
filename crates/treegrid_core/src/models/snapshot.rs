//! Snapshot export/import shape: `{meta, config, data}`.

use super::{column::ColumnDescriptor, record::Record};
use crate::{constants::SNAPSHOT_VERSION, AppError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    pub version: String,
    pub generated_at: DateTime<Utc>,
}

/// Full exportable state: schema, record collection, and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub meta: SnapshotMeta,
    pub config: Vec<ColumnDescriptor>,
    pub data: Vec<Record>,
}

impl Snapshot {
    /// Build a snapshot stamped with the current time.
    pub fn new(config: Vec<ColumnDescriptor>, data: Vec<Record>) -> Self {
        Self {
            meta: SnapshotMeta {
                version: SNAPSHOT_VERSION.to_string(),
                generated_at: Utc::now(),
            },
            config,
            data,
        }
    }
}

/// Parsed import payload. `config: None` keeps the current schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportPayload {
    pub data: Vec<Record>,
    #[serde(default)]
    pub config: Option<Vec<ColumnDescriptor>>,
}

impl ImportPayload {
    /// Validate and decode an untyped import document.
    ///
    /// `meta` is accepted but ignored so exported snapshots import unchanged.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] when `data` is missing or not an array,
    /// and [`AppError::Serialization`] when records/columns are malformed.
    pub fn from_value(value: Value) -> Result<Self, AppError> {
        match value.get("data") {
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(AppError::BadRequest(
                    "Import payload 'data' must be an array".to_string(),
                ))
            }
            None => {
                return Err(AppError::BadRequest(
                    "Import payload is missing 'data'".to_string(),
                ))
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Decode an import document from JSON text.
    ///
    /// # Errors
    /// Same as [`ImportPayload::from_value`], plus JSON syntax errors.
    pub fn from_json(text: &str) -> Result<Self, AppError> {
        Self::from_value(serde_json::from_str(text)?)
    }
}

impl From<Snapshot> for ImportPayload {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            data: snapshot.data,
            config: Some(snapshot.config),
        }
    }
}
