//! Scene Store
//!
//! Named, durable storage for scene documents. Each record keeps the
//! document together with its fingerprint so callers can detect changes
//! without comparing whole trees.

pub mod persistence;

pub use persistence::SledSceneStore;

use crate::error::ApiError;
use crate::persistence::SceneDocument;
use serde::{Deserialize, Serialize};

/// A stored scene document and its bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRecord {
    pub name: String,
    pub fingerprint: String,
    pub node_count: usize,
    /// Seconds since the Unix epoch.
    pub stored_at: i64,
    pub document: SceneDocument,
}

/// Listing entry without the document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSummary {
    pub name: String,
    pub fingerprint: String,
    pub node_count: usize,
    pub stored_at: i64,
}

impl From<&SceneRecord> for SceneSummary {
    fn from(record: &SceneRecord) -> Self {
        Self {
            name: record.name.clone(),
            fingerprint: record.fingerprint.clone(),
            node_count: record.node_count,
            stored_at: record.stored_at,
        }
    }
}

/// Scene document store interface
pub trait SceneStore {
    /// Store `document` under `name`, replacing any previous record.
    fn put(&self, name: &str, document: &SceneDocument) -> Result<SceneRecord, ApiError>;
    fn get(&self, name: &str) -> Result<Option<SceneRecord>, ApiError>;
    /// Summaries sorted by name.
    fn list(&self) -> Result<Vec<SceneSummary>, ApiError>;
    /// Returns false when nothing was stored under `name`.
    fn delete(&self, name: &str) -> Result<bool, ApiError>;
}
