//! Sled-backed scene store

use crate::error::ApiError;
use crate::persistence::SceneDocument;
use crate::store::{SceneRecord, SceneStore, SceneSummary};
use std::path::Path;
use tracing::{debug, info};

const SCENE_PREFIX: &str = "scene:";

/// Sled-based implementation of [`SceneStore`]. Records are JSON encoded.
pub struct SledSceneStore {
    db: sled::Db,
}

impl SledSceneStore {
    /// Open (or create) a store in the directory at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ApiError> {
        let db = sled::open(path.as_ref()).map_err(|e| {
            ApiError::Storage(format!(
                "Failed to open sled database at {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(Self { db })
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), ApiError> {
        self.db.flush()?;
        Ok(())
    }

    fn key(name: &str) -> Result<String, ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::Storage("Scene name cannot be empty".to_string()));
        }
        Ok(format!("{}{}", SCENE_PREFIX, name))
    }
}

impl SceneStore for SledSceneStore {
    fn put(&self, name: &str, document: &SceneDocument) -> Result<SceneRecord, ApiError> {
        let key = Self::key(name)?;
        let stored_at = chrono::Utc::now().timestamp();
        let record = SceneRecord {
            name: name.to_string(),
            fingerprint: document.fingerprint()?,
            node_count: document.node_count(),
            stored_at,
            document: document.clone(),
        };
        let value = serde_json::to_vec(&record)?;
        self.db.insert(key.as_bytes(), value)?;
        info!(scene = name, fingerprint = %record.fingerprint, "Stored scene document");
        Ok(record)
    }

    fn get(&self, name: &str) -> Result<Option<SceneRecord>, ApiError> {
        let key = Self::key(name)?;
        match self.db.get(key.as_bytes())? {
            Some(value) => {
                let record: SceneRecord = serde_json::from_slice(&value).map_err(|e| {
                    ApiError::Storage(format!("Failed to decode scene record {}: {}", name, e))
                })?;
                debug!(scene = name, "Loaded scene record");
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<SceneSummary>, ApiError> {
        let mut summaries = Vec::new();
        for item in self.db.scan_prefix(SCENE_PREFIX.as_bytes()) {
            let (_, value) = item?;
            let record: SceneRecord = serde_json::from_slice(&value)
                .map_err(|e| ApiError::Storage(format!("Failed to decode scene record: {}", e)))?;
            summaries.push(SceneSummary::from(&record));
        }
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    fn delete(&self, name: &str) -> Result<bool, ApiError> {
        let key = Self::key(name)?;
        Ok(self.db.remove(key.as_bytes())?.is_some())
    }
}
