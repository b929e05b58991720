//! Error types for the Strata scene graph.

use crate::types::{NodeKey, SlotKind};
use thiserror::Error;

/// Errors raised by structural edits, layout validation and slot resolution.
///
/// Structural errors are always raised before any state is touched, so a
/// failed mutation leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Node not found: {0}")]
    NotFound(NodeKey),

    #[error("Duplicate node key: {0}")]
    DuplicateKey(NodeKey),

    #[error("Layout conflict: {first} overlaps {second}")]
    LayoutConflict { first: NodeKey, second: NodeKey },

    #[error("Node {node} falls outside the grid: x={x} width={width} columns={columns}")]
    OutOfBounds {
        node: NodeKey,
        x: u32,
        width: u32,
        columns: u32,
    },

    #[error("Slot {kind} unresolved at {node}: no local value, no ancestor value and no default")]
    UnresolvedSlot { node: NodeKey, kind: SlotKind },

    #[error("Invalid {kind} value: {reason}")]
    InvalidSlotValue { kind: SlotKind, reason: String },
}

/// Errors surfaced at the crate boundary (persistence, storage, configuration).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Persistence(err.to_string())
    }
}

impl From<sled::Error> for ApiError {
    fn from(err: sled::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}
