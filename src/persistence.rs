//! Scene Documents
//!
//! JSON form of a scene tree: `key`, node `type`, `children[]`,
//! `localSlots{}` and `layout{}`. Only authoritative state is written;
//! resolved bindings are always recomputed after loading.

use crate::error::{ApiError, SceneError};
use crate::graph::SceneGraph;
use crate::layout::{GridConstraints, LayoutMeta};
use crate::slot::{ContextSlot, RootDefaults};
use crate::tree::{NodeBuilder, NodeKind, SceneNode, SceneTree, Subtree};
use crate::types::{NodeKey, SlotKind, SlotValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, instrument};

/// Serialized node and its descendants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    pub key: NodeKey,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub children: Vec<SceneDocument>,
    /// Slot kind to payload; `null` is an explicit empty.
    #[serde(default)]
    pub local_slots: BTreeMap<SlotKind, serde_json::Value>,
    #[serde(default)]
    pub layout: LayoutMeta,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub collapsed: bool,
}

impl SceneDocument {
    /// Document for `key` and everything below it in `tree`.
    pub fn from_tree(tree: &SceneTree, key: &NodeKey) -> Result<Self, ApiError> {
        export(&|k| tree.node(k), key)
    }

    pub fn from_subtree(subtree: &Subtree) -> Result<Self, ApiError> {
        let nodes: &HashMap<NodeKey, SceneNode> = &subtree.nodes;
        export(&|k| nodes.get(k), subtree.root())
    }

    pub fn from_graph(graph: &SceneGraph) -> Result<Self, ApiError> {
        Self::from_tree(graph.tree(), graph.tree().root())
    }

    /// Rebuild a detached subtree, validating keys and slot values as it goes.
    pub fn to_subtree(&self) -> Result<Subtree, ApiError> {
        Ok(self.to_builder()?.build()?)
    }

    /// Load as a whole scene graph.
    #[instrument(skip(self, defaults, constraints), fields(root = %self.key))]
    pub fn into_graph(
        &self,
        defaults: RootDefaults,
        constraints: GridConstraints,
    ) -> Result<SceneGraph, ApiError> {
        let graph = SceneGraph::new(self.to_subtree()?, defaults, constraints)?;
        info!(nodes = graph.tree().len(), "Loaded scene document");
        Ok(graph)
    }

    fn to_builder(&self) -> Result<NodeBuilder, ApiError> {
        let mut builder = NodeBuilder::new(self.key.clone(), self.kind.clone())
            .layout(self.layout.clone())
            .collapsed(self.collapsed);
        if let Some(title) = &self.title {
            builder = builder.title(title.clone());
        }
        for (kind, payload) in &self.local_slots {
            let slot = if payload.is_null() {
                ContextSlot::empty(*kind)
            } else {
                let value = SlotValue::from_json(*kind, payload.clone()).map_err(|e| {
                    SceneError::InvalidSlotValue {
                        kind: *kind,
                        reason: format!("{} at node {}", e, self.key),
                    }
                })?;
                ContextSlot::new(value)
            };
            builder = builder.context_slot(slot);
        }
        for child in &self.children {
            builder = builder.child(child.to_builder()?)?;
        }
        Ok(builder)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ApiError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, ApiError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read_from(path: &Path) -> Result<Self, ApiError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ApiError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Hex blake3 digest of the compact JSON encoding. Object keys are
    /// emitted in sorted order, so equal documents hash equally.
    pub fn fingerprint(&self) -> Result<String, ApiError> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(blake3::hash(&bytes).as_bytes()))
    }

    /// Number of nodes in the document.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneDocument::node_count).sum::<usize>()
    }
}

fn export<'a>(
    lookup: &dyn Fn(&NodeKey) -> Option<&'a SceneNode>,
    key: &NodeKey,
) -> Result<SceneDocument, ApiError> {
    let node = lookup(key).ok_or_else(|| SceneError::NotFound(key.clone()))?;
    let mut local_slots = BTreeMap::new();
    for (kind, value) in node.local_slots().iter() {
        let payload = match value {
            Some(value) => value.to_json()?,
            None => serde_json::Value::Null,
        };
        local_slots.insert(kind, payload);
    }
    let children = node
        .children()
        .iter()
        .map(|child| export(lookup, child))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SceneDocument {
        key: node.key().clone(),
        kind: node.kind().clone(),
        title: node.title().map(str::to_string),
        children,
        local_slots,
        layout: node.layout().clone(),
        collapsed: node.is_collapsed(),
    })
}
