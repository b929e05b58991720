//! The attached scene tree
//!
//! Nodes live in a key-indexed arena with a parent index beside it, the same
//! shape the children lists describe. All structural edits are split into a
//! `check_*` half that only reads and a commit half that cannot fail, so an
//! edit that is rejected never leaves a partial change behind.

use crate::error::SceneError;
use crate::layout::{LayoutItem, LayoutMeta};
use crate::slot::{BindingSource, ContextSlot, ResolvedBinding, RootDefaults};
use crate::tree::builder::Subtree;
use crate::tree::node::{NodeKind, NodeState, SceneNode};
use crate::tree::walker::{self, Ancestors};
use crate::types::{NodeKey, SlotKind};
use std::collections::HashMap;
use tracing::debug;

/// A rooted tree of attached scene nodes.
#[derive(Debug, Clone)]
pub struct SceneTree {
    root: NodeKey,
    pub(crate) nodes: HashMap<NodeKey, SceneNode>,
    pub(crate) parents: HashMap<NodeKey, NodeKey>,
}

impl SceneTree {
    /// Adopt a detached subtree as a whole tree; its root becomes the scene root.
    pub fn from_subtree(subtree: Subtree) -> Self {
        let mut tree = Self {
            root: subtree.root.clone(),
            nodes: HashMap::with_capacity(subtree.nodes.len()),
            parents: HashMap::new(),
        };
        tree.adopt(subtree);
        tree
    }

    pub fn root(&self) -> &NodeKey {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn node(&self, key: &NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn get(&self, key: &NodeKey) -> Result<&SceneNode, SceneError> {
        self.nodes
            .get(key)
            .ok_or_else(|| SceneError::NotFound(key.clone()))
    }

    fn get_mut(&mut self, key: &NodeKey) -> Result<&mut SceneNode, SceneError> {
        self.nodes
            .get_mut(key)
            .ok_or_else(|| SceneError::NotFound(key.clone()))
    }

    pub fn parent(&self, key: &NodeKey) -> Option<&NodeKey> {
        self.parents.get(key)
    }

    pub fn ancestors(&self, key: &NodeKey) -> Ancestors<'_> {
        Ancestors::new(self, key)
    }

    pub fn depth(&self, key: &NodeKey) -> usize {
        self.ancestors(key).count()
    }

    /// True when `ancestor` is a strict ancestor of `key`.
    pub fn is_ancestor_of(&self, ancestor: &NodeKey, key: &NodeKey) -> bool {
        self.ancestors(key).any(|k| k == ancestor)
    }

    /// `key` and all its descendants, pre-order.
    pub fn descendants(&self, key: &NodeKey) -> Vec<NodeKey> {
        walker::descendants(self, key)
    }

    /// Walk from `key` toward the root and return the first local definition
    /// of `kind`, else the root default.
    pub fn resolve_slot(
        &self,
        key: &NodeKey,
        kind: SlotKind,
        defaults: &RootDefaults,
    ) -> Result<ResolvedBinding, SceneError> {
        let node = self.get(key)?;
        if let Some(value) = node.slots.get(kind) {
            return Ok(ResolvedBinding {
                node: key.clone(),
                kind,
                value: value.clone(),
                source: BindingSource::Local,
            });
        }

        for (offset, ancestor) in self.ancestors(key).enumerate() {
            let Some(value) = self.nodes.get(ancestor).and_then(|a| a.slots.get(kind)) else {
                continue;
            };
            return Ok(ResolvedBinding {
                node: key.clone(),
                kind,
                value: value.clone(),
                source: BindingSource::Inherited {
                    ancestor: ancestor.clone(),
                    depth: offset + 1,
                },
            });
        }

        match defaults.get(kind) {
            Some(value) => Ok(ResolvedBinding {
                node: key.clone(),
                kind,
                value: Some(value.clone()),
                source: BindingSource::Default,
            }),
            None => Err(SceneError::UnresolvedSlot {
                node: key.clone(),
                kind,
            }),
        }
    }

    pub fn check_attach(
        &self,
        parent: &NodeKey,
        subtree: &Subtree,
        index: Option<usize>,
    ) -> Result<(), SceneError> {
        let parent_node = self.get(parent)?;
        if !parent_node.kind.accepts_children() {
            return Err(SceneError::InvalidState(format!(
                "{} is a {} and cannot have children",
                parent,
                parent_node.kind.label()
            )));
        }
        if let Some(index) = index {
            if index > parent_node.children.len() {
                return Err(SceneError::InvalidState(format!(
                    "index {} out of range for {} ({} children)",
                    index,
                    parent,
                    parent_node.children.len()
                )));
            }
        }
        for (key, node) in &subtree.nodes {
            if node.state != NodeState::Detached {
                return Err(SceneError::InvalidState(format!("{} is not detached", key)));
            }
            if self.nodes.contains_key(key) {
                return Err(SceneError::InvalidState(format!(
                    "{} is already attached; detach it first",
                    key
                )));
            }
        }
        Ok(())
    }

    /// Insert `subtree` under `parent` at `index` (default: last). Returns the
    /// attached keys in pre-order.
    pub fn attach(
        &mut self,
        parent: &NodeKey,
        subtree: Subtree,
        index: Option<usize>,
    ) -> Result<Vec<NodeKey>, SceneError> {
        self.check_attach(parent, &subtree, index)?;
        let keys = subtree.keys();
        let child = subtree.root.clone();
        self.adopt(subtree);
        self.parents.insert(child.clone(), parent.clone());
        let parent_node = self.get_mut(parent)?;
        let at = index.unwrap_or(parent_node.children.len());
        parent_node.children.insert(at, child.clone());
        debug!(parent = %parent, child = %child, nodes = keys.len(), "Attached subtree");
        Ok(keys)
    }

    pub fn check_detach(&self, parent: &NodeKey, child: &NodeKey) -> Result<(), SceneError> {
        let parent_node = self.get(parent)?;
        if !parent_node.children.contains(child) {
            return Err(SceneError::NotFound(child.clone()));
        }
        Ok(())
    }

    /// Remove `child` and its descendants from under `parent`.
    pub fn detach(&mut self, parent: &NodeKey, child: &NodeKey) -> Result<Subtree, SceneError> {
        self.check_detach(parent, child)?;
        let keys = self.descendants(child);
        let mut nodes = HashMap::with_capacity(keys.len());
        for key in &keys {
            self.parents.remove(key);
            if let Some(mut node) = self.nodes.remove(key) {
                node.state = NodeState::Detached;
                nodes.insert(key.clone(), node);
            }
        }
        self.get_mut(parent)?.children.retain(|k| k != child);
        debug!(parent = %parent, child = %child, nodes = keys.len(), "Detached subtree");
        Ok(Subtree {
            root: child.clone(),
            nodes,
        })
    }

    pub fn check_move(
        &self,
        key: &NodeKey,
        new_parent: &NodeKey,
        index: Option<usize>,
    ) -> Result<(), SceneError> {
        self.get(key)?;
        let target = self.get(new_parent)?;
        let Some(old_parent) = self.parents.get(key) else {
            return Err(SceneError::InvalidState(format!(
                "{} is the scene root and cannot be moved",
                key
            )));
        };
        if key == new_parent || self.is_ancestor_of(key, new_parent) {
            return Err(SceneError::InvalidState(format!(
                "moving {} under {} would create a cycle",
                key, new_parent
            )));
        }
        if !target.kind.accepts_children() {
            return Err(SceneError::InvalidState(format!(
                "{} is a {} and cannot have children",
                new_parent,
                target.kind.label()
            )));
        }
        let remaining = if old_parent == new_parent {
            target.children.len() - 1
        } else {
            target.children.len()
        };
        if let Some(index) = index {
            if index > remaining {
                return Err(SceneError::InvalidState(format!(
                    "index {} out of range for {} ({} children)",
                    index, new_parent, remaining
                )));
            }
        }
        Ok(())
    }

    /// Re-parent `key` (with its subtree) under `new_parent`. Returns the old parent.
    pub fn move_node(
        &mut self,
        key: &NodeKey,
        new_parent: &NodeKey,
        index: Option<usize>,
    ) -> Result<NodeKey, SceneError> {
        self.check_move(key, new_parent, index)?;
        let old_parent = self
            .parents
            .insert(key.clone(), new_parent.clone())
            .ok_or_else(|| SceneError::InvalidState(format!("{} has no parent", key)))?;
        self.get_mut(&old_parent)?.children.retain(|k| k != key);
        let target = self.get_mut(new_parent)?;
        let at = index.unwrap_or(target.children.len());
        target.children.insert(at, key.clone());
        debug!(node = %key, from = %old_parent, to = %new_parent, "Moved node");
        Ok(old_parent)
    }

    /// Returns false when the slot already held exactly this value.
    pub fn set_local_slot(&mut self, key: &NodeKey, slot: ContextSlot) -> Result<bool, SceneError> {
        slot.validate()?;
        Ok(self.get_mut(key)?.slots.set(slot))
    }

    /// Returns false when the slot was not locally defined.
    pub fn clear_local_slot(&mut self, key: &NodeKey, kind: SlotKind) -> Result<bool, SceneError> {
        Ok(self.get_mut(key)?.slots.clear(kind))
    }

    pub fn set_layout(&mut self, key: &NodeKey, layout: LayoutMeta) -> Result<bool, SceneError> {
        let node = self.get_mut(key)?;
        if node.layout == layout {
            return Ok(false);
        }
        node.layout = layout;
        Ok(true)
    }

    pub fn set_collapsed(&mut self, key: &NodeKey, collapsed: bool) -> Result<bool, SceneError> {
        let node = self.get_mut(key)?;
        if node.collapsed == collapsed {
            return Ok(false);
        }
        node.collapsed = collapsed;
        Ok(true)
    }

    pub fn set_title(&mut self, key: &NodeKey, title: Option<String>) -> Result<bool, SceneError> {
        let node = self.get_mut(key)?;
        if node.title == title {
            return Ok(false);
        }
        node.title = title;
        Ok(true)
    }

    /// Children of `parent` as layout items, with `overrides` substituted for
    /// the named children.
    pub(crate) fn layout_items(
        &self,
        parent: &NodeKey,
        columns: u32,
        overrides: &[(&NodeKey, &LayoutMeta)],
    ) -> Result<Vec<LayoutItem>, SceneError> {
        let parent_node = self.get(parent)?;
        parent_node
            .children
            .iter()
            .map(|key| {
                let mut item = layout_item(self.get(key)?, columns);
                if let Some((_, meta)) = overrides.iter().find(|(k, _)| *k == key) {
                    item.meta = layout_defaults(self.get(key)?, (*meta).clone(), columns);
                }
                Ok(item)
            })
            .collect()
    }

    fn adopt(&mut self, subtree: Subtree) {
        for (key, mut node) in subtree.nodes {
            node.state = NodeState::Attached;
            for child in &node.children {
                self.parents.insert(child.clone(), key.clone());
            }
            self.nodes.insert(key, node);
        }
    }
}

/// A node as its parent's layout sees it.
pub(crate) fn layout_item(node: &SceneNode, columns: u32) -> LayoutItem {
    LayoutItem {
        key: node.key.clone(),
        meta: layout_defaults(node, node.layout.clone(), columns),
    }
}

/// Rows with no explicit size span the grid and are one unit tall.
fn layout_defaults(node: &SceneNode, mut meta: LayoutMeta, columns: u32) -> LayoutMeta {
    if matches!(node.kind, NodeKind::GridRow) {
        meta.width.get_or_insert(columns);
        meta.height.get_or_insert(1);
    }
    meta
}
