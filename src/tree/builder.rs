//! Incremental builder for detached scene subtrees
//!
//! Every `child` call checks the new child's keys against the keys already in
//! the builder, so duplicate keys surface where they are introduced rather
//! than when the finished tree is attached.

use crate::error::SceneError;
use crate::layout::LayoutMeta;
use crate::slot::ContextSlot;
use crate::tree::node::{NodeKind, NodeState, SceneNode};
use crate::types::{NodeKey, SlotKind, SlotValue};
use std::collections::{BTreeSet, HashMap};

/// A detached tree of nodes, ready to be attached under a parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Subtree {
    pub(crate) root: NodeKey,
    pub(crate) nodes: HashMap<NodeKey, SceneNode>,
}

impl Subtree {
    pub fn root(&self) -> &NodeKey {
        &self.root
    }

    pub fn node(&self, key: &NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Keys in pre-order (parent before children, children in order).
    pub fn keys(&self) -> Vec<NodeKey> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root.clone()];
        while let Some(key) = stack.pop() {
            if let Some(node) = self.nodes.get(&key) {
                stack.extend(node.children.iter().rev().cloned());
            }
            order.push(key);
        }
        order
    }
}

/// Builder for one node and its descendants.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    node: SceneNode,
    children: Vec<NodeBuilder>,
    keys: BTreeSet<NodeKey>,
    slot_errors: Vec<SceneError>,
}

impl NodeBuilder {
    pub fn new(key: impl Into<NodeKey>, kind: NodeKind) -> Self {
        let node = SceneNode::new(key, kind);
        let keys = BTreeSet::from([node.key.clone()]);
        Self {
            node,
            children: Vec::new(),
            keys,
            slot_errors: Vec::new(),
        }
    }

    pub fn scene(key: impl Into<NodeKey>, standalone: bool) -> Self {
        Self::new(key, NodeKind::Scene { standalone })
    }

    pub fn grid(key: impl Into<NodeKey>) -> Self {
        Self::new(key, NodeKind::GridLayout)
    }

    pub fn row(key: impl Into<NodeKey>) -> Self {
        Self::new(key, NodeKind::GridRow)
    }

    pub fn panel(key: impl Into<NodeKey>, plugin_id: impl Into<String>) -> Self {
        Self::new(
            key,
            NodeKind::VizPanel {
                plugin_id: plugin_id.into(),
            },
        )
    }

    pub fn key(&self) -> &NodeKey {
        &self.node.key
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.node.title = Some(title.into());
        self
    }

    pub fn slot(self, value: SlotValue) -> Self {
        self.context_slot(ContextSlot::new(value))
    }

    /// Define `kind` locally as explicitly empty, blocking inheritance.
    pub fn empty_slot(self, kind: SlotKind) -> Self {
        self.context_slot(ContextSlot::empty(kind))
    }

    pub fn context_slot(mut self, slot: ContextSlot) -> Self {
        if let Err(e) = slot.validate() {
            self.slot_errors.push(e);
        }
        self.node.slots.set(slot);
        self
    }

    pub fn layout(mut self, layout: LayoutMeta) -> Self {
        self.node.layout = layout;
        self
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.node.collapsed = collapsed;
        self
    }

    /// Append a child, rejecting leaf parents and keys already in use.
    pub fn child(mut self, child: NodeBuilder) -> Result<Self, SceneError> {
        if !self.node.kind.accepts_children() {
            return Err(SceneError::InvalidState(format!(
                "{} is a {} and cannot have children",
                self.node.key,
                self.node.kind.label()
            )));
        }
        if let Some(dup) = child.keys.intersection(&self.keys).next() {
            return Err(SceneError::DuplicateKey(dup.clone()));
        }
        self.keys.extend(child.keys.iter().cloned());
        self.node.children.push(child.node.key.clone());
        self.children.push(child);
        Ok(self)
    }

    pub fn children<I>(self, children: I) -> Result<Self, SceneError>
    where
        I: IntoIterator<Item = NodeBuilder>,
    {
        children.into_iter().try_fold(self, NodeBuilder::child)
    }

    /// Finish the subtree. Fails on the first invalid slot value.
    pub fn build(self) -> Result<Subtree, SceneError> {
        let root = self.node.key.clone();
        let mut nodes = HashMap::with_capacity(self.keys.len());
        let mut pending = vec![self];
        while let Some(builder) = pending.pop() {
            if let Some(err) = builder.slot_errors.into_iter().next() {
                return Err(err);
            }
            let mut node = builder.node;
            node.state = NodeState::Detached;
            nodes.insert(node.key.clone(), node);
            pending.extend(builder.children);
        }
        Ok(Subtree { root, nodes })
    }
}
