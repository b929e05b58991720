//! Read-only scene snapshots
//!
//! A snapshot is what renderers consume: every node in pre-order with its
//! active placement and resolved bindings, frozen at one revision. Nothing
//! in it points back into the live graph.

use crate::graph::SceneGraph;
use crate::layout::{LayoutMeta, Placement};
use crate::slot::ResolvedBinding;
use crate::tree::{walker, NodeKind};
use crate::types::{NodeKey, SlotKind, SlotValue};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// One node as seen by a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub title: Option<String>,
    pub parent: Option<NodeKey>,
    pub depth: usize,
    pub children: Vec<NodeKey>,
    pub local_slots: BTreeMap<SlotKind, Option<SlotValue>>,
    pub layout: LayoutMeta,
    pub collapsed: bool,
    /// Cell in the parent's active layout; `None` for the root and for nodes
    /// under a collapsed container.
    pub placement: Option<Placement>,
    /// True when any ancestor is collapsed.
    pub hidden: bool,
    /// `None` for kinds that do not resolve at this node.
    pub bindings: BTreeMap<SlotKind, Option<ResolvedBinding>>,
}

impl NodeView {
    pub fn binding(&self, kind: SlotKind) -> Option<&ResolvedBinding> {
        self.bindings.get(&kind).and_then(Option::as_ref)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    pub revision: u64,
    pub root: NodeKey,
    nodes: Vec<NodeView>,
    #[serde(skip)]
    index: HashMap<NodeKey, usize>,
}

impl SceneSnapshot {
    pub(crate) fn capture(graph: &mut SceneGraph) -> Self {
        let root = graph.tree().root().clone();
        let order = walker::walk_from(graph.tree(), &root, |_| true);

        let mut placements: HashMap<NodeKey, Placement> = HashMap::new();
        for (key, _) in &order {
            let has_children = graph
                .tree()
                .node(key)
                .map(|n| !n.children().is_empty())
                .unwrap_or(false);
            if !has_children {
                continue;
            }
            if let Ok(active) = graph.arrange(key) {
                placements.extend(active.into_iter().map(|p| (p.key.clone(), p)));
            }
        }

        let mut nodes = Vec::with_capacity(order.len());
        for (key, depth) in order {
            let tree = graph.tree();
            let Some(node) = tree.node(&key) else {
                continue;
            };
            let hidden = tree
                .ancestors(&key)
                .any(|a| tree.node(a).map(|n| n.is_collapsed()).unwrap_or(false));
            let mut view = NodeView {
                key: key.clone(),
                kind: node.kind().clone(),
                title: node.title().map(str::to_string),
                parent: tree.parent(&key).cloned(),
                depth,
                children: node.children().to_vec(),
                local_slots: node
                    .local_slots()
                    .iter()
                    .map(|(kind, value)| (kind, value.cloned()))
                    .collect(),
                layout: node.layout().clone(),
                collapsed: node.is_collapsed(),
                placement: placements.remove(&key),
                hidden,
                bindings: BTreeMap::new(),
            };
            let resolved = graph.resolve_all(&key);
            view.bindings = SlotKind::ALL
                .iter()
                .copied()
                .zip(resolved.into_iter().map(Result::ok))
                .collect();
            nodes.push(view);
        }

        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, view)| (view.key.clone(), i))
            .collect();
        Self {
            revision: graph.revision(),
            root,
            nodes,
            index,
        }
    }

    /// All nodes, pre-order.
    pub fn nodes(&self) -> &[NodeView] {
        &self.nodes
    }

    pub fn node(&self, key: &NodeKey) -> Option<&NodeView> {
        self.index.get(key).map(|i| &self.nodes[*i])
    }

    /// Nodes a renderer should draw: everything not under a collapsed container.
    pub fn visible(&self) -> impl Iterator<Item = &NodeView> {
        self.nodes.iter().filter(|view| !view.hidden)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
