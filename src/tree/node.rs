//! Scene node types

use crate::layout::LayoutMeta;
use crate::slot::LocalSlots;
use crate::types::NodeKey;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// What a node represents in the visual composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    /// Top of a composition. `standalone` scenes own their page; embedded ones
    /// live inside a host view.
    Scene {
        #[serde(default)]
        standalone: bool,
    },
    /// Container that arranges its children on a grid.
    GridLayout,
    /// Titled, collapsible group of panels inside a grid.
    GridRow,
    /// A single visualization. Leaf only.
    #[serde(rename_all = "camelCase")]
    VizPanel { plugin_id: String },
}

impl NodeKind {
    pub fn accepts_children(&self) -> bool {
        !matches!(self, NodeKind::VizPanel { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Scene { .. } => "scene",
            NodeKind::GridLayout => "grid",
            NodeKind::GridRow => "row",
            NodeKind::VizPanel { .. } => "panel",
        }
    }
}

/// Lifecycle of a node. Nodes start detached, become attached when inserted
/// into a tree and return to detached when removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Detached,
    Attached,
}

/// One node of a scene tree.
///
/// Children are stored as keys; the owning tree (or detached subtree) holds
/// the nodes themselves, so a node is owned by exactly one parent.
///
/// Every node also carries a process-unique instance number that survives
/// detach and reattach. Equality ignores it.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub(crate) instance: u64,
    pub(crate) key: NodeKey,
    pub(crate) kind: NodeKind,
    pub(crate) title: Option<String>,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) slots: LocalSlots,
    pub(crate) layout: LayoutMeta,
    pub(crate) collapsed: bool,
    pub(crate) state: NodeState,
}

impl SceneNode {
    pub fn new(key: impl Into<NodeKey>, kind: NodeKind) -> Self {
        Self {
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            key: key.into(),
            kind,
            title: None,
            children: Vec::new(),
            slots: LocalSlots::new(),
            layout: LayoutMeta::default(),
            collapsed: false,
            state: NodeState::Detached,
        }
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn instance(&self) -> u64 {
        self.instance
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub fn local_slots(&self) -> &LocalSlots {
        &self.slots
    }

    pub fn layout(&self) -> &LayoutMeta {
        &self.layout
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn state(&self) -> NodeState {
        self.state
    }
}

impl PartialEq for SceneNode {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.kind == other.kind
            && self.title == other.title
            && self.children == other.children
            && self.slots == other.slots
            && self.layout == other.layout
            && self.collapsed == other.collapsed
            && self.state == other.state
    }
}
