//! Scene Graph
//!
//! Owns one scene tree together with its binding resolver and grid layout,
//! and is the only way to change either. Each [`Mutation`] is validated in
//! full (structure, slot values, prospective layout of every container it
//! touches) before anything is committed; a rejected mutation changes
//! nothing, not even the revision counter.

use crate::binding::{
    deliver_all, BindingCallback, DataBindingResolver, PendingNotification, ResolverStats,
    SubscriptionId,
};
use crate::error::SceneError;
use crate::layout::{GridConstraints, GridLayout, LayoutMeta, Placement};
use crate::slot::{ContextSlot, ResolvedBinding, RootDefaults};
use crate::snapshot::SceneSnapshot;
use crate::tree::arena::layout_item;
use crate::tree::{SceneTree, Subtree};
use crate::types::{NodeKey, SlotKind};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// A structural or context edit.
#[derive(Debug, Clone)]
pub enum Mutation {
    AddChild {
        parent: NodeKey,
        subtree: Subtree,
        index: Option<usize>,
    },
    RemoveChild {
        parent: NodeKey,
        child: NodeKey,
    },
    Move {
        node: NodeKey,
        new_parent: NodeKey,
        index: Option<usize>,
    },
    SetSlot {
        node: NodeKey,
        slot: ContextSlot,
    },
    ClearSlot {
        node: NodeKey,
        kind: SlotKind,
    },
    /// Drag and/or resize. Position changes need `is_draggable`, size changes
    /// need `is_resizable` on the node's current layout.
    SetLayout {
        node: NodeKey,
        layout: LayoutMeta,
    },
    SetCollapsed {
        node: NodeKey,
        collapsed: bool,
    },
    SetTitle {
        node: NodeKey,
        title: Option<String>,
    },
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddChild { .. } => "add_child",
            Mutation::RemoveChild { .. } => "remove_child",
            Mutation::Move { .. } => "move",
            Mutation::SetSlot { .. } => "set_slot",
            Mutation::ClearSlot { .. } => "clear_slot",
            Mutation::SetLayout { .. } => "set_layout",
            Mutation::SetCollapsed { .. } => "set_collapsed",
            Mutation::SetTitle { .. } => "set_title",
        }
    }
}

/// Result of a committed mutation.
#[derive(Debug)]
pub enum MutationOutcome {
    /// The subtree was attached; keys in pre-order.
    Attached(Vec<NodeKey>),
    /// The child was removed and is handed back detached.
    Detached(Subtree),
    Applied,
    /// The mutation was valid but changed nothing (e.g. setting a slot to
    /// its current value).
    Unchanged,
}

#[derive(Debug)]
pub struct SceneGraph {
    tree: SceneTree,
    defaults: RootDefaults,
    resolver: DataBindingResolver,
    layout: GridLayout,
    revision: u64,
    snapshot: Option<Arc<SceneSnapshot>>,
    hold_notifications: bool,
    held: Vec<PendingNotification>,
}

impl SceneGraph {
    /// Adopt `root` as the scene. Every container's layout must already be valid.
    pub fn new(
        root: Subtree,
        defaults: RootDefaults,
        constraints: GridConstraints,
    ) -> Result<Self, SceneError> {
        let graph = Self {
            tree: SceneTree::from_subtree(root),
            defaults,
            resolver: DataBindingResolver::new(),
            layout: GridLayout::new(constraints),
            revision: 0,
            snapshot: None,
            hold_notifications: false,
            held: Vec::new(),
        };
        graph.validate_layout()?;
        Ok(graph)
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    pub fn defaults(&self) -> &RootDefaults {
        &self.defaults
    }

    pub fn constraints(&self) -> &GridConstraints {
        self.layout.constraints()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn resolver_stats(&self) -> ResolverStats {
        self.resolver.stats()
    }

    /// Apply one mutation atomically, then run the callbacks of subscribers
    /// whose binding changed.
    pub fn mutate(&mut self, op: Mutation) -> Result<MutationOutcome, SceneError> {
        let (outcome, pending) = self.apply(op)?;
        if self.hold_notifications {
            self.held.extend(pending);
        } else {
            deliver_all(pending);
        }
        Ok(outcome)
    }

    /// Apply one mutation atomically and return the subscriber changes it
    /// produced instead of delivering them.
    #[instrument(skip(self, op), fields(op = op.name(), revision = self.revision))]
    pub fn apply(
        &mut self,
        op: Mutation,
    ) -> Result<(MutationOutcome, Vec<PendingNotification>), SceneError> {
        if let Err(e) = self.check(&op) {
            warn!(error = %e, "Rejected mutation");
            return Err(e);
        }
        let outcome = self.commit(op)?;
        if !matches!(outcome, MutationOutcome::Unchanged) {
            self.revision += 1;
            self.snapshot = None;
        }
        let mut pending = self.resolver.take_pending();
        for notification in &mut pending {
            notification.change.revision = self.revision;
        }
        debug!(revision = self.revision, notifications = pending.len(), "Mutation applied");
        Ok((outcome, pending))
    }

    /// Effective value of `kind` at `node`.
    pub fn resolve(&mut self, node: &NodeKey, kind: SlotKind) -> Result<ResolvedBinding, SceneError> {
        self.resolver.resolve(&self.tree, &self.defaults, node, kind)
    }

    pub fn subscribe(
        &mut self,
        node: &NodeKey,
        kind: SlotKind,
        callback: BindingCallback,
    ) -> Result<SubscriptionId, SceneError> {
        self.resolver
            .subscribe(&self.tree, &self.defaults, node, kind, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.resolver.unsubscribe(id)
    }

    /// Active placements of `container`'s children. Empty when collapsed.
    pub fn arrange(&self, container: &NodeKey) -> Result<Vec<Placement>, SceneError> {
        let node = self.tree.get(container)?;
        let items = self
            .tree
            .layout_items(container, self.constraints().columns, &[])?;
        self.layout.arrange(node.is_collapsed(), &items)
    }

    /// Validate the layout of every container in the tree.
    pub fn validate_layout(&self) -> Result<(), SceneError> {
        for key in self.tree.descendants(self.tree.root()) {
            let node = self.tree.get(&key)?;
            if !node.children().is_empty() {
                self.arrange(&key)?;
            }
        }
        Ok(())
    }

    /// Immutable view for renderers, rebuilt only after the revision changes.
    pub fn snapshot(&mut self) -> Arc<SceneSnapshot> {
        if let Some(snapshot) = &self.snapshot {
            return Arc::clone(snapshot);
        }
        let snapshot = Arc::new(SceneSnapshot::capture(self));
        self.snapshot = Some(Arc::clone(&snapshot));
        snapshot
    }

    pub(crate) fn resolve_all(&mut self, node: &NodeKey) -> Vec<Result<ResolvedBinding, SceneError>> {
        SlotKind::ALL
            .iter()
            .map(|kind| self.resolve(node, *kind))
            .collect()
    }

    fn check(&self, op: &Mutation) -> Result<(), SceneError> {
        let columns = self.constraints().columns;
        match op {
            Mutation::AddChild {
                parent,
                subtree,
                index,
            } => {
                self.tree.check_attach(parent, subtree, *index)?;
                // The incoming subtree's own containers.
                for node in subtree.nodes.values() {
                    if node.children().is_empty() {
                        continue;
                    }
                    let items = node
                        .children()
                        .iter()
                        .map(|key| {
                            subtree
                                .node(key)
                                .map(|child| layout_item(child, columns))
                                .ok_or_else(|| SceneError::NotFound(key.clone()))
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    self.layout.arrange(node.is_collapsed(), &items)?;
                }
                // The parent with the new child in place.
                let root = subtree
                    .node(subtree.root())
                    .ok_or_else(|| SceneError::NotFound(subtree.root().clone()))?;
                let mut items = self.tree.layout_items(parent, columns, &[])?;
                let at = index.unwrap_or(items.len());
                items.insert(at, layout_item(root, columns));
                let collapsed = self.tree.get(parent)?.is_collapsed();
                self.layout.arrange(collapsed, &items)?;
                Ok(())
            }
            Mutation::RemoveChild { parent, child } => self.tree.check_detach(parent, child),
            Mutation::Move {
                node,
                new_parent,
                index,
            } => {
                self.tree.check_move(node, new_parent, *index)?;
                let moved = layout_item(self.tree.get(node)?, columns);
                let mut items = self.tree.layout_items(new_parent, columns, &[])?;
                items.retain(|item| &item.key != node);
                let at = index.unwrap_or(items.len());
                items.insert(at, moved);
                let collapsed = self.tree.get(new_parent)?.is_collapsed();
                self.layout.arrange(collapsed, &items)?;
                Ok(())
            }
            Mutation::SetSlot { node, slot } => {
                self.tree.get(node)?;
                slot.validate()
            }
            Mutation::ClearSlot { node, .. } | Mutation::SetTitle { node, .. } => {
                self.tree.get(node).map(|_| ())
            }
            Mutation::SetLayout { node, layout } => {
                let current = self.tree.get(node)?.layout();
                if layout.moves_relative_to(current) && !current.is_draggable {
                    return Err(SceneError::InvalidState(format!("{} is not draggable", node)));
                }
                if layout.resizes_relative_to(current) && !current.is_resizable {
                    return Err(SceneError::InvalidState(format!("{} is not resizable", node)));
                }
                let Some(parent) = self.tree.parent(node) else {
                    return Ok(());
                };
                let items = self.tree.layout_items(parent, columns, &[(node, layout)])?;
                let collapsed = self.tree.get(parent)?.is_collapsed();
                self.layout.arrange(collapsed, &items)?;
                Ok(())
            }
            Mutation::SetCollapsed { node, collapsed } => {
                let target = self.tree.get(node)?;
                if !target.kind().accepts_children() {
                    return Err(SceneError::InvalidState(format!(
                        "{} is a {} and cannot be collapsed",
                        node,
                        target.kind().label()
                    )));
                }
                if !*collapsed {
                    let items = self.tree.layout_items(node, columns, &[])?;
                    self.layout.arrange(false, &items)?;
                }
                Ok(())
            }
        }
    }

    fn commit(&mut self, op: Mutation) -> Result<MutationOutcome, SceneError> {
        match op {
            Mutation::AddChild {
                parent,
                subtree,
                index,
            } => {
                let root = subtree.root().clone();
                let keys = self.tree.attach(&parent, subtree, index)?;
                self.resolver.on_attach(&self.tree, &self.defaults, &root);
                Ok(MutationOutcome::Attached(keys))
            }
            Mutation::RemoveChild { parent, child } => {
                let detached = self.tree.detach(&parent, &child)?;
                self.resolver.orphan(&detached.keys());
                Ok(MutationOutcome::Detached(detached))
            }
            Mutation::Move {
                node,
                new_parent,
                index,
            } => {
                self.tree.move_node(&node, &new_parent, index)?;
                self.resolver.on_attach(&self.tree, &self.defaults, &node);
                Ok(MutationOutcome::Applied)
            }
            Mutation::SetSlot { node, slot } => {
                let kind = slot.kind;
                if !self.tree.set_local_slot(&node, slot)? {
                    return Ok(MutationOutcome::Unchanged);
                }
                self.resolver
                    .on_mutate(&self.tree, &self.defaults, &node, kind);
                Ok(MutationOutcome::Applied)
            }
            Mutation::ClearSlot { node, kind } => {
                if !self.tree.clear_local_slot(&node, kind)? {
                    return Ok(MutationOutcome::Unchanged);
                }
                self.resolver
                    .on_mutate(&self.tree, &self.defaults, &node, kind);
                Ok(MutationOutcome::Applied)
            }
            Mutation::SetLayout { node, layout } => Ok(changed(self.tree.set_layout(&node, layout)?)),
            Mutation::SetCollapsed { node, collapsed } => {
                Ok(changed(self.tree.set_collapsed(&node, collapsed)?))
            }
            Mutation::SetTitle { node, title } => Ok(changed(self.tree.set_title(&node, title)?)),
        }
    }
}

fn changed(did_change: bool) -> MutationOutcome {
    if did_change {
        MutationOutcome::Applied
    } else {
        MutationOutcome::Unchanged
    }
}

/// A scene graph shared between threads. Mutations from different threads
/// are serialized by the lock and applied in acquisition order.
///
/// Subscriber callbacks run after the lock is released, so a callback may
/// read or mutate the graph through another handle. Callbacks for mutations
/// on different threads may interleave; [`BindingChange::revision`] orders
/// them.
///
/// [`BindingChange::revision`]: crate::binding::BindingChange::revision
#[derive(Clone)]
pub struct SharedSceneGraph {
    inner: Arc<Mutex<SceneGraph>>,
}

impl SharedSceneGraph {
    pub fn new(graph: SceneGraph) -> Self {
        Self {
            inner: Arc::new(Mutex::new(graph)),
        }
    }

    pub fn mutate(&self, op: Mutation) -> Result<MutationOutcome, SceneError> {
        let (outcome, pending) = self.inner.lock().apply(op)?;
        deliver_all(pending);
        Ok(outcome)
    }

    pub fn resolve(&self, node: &NodeKey, kind: SlotKind) -> Result<ResolvedBinding, SceneError> {
        self.inner.lock().resolve(node, kind)
    }

    pub fn snapshot(&self) -> Arc<SceneSnapshot> {
        self.inner.lock().snapshot()
    }

    pub fn revision(&self) -> u64 {
        self.inner.lock().revision()
    }

    pub fn subscribe(
        &self,
        node: &NodeKey,
        kind: SlotKind,
        callback: BindingCallback,
    ) -> Result<SubscriptionId, SceneError> {
        self.inner.lock().subscribe(node, kind, callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.lock().unsubscribe(id)
    }

    /// Run `f` with exclusive access, e.g. to apply a batch. Notifications
    /// from mutations inside `f` are delivered once `f` returns and the lock
    /// is released.
    pub fn with<R>(&self, f: impl FnOnce(&mut SceneGraph) -> R) -> R {
        let (result, held) = {
            let mut graph = self.inner.lock();
            graph.hold_notifications = true;
            let result = f(&mut graph);
            graph.hold_notifications = false;
            (result, std::mem::take(&mut graph.held))
        };
        deliver_all(held);
        result
    }
}
