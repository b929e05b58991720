//! Data Binding Resolver
//!
//! Caches resolved slot bindings per (node, kind), invalidates them when the
//! tree or a local slot changes, and notifies subscribers once per distinct
//! resolved value.
//!
//! Invalidation walks down from the mutated node and stops at any descendant
//! that defines the slot itself: everything below such an override resolves
//! through it and cannot observe the change. Entries are only recomputed when
//! read, except for the mutated node itself and for subscribed pairs.
//!
//! Callbacks are never run here. Changes are queued as
//! [`PendingNotification`]s and handed out by [`DataBindingResolver::take_pending`].

pub mod subscription;

pub use subscription::{
    deliver_all, BindingCallback, BindingChange, PendingNotification, SubscriptionId,
};

use crate::error::SceneError;
use crate::slot::{ResolvedBinding, RootDefaults};
use crate::tree::{walker, SceneTree};
use crate::types::{NodeKey, SlotKind};
use std::collections::HashMap;
use subscription::{Observed, Subscription};
use tracing::{debug, trace};

/// Counters for cache behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    pub notifications: u64,
}

#[derive(Debug, Default)]
pub struct DataBindingResolver {
    cache: HashMap<(NodeKey, SlotKind), ResolvedBinding>,
    subscriptions: HashMap<(NodeKey, SlotKind), Vec<Subscription>>,
    subscribers: HashMap<SubscriptionId, (NodeKey, SlotKind)>,
    pending: Vec<PendingNotification>,
    next_id: u64,
    stats: ResolverStats,
}

impl DataBindingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ResolverStats {
        self.stats
    }

    /// Cached binding, without resolving.
    pub fn cached(&self, node: &NodeKey, kind: SlotKind) -> Option<&ResolvedBinding> {
        self.cache.get(&(node.clone(), kind))
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Resolve through the cache. Errors are returned to the caller and never cached.
    pub fn resolve(
        &mut self,
        tree: &SceneTree,
        defaults: &RootDefaults,
        node: &NodeKey,
        kind: SlotKind,
    ) -> Result<ResolvedBinding, SceneError> {
        let cache_key = (node.clone(), kind);
        if let Some(binding) = self.cache.get(&cache_key) {
            self.stats.hits += 1;
            trace!(node = %node, kind = %kind, "Binding cache hit");
            return Ok(binding.clone());
        }
        self.stats.misses += 1;
        let binding = tree.resolve_slot(node, kind, defaults)?;
        self.cache.insert(cache_key, binding.clone());
        Ok(binding)
    }

    /// `node`'s local `kind` changed, or the structure at or above it did.
    ///
    /// Drops cached entries for `node` and the descendants that inherit
    /// `kind` through it, re-resolves `node`, then notifies subscribers whose
    /// value changed.
    pub fn on_mutate(
        &mut self,
        tree: &SceneTree,
        defaults: &RootDefaults,
        node: &NodeKey,
        kind: SlotKind,
    ) {
        let affected = self.invalidate(tree, node, kind);
        // The mutated node may legitimately be unresolved now.
        let _ = self.resolve(tree, defaults, node, kind);
        self.notify(tree, defaults, &affected, kind);
    }

    /// A subtree rooted at `node` was attached or moved. Every kind is
    /// invalidated below it but nothing is resolved until read, apart from
    /// subscribed pairs that need a fresh value to compare against.
    pub fn on_attach(&mut self, tree: &SceneTree, defaults: &RootDefaults, node: &NodeKey) {
        for kind in SlotKind::ALL {
            let affected = self.invalidate(tree, node, kind);
            self.notify(tree, defaults, &affected, kind);
        }
    }

    /// Nodes left the tree. Their cache entries are dropped; subscriptions
    /// stay registered but are silent until the nodes are attached again.
    pub fn orphan(&mut self, keys: &[NodeKey]) {
        for key in keys {
            for kind in SlotKind::ALL {
                if self.cache.remove(&(key.clone(), kind)).is_some() {
                    self.stats.invalidations += 1;
                }
            }
        }
        debug!(nodes = keys.len(), "Orphaned cached bindings");
    }

    /// Register `callback` for changes of `kind` at `node`. The current value
    /// becomes the baseline and is not delivered.
    ///
    /// The subscription belongs to this node instance. It survives a detach
    /// and reattach of the same node but is dropped once another node with
    /// the same key shows up in its place.
    pub fn subscribe(
        &mut self,
        tree: &SceneTree,
        defaults: &RootDefaults,
        node: &NodeKey,
        kind: SlotKind,
        callback: BindingCallback,
    ) -> Result<SubscriptionId, SceneError> {
        let instance = tree.get(node)?.instance();
        let baseline = self.resolve(tree, defaults, node, kind).ok();
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions
            .entry((node.clone(), kind))
            .or_default()
            .push(Subscription::new(
                id,
                instance,
                Observed::of(baseline.as_ref()),
                callback,
            ));
        self.subscribers.insert(id, (node.clone(), kind));
        debug!(subscription = %id, node = %node, kind = %kind, "Subscribed");
        Ok(id)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(target) = self.subscribers.remove(&id) else {
            return false;
        };
        if let Some(list) = self.subscriptions.get_mut(&target) {
            list.retain(|s| s.id != id);
            if list.is_empty() {
                self.subscriptions.remove(&target);
            }
        }
        true
    }

    pub fn subscription_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Queued changes, oldest first. The queue is left empty.
    pub fn take_pending(&mut self) -> Vec<PendingNotification> {
        std::mem::take(&mut self.pending)
    }

    /// Remove cache entries from `node` down to (not including) overrides.
    fn invalidate(&mut self, tree: &SceneTree, node: &NodeKey, kind: SlotKind) -> Vec<NodeKey> {
        let affected: Vec<NodeKey> = walker::walk_from(tree, node, |child| {
            tree.node(child)
                .map(|n| !n.local_slots().defines(kind))
                .unwrap_or(false)
        })
        .into_iter()
        .map(|(key, _)| key)
        .collect();

        for key in &affected {
            if self.cache.remove(&(key.clone(), kind)).is_some() {
                self.stats.invalidations += 1;
            }
        }
        debug!(node = %node, kind = %kind, affected = affected.len(), "Invalidated bindings");
        affected
    }

    fn notify(
        &mut self,
        tree: &SceneTree,
        defaults: &RootDefaults,
        affected: &[NodeKey],
        kind: SlotKind,
    ) {
        for key in affected {
            let target = (key.clone(), kind);
            if !self.subscriptions.contains_key(&target) {
                continue;
            }
            let Some(instance) = tree.node(key).map(|n| n.instance()) else {
                continue;
            };
            self.drop_stale(&target, instance);
            if !self.subscriptions.contains_key(&target) {
                continue;
            }
            let binding = self.resolve(tree, defaults, key, kind).ok();
            let observed = Observed::of(binding.as_ref());
            let Some(list) = self.subscriptions.get_mut(&target) else {
                continue;
            };
            let change = BindingChange {
                node: key.clone(),
                kind,
                binding,
                revision: 0,
            };
            for subscription in list.iter_mut() {
                if subscription.last == observed {
                    continue;
                }
                subscription.last = observed.clone();
                self.pending.push(subscription.pending(change.clone()));
                self.stats.notifications += 1;
                trace!(subscription = %subscription.id, node = %key, kind = %kind, "Queued notification");
            }
        }
    }

    /// Forget subscriptions made on an earlier node that had this key.
    fn drop_stale(&mut self, target: &(NodeKey, SlotKind), instance: u64) {
        let Some(list) = self.subscriptions.get_mut(target) else {
            return;
        };
        let (live, stale): (Vec<_>, Vec<_>) =
            list.drain(..).partition(|s| s.instance == instance);
        *list = live;
        if list.is_empty() {
            self.subscriptions.remove(target);
        }
        for subscription in stale {
            self.subscribers.remove(&subscription.id);
            debug!(subscription = %subscription.id, node = %target.0, "Dropped subscription of a removed node");
        }
    }
}
