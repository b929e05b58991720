//! Per-(node, slot) change subscriptions.

use crate::slot::ResolvedBinding;
use crate::types::{NodeKey, SlotKind, SlotValue};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Delivered to subscribers when the resolved value of a slot changes.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingChange {
    pub node: NodeKey,
    pub kind: SlotKind,
    /// `None` when the slot no longer resolves at all.
    pub binding: Option<ResolvedBinding>,
    /// Graph revision the change was committed at. Changes from mutations on
    /// different threads can arrive out of order; the higher revision wins.
    pub revision: u64,
}

pub type BindingCallback = Box<dyn FnMut(&BindingChange) + Send>;

type SharedCallback = Arc<Mutex<BindingCallback>>;

/// What a subscriber last saw. Comparison ignores the binding source, so a
/// value that moves from one ancestor to another without changing is silent.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Observed {
    Unresolved,
    Value(Option<SlotValue>),
}

impl Observed {
    pub(crate) fn of(binding: Option<&ResolvedBinding>) -> Self {
        match binding {
            Some(b) => Observed::Value(b.value.clone()),
            None => Observed::Unresolved,
        }
    }
}

pub(crate) struct Subscription {
    pub(crate) id: SubscriptionId,
    /// Instance of the node subscribed to. A different node reusing the key
    /// does not inherit the subscription.
    pub(crate) instance: u64,
    pub(crate) last: Observed,
    pub(crate) callback: SharedCallback,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriptionId,
        instance: u64,
        last: Observed,
        callback: BindingCallback,
    ) -> Self {
        Self {
            id,
            instance,
            last,
            callback: Arc::new(Mutex::new(callback)),
        }
    }

    pub(crate) fn pending(&self, change: BindingChange) -> PendingNotification {
        PendingNotification {
            subscription: self.id,
            callback: Arc::clone(&self.callback),
            change,
        }
    }
}

/// A change queued for one subscriber.
///
/// Queued changes are handed out after the mutation that produced them has
/// committed, so the callback is free to read the graph again. A callback
/// must not synchronously cause a change to its own subscription.
pub struct PendingNotification {
    subscription: SubscriptionId,
    callback: SharedCallback,
    pub(crate) change: BindingChange,
}

impl PendingNotification {
    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    pub fn change(&self) -> &BindingChange {
        &self.change
    }

    /// Invoke the subscriber's callback.
    pub fn deliver(self) {
        let mut guard = self.callback.lock();
        let callback: &mut BindingCallback = &mut guard;
        callback(&self.change);
    }
}

impl fmt::Debug for PendingNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingNotification")
            .field("subscription", &self.subscription)
            .field("change", &self.change)
            .finish_non_exhaustive()
    }
}

/// Deliver queued changes in the order they were produced.
pub fn deliver_all(pending: Vec<PendingNotification>) {
    for notification in pending {
        notification.deliver();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("instance", &self.instance)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}
