//! Context Slots
//!
//! A context slot is a typed value a node either defines locally or inherits
//! from the nearest ancestor that defines it. Root-level gaps fall back to
//! [`RootDefaults`].

pub mod defaults;
pub mod resolved;

pub use defaults::RootDefaults;
pub use resolved::{BindingSource, ResolvedBinding};

use crate::error::SceneError;
use crate::types::{SlotKind, SlotValue};
use std::collections::BTreeMap;

/// A locally defined slot.
///
/// `value: None` is an explicit empty: it stops inheritance just like a
/// concrete value does, and resolves to "nothing" rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSlot {
    pub kind: SlotKind,
    pub value: Option<SlotValue>,
}

impl ContextSlot {
    pub fn new(value: SlotValue) -> Self {
        Self {
            kind: value.kind(),
            value: Some(value),
        }
    }

    pub fn empty(kind: SlotKind) -> Self {
        Self { kind, value: None }
    }

    /// Reject values whose variant disagrees with the slot kind or fail their own checks.
    pub fn validate(&self) -> Result<(), SceneError> {
        let Some(value) = &self.value else {
            return Ok(());
        };
        if value.kind() != self.kind {
            return Err(SceneError::InvalidSlotValue {
                kind: self.kind,
                reason: format!("value of kind {} stored in {} slot", value.kind(), self.kind),
            });
        }
        value.validate().map_err(|reason| SceneError::InvalidSlotValue {
            kind: self.kind,
            reason,
        })
    }
}

/// The locally defined slots of one node, keyed by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalSlots {
    slots: BTreeMap<SlotKind, Option<SlotValue>>,
}

impl LocalSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when the kind is inherited, `Some(None)` when explicitly empty.
    pub fn get(&self, kind: SlotKind) -> Option<&Option<SlotValue>> {
        self.slots.get(&kind)
    }

    pub fn defines(&self, kind: SlotKind) -> bool {
        self.slots.contains_key(&kind)
    }

    /// Store a slot; returns false when the slot already held exactly this value.
    pub fn set(&mut self, slot: ContextSlot) -> bool {
        match self.slots.get(&slot.kind) {
            Some(current) if *current == slot.value => false,
            _ => {
                self.slots.insert(slot.kind, slot.value);
                true
            }
        }
    }

    /// Remove a slot; returns false when it was not defined.
    pub fn clear(&mut self, kind: SlotKind) -> bool {
        self.slots.remove(&kind).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotKind, Option<&SlotValue>)> {
        self.slots.iter().map(|(kind, value)| (*kind, value.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

impl FromIterator<ContextSlot> for LocalSlots {
    fn from_iter<I: IntoIterator<Item = ContextSlot>>(iter: I) -> Self {
        let mut slots = LocalSlots::new();
        for slot in iter {
            slots.set(slot);
        }
        slots
    }
}
