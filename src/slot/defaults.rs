//! System defaults consulted when no node on the path to the root defines a slot.

use crate::types::{SlotKind, SlotValue};
use std::collections::BTreeMap;

/// Per-kind fallback values for the root of a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootDefaults {
    values: BTreeMap<SlotKind, SlotValue>,
}

impl RootDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, value: SlotValue) -> Self {
        self.values.insert(value.kind(), value);
        self
    }

    pub fn set(&mut self, value: SlotValue) {
        self.values.insert(value.kind(), value);
    }

    pub fn get(&self, kind: SlotKind) -> Option<&SlotValue> {
        self.values.get(&kind)
    }
}
