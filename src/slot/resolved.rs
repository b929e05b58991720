//! Resolved bindings: derived, cacheable results of slot resolution.

use crate::types::{NodeKey, SlotKind, SlotValue};
use serde::Serialize;

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "source")]
pub enum BindingSource {
    /// Defined on the node itself.
    Local,
    /// Defined on an ancestor `depth` levels up.
    Inherited { ancestor: NodeKey, depth: usize },
    /// No node on the path defines it; the system default applies.
    Default,
}

/// "For node N and slot K the effective value is V, coming from S."
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBinding {
    pub node: NodeKey,
    pub kind: SlotKind,
    /// `None` when the defining node holds an explicit empty.
    pub value: Option<SlotValue>,
    pub source: BindingSource,
}

impl ResolvedBinding {
    pub fn describe_source(&self) -> String {
        match &self.source {
            BindingSource::Local => "local".to_string(),
            BindingSource::Inherited { ancestor, depth } => {
                format!("inherited from {} (+{})", ancestor, depth)
            }
            BindingSource::Default => "default".to_string(),
        }
    }
}
