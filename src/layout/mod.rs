//! Grid Layout
//!
//! Assigns grid cells to sibling nodes and enforces that non-floating siblings
//! never overlap. Layout is independent of context resolution: it only reads
//! each child's [`LayoutMeta`].

pub mod grid;

pub use grid::GridLayout;

use crate::types::NodeKey;
use serde::{Deserialize, Serialize};

/// Position and size hints a node carries for its parent's layout.
///
/// Missing `x`/`y` means "auto place"; missing `width`/`height` fall back to the
/// grid defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default)]
    pub is_resizable: bool,
    #[serde(default)]
    pub is_draggable: bool,
    #[serde(default)]
    pub is_floating: bool,
}

impl LayoutMeta {
    pub fn at(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn auto(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn interactive(mut self) -> Self {
        self.is_resizable = true;
        self.is_draggable = true;
        self
    }

    pub fn floating(mut self) -> Self {
        self.is_floating = true;
        self
    }

    pub fn is_explicit(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }

    pub fn moves_relative_to(&self, other: &LayoutMeta) -> bool {
        self.x != other.x || self.y != other.y
    }

    pub fn resizes_relative_to(&self, other: &LayoutMeta) -> bool {
        self.width != other.width || self.height != other.height
    }
}

/// Grid-wide sizing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConstraints {
    pub columns: u32,
    pub default_width: u32,
    pub default_height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for GridConstraints {
    fn default() -> Self {
        Self {
            columns: 24,
            default_width: 12,
            default_height: 8,
            min_width: 1,
            min_height: 1,
        }
    }
}

/// One child as the layout sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutItem {
    pub key: NodeKey,
    pub meta: LayoutMeta,
}

impl LayoutItem {
    pub fn new(key: impl Into<NodeKey>, meta: LayoutMeta) -> Self {
        Self {
            key: key.into(),
            meta,
        }
    }
}

/// A concrete cell assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub key: NodeKey,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub is_floating: bool,
}

impl Placement {
    /// Edges are compared in `u64` so cells at the far end of the `u32`
    /// range cannot overflow.
    pub fn intersects(&self, other: &Placement) -> bool {
        !(self.right() <= u64::from(other.x)
            || other.right() <= u64::from(self.x)
            || self.bottom() <= u64::from(other.y)
            || other.bottom() <= u64::from(self.y))
    }

    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }
}
