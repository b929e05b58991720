//! Shared fixtures for integration tests

use strata::demo;
use strata::graph::SceneGraph;
use strata::layout::GridConstraints;
use strata::slot::RootDefaults;
use strata::tree::{NodeBuilder, Subtree};
use strata::types::{SlotValue, TimeRange};

pub fn defaults() -> RootDefaults {
    RootDefaults::new().with(SlotValue::TimeRange(TimeRange::last("6h")))
}

pub fn graph_from(subtree: Subtree) -> SceneGraph {
    SceneGraph::new(subtree, defaults(), GridConstraints::default()).unwrap()
}

pub fn demo_graph() -> SceneGraph {
    graph_from(demo::grid_with_multiple_time_ranges(true).unwrap())
}

/// root -> row A -> panel P, with `last 1y` on the root.
pub fn three_level_scene() -> SceneGraph {
    let subtree = NodeBuilder::scene("R", true)
        .slot(SlotValue::TimeRange(TimeRange::last("1y")))
        .child(
            NodeBuilder::row("A")
                .child(NodeBuilder::panel("P", "timeseries"))
                .unwrap(),
        )
        .unwrap()
        .build()
        .unwrap();
    graph_from(subtree)
}

pub fn time_range(value: Option<&SlotValue>) -> Option<&TimeRange> {
    match value {
        Some(SlotValue::TimeRange(range)) => Some(range),
        _ => None,
    }
}
