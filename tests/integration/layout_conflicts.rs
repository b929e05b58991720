//! Grid placement and overlap validation

use super::test_utils::{demo_graph, graph_from};
use strata::demo::{GRID_KEY, OUTSIDER_KEY, ROW_CHILD_1, ROW_CHILD_2, ROW_KEY};
use strata::error::SceneError;
use strata::graph::{Mutation, SceneGraph};
use strata::layout::{GridConstraints, LayoutMeta};
use strata::tree::NodeBuilder;
use strata::types::NodeKey;

fn key(s: &str) -> NodeKey {
    NodeKey::from(s)
}

#[test]
fn test_identical_cells_conflict_names_both_siblings() {
    let subtree = NodeBuilder::grid("grid")
        .child(NodeBuilder::panel("left", "stat").layout(LayoutMeta::at(0, 0, 6, 5)))
        .unwrap()
        .child(NodeBuilder::panel("right", "stat").layout(LayoutMeta::at(0, 0, 6, 5)))
        .unwrap()
        .build()
        .unwrap();
    let err = SceneGraph::new(
        subtree,
        super::test_utils::defaults(),
        GridConstraints::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        SceneError::LayoutConflict {
            first: key("left"),
            second: key("right")
        }
    );
}

#[test]
fn test_floating_sibling_is_exempt() {
    let subtree = NodeBuilder::grid("grid")
        .child(NodeBuilder::panel("base", "stat").layout(LayoutMeta::at(0, 0, 6, 5)))
        .unwrap()
        .child(
            NodeBuilder::panel("overlay", "text").layout(LayoutMeta::at(0, 0, 6, 5).floating()),
        )
        .unwrap()
        .build()
        .unwrap();
    let graph = graph_from(subtree);
    let placements = graph.arrange(&key("grid")).unwrap();
    assert_eq!(placements.len(), 2);
    assert!(placements[1].is_floating);
}

#[test]
fn test_conflicting_add_child_leaves_tree_unchanged() {
    let mut graph = demo_graph();
    let len = graph.tree().len();
    let intruder = NodeBuilder::panel("intruder", "stat")
        .layout(LayoutMeta::at(2, 14, 4, 4))
        .build()
        .unwrap();

    let err = graph
        .mutate(Mutation::AddChild {
            parent: key(GRID_KEY),
            subtree: intruder,
            index: None,
        })
        .unwrap_err();
    assert_eq!(
        err,
        SceneError::LayoutConflict {
            first: key(OUTSIDER_KEY),
            second: key("intruder")
        }
    );
    assert_eq!(graph.tree().len(), len);
    assert!(!graph.tree().contains(&key("intruder")));
    assert_eq!(graph.revision(), 0);
}

#[test]
fn test_auto_placement_fills_first_free_cell() {
    let subtree = NodeBuilder::grid("grid")
        .child(NodeBuilder::panel("fixed", "stat").layout(LayoutMeta::at(0, 0, 12, 4)))
        .unwrap()
        .child(NodeBuilder::panel("a", "stat").layout(LayoutMeta::auto(12, 4)))
        .unwrap()
        .child(NodeBuilder::panel("b", "stat").layout(LayoutMeta::auto(24, 2)))
        .unwrap()
        .build()
        .unwrap();
    let graph = graph_from(subtree);
    let placements = graph.arrange(&key("grid")).unwrap();
    let a = &placements[1];
    assert_eq!((a.x, a.y), (12, 0));
    let b = &placements[2];
    assert_eq!((b.x, b.y), (0, 4));
}

#[test]
fn test_out_of_bounds_rejected() {
    let subtree = NodeBuilder::grid("grid")
        .child(NodeBuilder::panel("wide", "stat").layout(LayoutMeta::at(20, 0, 8, 4)))
        .unwrap()
        .build()
        .unwrap();
    let err = SceneGraph::new(
        subtree,
        super::test_utils::defaults(),
        GridConstraints::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SceneError::OutOfBounds { x: 20, width: 8, .. }));
}

#[test]
fn test_collapsed_row_lays_out_nothing() {
    let graph = demo_graph();
    assert!(graph.arrange(&key(ROW_KEY)).unwrap().is_empty());
    let grid = graph.arrange(&key(GRID_KEY)).unwrap();
    assert_eq!(grid.len(), 2);
    assert_eq!(grid[0].key, key(ROW_KEY));
    assert_eq!(grid[0].width, 24);
}

#[test]
fn test_expanding_row_validates_children() {
    let mut graph = demo_graph();

    // While collapsed the row's children may overlap.
    graph
        .mutate(Mutation::SetLayout {
            node: key(ROW_CHILD_2),
            layout: LayoutMeta::at(0, 0, 6, 5).interactive(),
        })
        .unwrap();

    let err = graph
        .mutate(Mutation::SetCollapsed {
            node: key(ROW_KEY),
            collapsed: false,
        })
        .unwrap_err();
    assert!(matches!(err, SceneError::LayoutConflict { .. }));
    assert!(graph.tree().get(&key(ROW_KEY)).unwrap().is_collapsed());

    graph
        .mutate(Mutation::SetLayout {
            node: key(ROW_CHILD_2),
            layout: LayoutMeta::at(12, 0, 6, 5).interactive(),
        })
        .unwrap();
    graph
        .mutate(Mutation::SetCollapsed {
            node: key(ROW_KEY),
            collapsed: false,
        })
        .unwrap();
    let placements = graph.arrange(&key(ROW_KEY)).unwrap();
    assert_eq!(placements.len(), 2);
    assert_eq!(placements[0].key, key(ROW_CHILD_1));
}

#[test]
fn test_drag_and_resize_need_flags() {
    let subtree = NodeBuilder::grid("grid")
        .child(NodeBuilder::panel("pinned", "stat").layout(LayoutMeta::at(0, 0, 6, 5)))
        .unwrap()
        .child(
            NodeBuilder::panel("movable", "stat").layout(LayoutMeta::at(6, 0, 6, 5).interactive()),
        )
        .unwrap()
        .build()
        .unwrap();
    let mut graph = graph_from(subtree);

    let err = graph
        .mutate(Mutation::SetLayout {
            node: key("pinned"),
            layout: LayoutMeta::at(0, 10, 6, 5),
        })
        .unwrap_err();
    assert!(matches!(err, SceneError::InvalidState(_)));

    let err = graph
        .mutate(Mutation::SetLayout {
            node: key("movable"),
            layout: LayoutMeta::at(3, 0, 6, 5).interactive(),
        })
        .unwrap_err();
    assert_eq!(
        err,
        SceneError::LayoutConflict {
            first: key("pinned"),
            second: key("movable")
        }
    );

    graph
        .mutate(Mutation::SetLayout {
            node: key("movable"),
            layout: LayoutMeta::at(6, 0, 12, 8).interactive(),
        })
        .unwrap();
    assert_eq!(graph.revision(), 1);
    let placements = graph.arrange(&key("grid")).unwrap();
    assert_eq!(placements[1].width, 12);
}
