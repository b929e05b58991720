//! Slot resolution through the scene hierarchy

use super::test_utils::{demo_graph, three_level_scene, time_range};
use strata::demo::{GRID_KEY, OUTSIDER_KEY, ROW_CHILD_1, ROW_KEY, SCENE_KEY};
use strata::error::SceneError;
use strata::graph::{Mutation, MutationOutcome};
use strata::slot::{BindingSource, ContextSlot};
use strata::tree::NodeBuilder;
use strata::types::{NodeKey, SlotKind, SlotValue, TimeRange};

fn key(s: &str) -> NodeKey {
    NodeKey::from(s)
}

#[test]
fn test_inherits_through_two_levels_then_follows_override() {
    let mut graph = three_level_scene();

    let p = graph.resolve(&key("P"), SlotKind::TimeRange).unwrap();
    assert_eq!(time_range(p.value.as_ref()), Some(&TimeRange::last("1y")));
    assert_eq!(
        p.source,
        BindingSource::Inherited {
            ancestor: key("R"),
            depth: 2
        }
    );

    graph
        .mutate(Mutation::SetSlot {
            node: key("A"),
            slot: ContextSlot::new(SlotValue::TimeRange(TimeRange::last("7d"))),
        })
        .unwrap();

    let p = graph.resolve(&key("P"), SlotKind::TimeRange).unwrap();
    assert_eq!(time_range(p.value.as_ref()), Some(&TimeRange::last("7d")));
    let r = graph.resolve(&key("R"), SlotKind::TimeRange).unwrap();
    assert_eq!(time_range(r.value.as_ref()), Some(&TimeRange::last("1y")));
    assert_eq!(r.source, BindingSource::Local);
}

#[test]
fn test_demo_bindings() {
    let mut graph = demo_graph();

    let child = graph.resolve(&key(ROW_CHILD_1), SlotKind::TimeRange).unwrap();
    assert_eq!(time_range(child.value.as_ref()), Some(&TimeRange::last("1y")));
    assert_eq!(
        child.source,
        BindingSource::Inherited {
            ancestor: key(ROW_KEY),
            depth: 1
        }
    );

    let provider = graph
        .resolve(&key(ROW_CHILD_1), SlotKind::DataProvider)
        .unwrap();
    match provider.value {
        Some(SlotValue::DataProvider(p)) => {
            assert_eq!(p.queries[0].params["scenarioId"], "random_walk_table")
        }
        other => panic!("unexpected provider {:?}", other),
    }

    let outsider = graph.resolve(&key(OUTSIDER_KEY), SlotKind::TimeRange).unwrap();
    assert_eq!(time_range(outsider.value.as_ref()), Some(&TimeRange::last("6h")));
    assert_eq!(
        outsider.source,
        BindingSource::Inherited {
            ancestor: key(SCENE_KEY),
            depth: 2
        }
    );
    let outsider_provider = graph
        .resolve(&key(OUTSIDER_KEY), SlotKind::DataProvider)
        .unwrap();
    assert_eq!(outsider_provider.source, BindingSource::Local);

    let editor = graph
        .resolve(&key(GRID_KEY), SlotKind::EditorController)
        .unwrap();
    assert_eq!(editor.describe_source(), format!("inherited from {} (+1)", SCENE_KEY));
}

#[test]
fn test_explicit_empty_differs_from_unresolved() {
    let subtree = NodeBuilder::grid("grid")
        .child(NodeBuilder::panel("blank", "text").empty_slot(SlotKind::DataProvider))
        .unwrap()
        .child(NodeBuilder::panel("plain", "text"))
        .unwrap()
        .build()
        .unwrap();
    let mut graph = super::test_utils::graph_from(subtree);

    let blank = graph.resolve(&key("blank"), SlotKind::DataProvider).unwrap();
    assert_eq!(blank.value, None);
    assert_eq!(blank.source, BindingSource::Local);

    let err = graph
        .resolve(&key("plain"), SlotKind::DataProvider)
        .unwrap_err();
    assert_eq!(
        err,
        SceneError::UnresolvedSlot {
            node: key("plain"),
            kind: SlotKind::DataProvider
        }
    );

    // The failed read leaves other cached bindings alone.
    let blank_again = graph.resolve(&key("blank"), SlotKind::DataProvider).unwrap();
    assert_eq!(blank_again, blank);
}

#[test]
fn test_root_default_applies_when_nothing_defines_slot() {
    let subtree = NodeBuilder::grid("grid")
        .child(NodeBuilder::panel("p", "stat"))
        .unwrap()
        .build()
        .unwrap();
    let mut graph = super::test_utils::graph_from(subtree);
    let binding = graph.resolve(&key("p"), SlotKind::TimeRange).unwrap();
    assert_eq!(binding.source, BindingSource::Default);
    assert_eq!(time_range(binding.value.as_ref()), Some(&TimeRange::last("6h")));
}

#[test]
fn test_resolution_is_cached_until_path_changes() {
    let mut graph = three_level_scene();
    graph.resolve(&key("P"), SlotKind::TimeRange).unwrap();
    graph.resolve(&key("P"), SlotKind::TimeRange).unwrap();
    let stats = graph.resolver_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);

    graph
        .mutate(Mutation::SetSlot {
            node: key("R"),
            slot: ContextSlot::new(SlotValue::TimeRange(TimeRange::last("2d"))),
        })
        .unwrap();
    let p = graph.resolve(&key("P"), SlotKind::TimeRange).unwrap();
    assert_eq!(time_range(p.value.as_ref()), Some(&TimeRange::last("2d")));
    assert!(graph.resolver_stats().invalidations >= 1);
}

#[test]
fn test_override_shields_descendants_from_ancestor_change() {
    let mut graph = demo_graph();
    let before = graph.resolve(&key(ROW_CHILD_1), SlotKind::TimeRange).unwrap();
    let misses = graph.resolver_stats().misses;

    graph
        .mutate(Mutation::SetSlot {
            node: key(SCENE_KEY),
            slot: ContextSlot::new(SlotValue::TimeRange(TimeRange::last("7d"))),
        })
        .unwrap();

    // Row A overrides the time range, so its child stays cached and unchanged.
    let after = graph.resolve(&key(ROW_CHILD_1), SlotKind::TimeRange).unwrap();
    assert_eq!(before, after);
    let outsider = graph.resolve(&key(OUTSIDER_KEY), SlotKind::TimeRange).unwrap();
    assert_eq!(time_range(outsider.value.as_ref()), Some(&TimeRange::last("7d")));
    // Scene re-resolved on mutate, outsider on read; the row child was a hit.
    assert_eq!(graph.resolver_stats().misses, misses + 2);
}

#[test]
fn test_setting_same_value_is_unchanged() {
    let mut graph = three_level_scene();
    let outcome = graph
        .mutate(Mutation::SetSlot {
            node: key("R"),
            slot: ContextSlot::new(SlotValue::TimeRange(TimeRange::last("1y"))),
        })
        .unwrap();
    assert!(matches!(outcome, MutationOutcome::Unchanged));
    assert_eq!(graph.revision(), 0);
}

#[test]
fn test_clearing_override_restores_inheritance() {
    let mut graph = demo_graph();
    graph
        .mutate(Mutation::ClearSlot {
            node: key(ROW_KEY),
            kind: SlotKind::TimeRange,
        })
        .unwrap();
    let child = graph.resolve(&key(ROW_CHILD_1), SlotKind::TimeRange).unwrap();
    assert_eq!(time_range(child.value.as_ref()), Some(&TimeRange::last("6h")));
    assert_eq!(
        child.source,
        BindingSource::Inherited {
            ancestor: key(SCENE_KEY),
            depth: 3
        }
    );
}

#[test]
fn test_invalid_slot_value_rejected() {
    let mut graph = three_level_scene();
    let err = graph
        .mutate(Mutation::SetSlot {
            node: key("A"),
            slot: ContextSlot::new(SlotValue::TimeRange(TimeRange::new("now", "now-1d"))),
        })
        .unwrap_err();
    assert!(matches!(err, SceneError::InvalidSlotValue { .. }));
    assert_eq!(graph.revision(), 0);
}
