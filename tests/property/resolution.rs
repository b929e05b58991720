//! Resolution law, re-parenting and cycle rejection on random trees

use super::support::{build_graph, expected_time_range, node_key, scene_specs};
use proptest::prelude::*;
use proptest::sample::Index;
use strata::error::SceneError;
use strata::graph::Mutation;
use strata::persistence::SceneDocument;
use strata::types::SlotKind;

proptest! {
    #[test]
    fn resolve_matches_nearest_defining_ancestor((root_slot, specs) in scene_specs()) {
        let mut graph = build_graph(root_slot, &specs);
        for key in graph.tree().descendants(graph.tree().root()) {
            let expected = expected_time_range(&graph, &key);
            let binding = graph.resolve(&key, SlotKind::TimeRange).unwrap();
            prop_assert_eq!(binding.value, expected);
            // Second read comes from the cache and must agree.
            let cached = graph.resolve(&key, SlotKind::TimeRange).unwrap();
            prop_assert_eq!(cached.value, expected_time_range(&graph, &key));
        }
    }

    #[test]
    fn reparented_node_follows_new_ancestors(
        (root_slot, specs) in scene_specs(),
        node in any::<Index>(),
        target in any::<Index>(),
    ) {
        let mut graph = build_graph(root_slot, &specs);
        let all = graph.tree().descendants(graph.tree().root());
        // Warm the cache everywhere so stale entries would show.
        for key in &all {
            graph.resolve(key, SlotKind::TimeRange).unwrap();
        }

        let moved = node_key(1 + node.index(specs.len()));
        let new_parent = all[target.index(all.len())].clone();
        let would_cycle =
            moved == new_parent || graph.tree().is_ancestor_of(&moved, &new_parent);
        let result = graph.mutate(Mutation::Move {
            node: moved.clone(),
            new_parent: new_parent.clone(),
            index: None,
        });

        if would_cycle {
            let is_invalid_state = matches!(result, Err(SceneError::InvalidState(_)));
            prop_assert!(is_invalid_state);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(graph.tree().parent(&moved), Some(&new_parent));
        }

        for key in &all {
            let binding = graph.resolve(key, SlotKind::TimeRange).unwrap();
            prop_assert_eq!(binding.value, expected_time_range(&graph, key));
        }
    }

    #[test]
    fn moving_under_descendant_changes_nothing(
        (root_slot, specs) in scene_specs(),
        node in any::<Index>(),
        below in any::<Index>(),
    ) {
        let mut graph = build_graph(root_slot, &specs);
        let moved = node_key(1 + node.index(specs.len()));
        let subtree = graph.tree().descendants(&moved);
        let target = subtree[below.index(subtree.len())].clone();

        let before = SceneDocument::from_graph(&graph).unwrap();
        let revision = graph.revision();
        let result = graph.mutate(Mutation::Move {
            node: moved,
            new_parent: target,
            index: None,
        });

        let is_invalid_state = matches!(result, Err(SceneError::InvalidState(_)));
        prop_assert!(is_invalid_state);
        prop_assert_eq!(graph.revision(), revision);
        prop_assert_eq!(SceneDocument::from_graph(&graph).unwrap(), before);
    }
}
