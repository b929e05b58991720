//! Document round trip on random trees

use super::support::{build_graph, defaults, expected_time_range, scene_specs};
use proptest::prelude::*;
use strata::layout::GridConstraints;
use strata::persistence::SceneDocument;
use strata::types::SlotKind;

proptest! {
    #[test]
    fn document_survives_json_round_trip((root_slot, specs) in scene_specs()) {
        let graph = build_graph(root_slot, &specs);
        let doc = SceneDocument::from_graph(&graph).unwrap();
        let json = doc.to_json_string().unwrap();
        let parsed = SceneDocument::from_json_str(&json).unwrap();
        prop_assert_eq!(&parsed, &doc);
        prop_assert_eq!(parsed.fingerprint().unwrap(), doc.fingerprint().unwrap());
        prop_assert_eq!(parsed.node_count(), graph.tree().len());
    }

    #[test]
    fn loaded_graph_resolves_identically((root_slot, specs) in scene_specs()) {
        let original = build_graph(root_slot, &specs);
        let doc = SceneDocument::from_graph(&original).unwrap();
        let mut loaded = doc.into_graph(defaults(), GridConstraints::default()).unwrap();
        prop_assert_eq!(SceneDocument::from_graph(&loaded).unwrap(), doc);

        for key in original.tree().descendants(original.tree().root()) {
            let binding = loaded.resolve(&key, SlotKind::TimeRange).unwrap();
            prop_assert_eq!(binding.value, expected_time_range(&original, &key));
        }
    }
}
