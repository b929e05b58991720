//! Scene documents: round trip, validation on load, fingerprints

use super::test_utils::{defaults, demo_graph, time_range};
use strata::demo::{self, OUTSIDER_KEY, ROW_CHILD_2, ROW_KEY};
use strata::error::{ApiError, SceneError};
use strata::graph::Mutation;
use strata::layout::GridConstraints;
use strata::persistence::SceneDocument;
use strata::slot::ContextSlot;
use strata::types::{NodeKey, SlotKind, SlotValue, TimeRange};
use tempfile::TempDir;

#[test]
fn test_demo_document_round_trip() {
    let subtree = demo::grid_with_multiple_time_ranges(true).unwrap();
    let doc = SceneDocument::from_subtree(&subtree).unwrap();
    let json = doc.to_json_string().unwrap();
    let parsed = SceneDocument::from_json_str(&json).unwrap();
    assert_eq!(parsed, doc);

    let rebuilt = SceneDocument::from_subtree(&parsed.to_subtree().unwrap()).unwrap();
    assert_eq!(rebuilt, doc);
    assert_eq!(rebuilt.fingerprint().unwrap(), doc.fingerprint().unwrap());
}

#[test]
fn test_document_shape() {
    let subtree = demo::grid_with_multiple_time_ranges(false).unwrap();
    let doc = SceneDocument::from_subtree(&subtree).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&doc.to_json_string().unwrap()).unwrap();

    assert_eq!(value["type"], "scene");
    assert_eq!(value["standalone"], false);
    assert_eq!(value["localSlots"]["timeRange"]["from"], "now-6h");
    let row = &value["children"][0]["children"][0];
    assert_eq!(row["key"], ROW_KEY);
    assert_eq!(row["type"], "gridRow");
    assert_eq!(row["collapsed"], true);
    assert_eq!(
        row["localSlots"]["dataProvider"]["queries"][0]["params"]["scenarioId"],
        "random_walk_table"
    );
    let panel = &row["children"][1];
    assert_eq!(panel["key"], ROW_CHILD_2);
    assert_eq!(panel["pluginId"], "timeseries");
    assert_eq!(panel["layout"]["isDraggable"], true);
    // Resolved bindings are never written.
    assert!(panel.get("bindings").is_none());
}

#[test]
fn test_loaded_graph_resolves_like_original() {
    let mut original = demo_graph();
    let doc = SceneDocument::from_graph(&original).unwrap();
    let mut loaded = doc.into_graph(defaults(), GridConstraints::default()).unwrap();

    for node in original.tree().descendants(original.tree().root()) {
        for kind in SlotKind::ALL {
            assert_eq!(
                original.resolve(&node, kind).ok(),
                loaded.resolve(&node, kind).ok(),
                "{} {}",
                node,
                kind
            );
        }
    }
}

#[test]
fn test_mutations_survive_round_trip() {
    let mut graph = demo_graph();
    graph
        .mutate(Mutation::SetSlot {
            node: NodeKey::from(OUTSIDER_KEY),
            slot: ContextSlot::new(SlotValue::TimeRange(TimeRange::last("15m"))),
        })
        .unwrap();
    graph
        .mutate(Mutation::SetSlot {
            node: NodeKey::from(ROW_CHILD_2),
            slot: ContextSlot::empty(SlotKind::DataProvider),
        })
        .unwrap();
    let before = SceneDocument::from_graph(&graph).unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("scene.json");
    before.write_to(&path).unwrap();
    let after = SceneDocument::read_from(&path).unwrap();
    assert_eq!(after, before);

    let mut loaded = after.into_graph(defaults(), GridConstraints::default()).unwrap();
    let outsider = loaded
        .resolve(&NodeKey::from(OUTSIDER_KEY), SlotKind::TimeRange)
        .unwrap();
    assert_eq!(time_range(outsider.value.as_ref()), Some(&TimeRange::last("15m")));
    let blank = loaded
        .resolve(&NodeKey::from(ROW_CHILD_2), SlotKind::DataProvider)
        .unwrap();
    assert_eq!(blank.value, None);
    assert_ne!(
        before.fingerprint().unwrap(),
        SceneDocument::from_subtree(&demo::grid_with_multiple_time_ranges(true).unwrap())
            .unwrap()
            .fingerprint()
            .unwrap()
    );
}

#[test]
fn test_overlapping_document_fails_to_load() {
    let json = serde_json::json!({
        "key": "grid",
        "type": "gridLayout",
        "children": [
            { "key": "a", "type": "vizPanel", "pluginId": "stat",
              "layout": { "x": 0, "y": 0, "width": 6, "height": 5 } },
            { "key": "b", "type": "vizPanel", "pluginId": "stat",
              "layout": { "x": 0, "y": 0, "width": 6, "height": 5 } }
        ]
    })
    .to_string();
    let doc = SceneDocument::from_json_str(&json).unwrap();
    let err = doc
        .into_graph(defaults(), GridConstraints::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Scene(SceneError::LayoutConflict { .. })
    ));
}

#[test]
fn test_unknown_node_type_is_a_persistence_error() {
    let json = r#"{ "key": "x", "type": "carousel" }"#;
    assert!(matches!(
        SceneDocument::from_json_str(json),
        Err(ApiError::Persistence(_))
    ));
}

#[test]
fn test_document_with_extreme_coordinates_rejected() {
    let far_right = r#"{
        "key": "grid", "type": "gridLayout",
        "children": [
            { "key": "p", "type": "vizPanel", "pluginId": "stat",
              "layout": { "x": 4294967295, "y": 0, "width": 6, "height": 5 } }
        ]
    }"#;
    let far_down = r#"{
        "key": "grid", "type": "gridLayout",
        "children": [
            { "key": "a", "type": "vizPanel", "pluginId": "stat",
              "layout": { "x": 0, "y": 0, "width": 6, "height": 5 } },
            { "key": "b", "type": "vizPanel", "pluginId": "stat",
              "layout": { "x": 0, "y": 4294967295, "width": 6, "height": 5 } }
        ]
    }"#;
    for json in [far_right, far_down] {
        let doc = SceneDocument::from_json_str(json).unwrap();
        let result = doc.into_graph(defaults(), GridConstraints::default());
        assert!(matches!(
            result,
            Err(ApiError::Scene(SceneError::OutOfBounds { .. }))
        ));
    }
}
