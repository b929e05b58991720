//! Integration tests for the sled scene store

use super::test_utils::defaults;
use strata::demo;
use strata::layout::GridConstraints;
use strata::persistence::SceneDocument;
use strata::store::{SceneStore, SledSceneStore};
use strata::types::{NodeKey, SlotKind};
use tempfile::TempDir;

fn demo_document(standalone: bool) -> SceneDocument {
    SceneDocument::from_subtree(&demo::grid_with_multiple_time_ranges(standalone).unwrap()).unwrap()
}

#[test]
fn test_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let doc = demo_document(true);
    {
        let store = SledSceneStore::new(dir.path()).unwrap();
        store.put("dashboard", &doc).unwrap();
        store.flush().unwrap();
    }

    let store = SledSceneStore::new(dir.path()).unwrap();
    let record = store.get("dashboard").unwrap().unwrap();
    assert_eq!(record.document, doc);
    assert_eq!(record.node_count, 6);
    assert_eq!(record.fingerprint, doc.fingerprint().unwrap());

    let mut graph = record
        .document
        .into_graph(defaults(), GridConstraints::default())
        .unwrap();
    let binding = graph
        .resolve(&NodeKey::from(demo::ROW_CHILD_2), SlotKind::DataProvider)
        .unwrap();
    assert!(binding.value.is_some());
}

#[test]
fn test_put_replaces_and_list_is_sorted() {
    let dir = TempDir::new().unwrap();
    let store = SledSceneStore::new(dir.path()).unwrap();
    store.put("zeta", &demo_document(true)).unwrap();
    store.put("alpha", &demo_document(true)).unwrap();
    let replaced = store.put("zeta", &demo_document(false)).unwrap();

    let names: Vec<String> = store.list().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
    let zeta = store.get("zeta").unwrap().unwrap();
    assert_eq!(zeta.fingerprint, replaced.fingerprint);
    assert_ne!(
        zeta.fingerprint,
        store.get("alpha").unwrap().unwrap().fingerprint
    );
}

#[test]
fn test_delete_and_missing() {
    let dir = TempDir::new().unwrap();
    let store = SledSceneStore::new(dir.path()).unwrap();
    store.put("scene", &demo_document(true)).unwrap();
    assert!(store.delete("scene").unwrap());
    assert!(!store.delete("scene").unwrap());
    assert!(store.get("scene").unwrap().is_none());
    assert!(store.list().unwrap().is_empty());
    assert!(store.put("  ", &demo_document(true)).is_err());
}
