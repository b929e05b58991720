//! Configuration loading feeding a scene graph

use std::collections::HashMap;
use strata::config::ConfigLoader;
use strata::demo;
use strata::graph::SceneGraph;
use strata::slot::BindingSource;
use strata::tree::NodeBuilder;
use strata::types::{NodeKey, SlotKind, SlotValue, TimeRange};
use tempfile::TempDir;

#[test]
fn test_workspace_config_drives_defaults_and_grid() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        ConfigLoader::workspace_config_path(dir.path()),
        r#"
[grid]
columns = 12
default_width = 6
default_height = 4

[defaults.time_range]
from = "now-30d"
to = "now"

[defaults.data_provider]
uid = "fallback"
type = "grafana-testdata-datasource"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_layers(dir.path(), None, Some(HashMap::new()))
        .unwrap()
        .validated()
        .unwrap();
    assert_eq!(config.grid.columns, 12);

    let subtree = NodeBuilder::grid("grid")
        .child(NodeBuilder::panel("a", "stat"))
        .unwrap()
        .child(NodeBuilder::panel("b", "stat"))
        .unwrap()
        .child(NodeBuilder::panel("c", "stat"))
        .unwrap()
        .build()
        .unwrap();
    let mut graph = SceneGraph::new(
        subtree,
        config.defaults.root_defaults(),
        config.grid.constraints(),
    )
    .unwrap();

    let placements = graph.arrange(&NodeKey::from("grid")).unwrap();
    let cells: Vec<(u32, u32)> = placements.iter().map(|p| (p.x, p.y)).collect();
    assert_eq!(cells, vec![(0, 0), (6, 0), (0, 4)]);

    let range = graph
        .resolve(&NodeKey::from("c"), SlotKind::TimeRange)
        .unwrap();
    assert_eq!(range.source, BindingSource::Default);
    assert_eq!(
        range.value,
        Some(SlotValue::TimeRange(TimeRange::last("30d")))
    );
    let provider = graph
        .resolve(&NodeKey::from("c"), SlotKind::DataProvider)
        .unwrap();
    assert_eq!(provider.source, BindingSource::Default);
}

#[test]
fn test_narrow_grid_rejects_demo_scene() {
    let dir = TempDir::new().unwrap();
    let env = HashMap::from([
        ("STRATA__GRID__COLUMNS".to_string(), "4".to_string()),
        ("STRATA__GRID__DEFAULT_WIDTH".to_string(), "4".to_string()),
    ]);
    let config = ConfigLoader::load_layers(dir.path(), None, Some(env)).unwrap();
    assert_eq!(config.grid.columns, 4);

    // The outsider panel is 6 cells wide.
    let result = SceneGraph::new(
        demo::grid_with_multiple_time_ranges(true).unwrap(),
        config.defaults.root_defaults(),
        config.grid.constraints(),
    );
    assert!(result.is_err());
}

#[test]
fn test_invalid_config_reports_every_problem() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        ConfigLoader::workspace_config_path(dir.path()),
        r#"
[grid]
default_width = 48

[defaults.time_range]
from = "yesterday"
to = "now"

[logging]
format = "xml"
"#,
    )
    .unwrap();
    let config = ConfigLoader::load_layers(dir.path(), None, Some(HashMap::new())).unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 3);
    assert!(config.validated().is_err());
}
