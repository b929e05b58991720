//! Demo scene: a grid whose rows and panels override the scene's time range
//! and data provider at different levels.

use crate::error::SceneError;
use crate::layout::LayoutMeta;
use crate::tree::{NodeBuilder, Subtree};
use crate::types::{DataProviderRef, EditorRef, SlotValue, TimeRange};

pub const SCENE_KEY: &str = "scene";
pub const GRID_KEY: &str = "grid";
pub const ROW_KEY: &str = "Row A";
pub const ROW_CHILD_1: &str = "Row A Child1";
pub const ROW_CHILD_2: &str = "Row A Child2";
pub const OUTSIDER_KEY: &str = "Outsider-own-query";

/// Random-walk test data provider, optionally with a specific scenario.
pub fn random_walk_provider(scenario: Option<&str>) -> DataProviderRef {
    DataProviderRef::new("testdata", "grafana-testdata-datasource")
        .with_query([("scenarioId", scenario.unwrap_or("random_walk"))])
}

/// The scene-level time range when nothing overrides it.
pub fn global_time_range() -> TimeRange {
    TimeRange::last("6h")
}

/// Scene root with a global time range, query and editor; a collapsed row
/// with its own last-year range and table query; and an outsider panel with
/// its own query that inherits the global time range.
pub fn grid_with_multiple_time_ranges(standalone: bool) -> Result<Subtree, SceneError> {
    let row = NodeBuilder::row(ROW_KEY)
        .title("Row A - has its own query, last year time range")
        .slot(SlotValue::TimeRange(TimeRange::last("1y")))
        .slot(SlotValue::DataProvider(random_walk_provider(Some(
            "random_walk_table",
        ))))
        .collapsed(true)
        .layout(LayoutMeta {
            y: Some(0),
            ..LayoutMeta::default()
        })
        .child(
            // y 0 rather than 1: rows lay out in their own grid, where y 1
            // would overlap Child2.
            NodeBuilder::panel(ROW_CHILD_1, "timeseries")
                .title("Row A Child1")
                .layout(LayoutMeta::at(0, 0, 12, 5).interactive()),
        )?
        .child(
            NodeBuilder::panel(ROW_CHILD_2, "timeseries")
                .title("Row A Child2")
                .layout(LayoutMeta::at(0, 5, 6, 5).interactive()),
        )?;

    let outsider = NodeBuilder::panel(OUTSIDER_KEY, "timeseries")
        .title("Outsider, has its own query")
        .slot(SlotValue::DataProvider(random_walk_provider(None)))
        .layout(LayoutMeta::at(0, 12, 6, 10).interactive());

    let grid = NodeBuilder::grid(GRID_KEY).child(row)?.child(outsider)?;

    NodeBuilder::scene(SCENE_KEY, standalone)
        .title("Grid with rows and different queries and time ranges")
        .slot(SlotValue::TimeRange(global_time_range()))
        .slot(SlotValue::DataProvider(random_walk_provider(None)))
        .slot(SlotValue::Editor(EditorRef::new("scene-edit-manager")))
        .child(grid)?
        .build()
}
