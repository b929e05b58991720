//! CLI presentation: text and json formatters for scene commands.

use crate::error::ApiError;
use crate::slot::ResolvedBinding;
use crate::snapshot::{NodeView, SceneSnapshot};
use crate::store::SceneSummary;
use crate::types::SlotKind;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

pub fn format_scene_json(snapshot: &SceneSnapshot) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// One row per node, indented by depth.
pub fn format_scene_table(snapshot: &SceneSnapshot) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Node", "Kind", "Placement", "Time range", "Data provider"]);
    for view in snapshot.nodes() {
        let mut name = format!("{}{}", "  ".repeat(view.depth), view.key);
        if view.collapsed {
            name.push_str(" [collapsed]");
        }
        table.add_row(vec![
            name,
            view.kind.label().to_string(),
            placement_cell(view),
            binding_cell(view, SlotKind::TimeRange),
            binding_cell(view, SlotKind::DataProvider),
        ]);
    }
    format!(
        "{}\nRevision {}, {} nodes ({} visible)",
        table,
        snapshot.revision,
        snapshot.len(),
        snapshot.visible().count()
    )
}

fn placement_cell(view: &NodeView) -> String {
    match (&view.placement, view.hidden) {
        (Some(p), _) => format!("{},{} {}x{}", p.x, p.y, p.width, p.height),
        (None, true) => "hidden".to_string(),
        (None, false) => "-".to_string(),
    }
}

fn binding_cell(view: &NodeView, kind: SlotKind) -> String {
    match view.binding(kind) {
        Some(binding) => format!("{} ({})", value_text(binding), binding.describe_source()),
        None => "unresolved".to_string(),
    }
}

fn value_text(binding: &ResolvedBinding) -> String {
    binding
        .value
        .as_ref()
        .map(|v| v.summary())
        .unwrap_or_else(|| "empty".to_string())
}

pub fn format_binding(binding: &ResolvedBinding) -> Result<String, ApiError> {
    let value = match &binding.value {
        Some(value) => serde_json::to_string_pretty(&value.to_json()?)?,
        None => "null".to_string(),
    };
    Ok(format!(
        "{} {} = {}\n{} {}",
        binding.node.bold(),
        binding.kind,
        value,
        "source:".dimmed(),
        binding.describe_source()
    ))
}

pub fn format_validation_ok(root: &str, nodes: usize, containers: usize) -> String {
    format!(
        "{} {}: {} nodes, {} containers laid out without conflicts",
        "OK".green().bold(),
        root,
        nodes,
        containers
    )
}

pub fn format_store_list(summaries: &[SceneSummary]) -> String {
    if summaries.is_empty() {
        return "No stored scenes.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Nodes", "Fingerprint", "Stored at"]);
    for summary in summaries {
        let stored_at = chrono::DateTime::from_timestamp(summary.stored_at, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| summary.stored_at.to_string());
        let short: String = summary.fingerprint.chars().take(12).collect();
        table.add_row(vec![
            summary.name.clone(),
            summary.node_count.to_string(),
            short,
            stored_at,
        ]);
    }
    table.to_string()
}
