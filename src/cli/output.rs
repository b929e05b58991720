//! CLI output: error mapping from domain errors to the CLI surface.

use owo_colors::OwoColorize;

/// Render an error and its context chain for stderr.
pub fn map_error(e: &anyhow::Error) -> String {
    format!("{} {:#}", "error:".red().bold(), e)
}
