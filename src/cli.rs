//! CLI domain: parse, route, output, and presentation only.
//! No domain logic; a single route table dispatches to the scene library.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, StoreCommands};
pub use presentation::{
    format_binding, format_scene_json, format_scene_table, format_store_list,
    format_validation_ok,
};
pub use route::RunContext;
