//! Workspace config file source: strata.toml and strata.{STRATA_ENV}.toml

use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use std::path::{Path, PathBuf};

pub const WORKSPACE_CONFIG: &str = "strata.toml";

pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(WORKSPACE_CONFIG)
}

/// Add workspace config files to builder.
/// Precedence: strata.toml (base) then strata.{STRATA_ENV}.toml when the variable is set.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> ConfigBuilder<DefaultState> {
    let mut builder = builder;

    let base_config_path = workspace_config_path(workspace_root);
    if base_config_path.exists() {
        builder = builder.add_source(File::from(base_config_path).required(false));
    }

    if let Ok(env_name) = std::env::var("STRATA_ENV") {
        let env_config_path = workspace_root.join(format!("strata.{}.toml", env_name));
        if env_config_path.exists() {
            builder = builder.add_source(File::from(env_config_path).required(false));
        }
    }

    builder
}
