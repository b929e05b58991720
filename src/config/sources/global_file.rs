//! Global config file source: $XDG_CONFIG_HOME/strata/config.toml

use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path to the global config file, if a config directory can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => directories::BaseDirs::new()?.config_dir().to_path_buf(),
    };
    Some(base.join("strata").join("config.toml"))
}

/// Add the global config file to the builder if it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: Option<&Path>,
) -> ConfigBuilder<DefaultState> {
    match path {
        Some(path) if path.exists() => {
            debug!(config_path = %path.display(), "Using global configuration");
            builder.add_source(File::from(path.to_path_buf()).required(false))
        }
        Some(path) => {
            debug!(config_path = %path.display(), "No global configuration file");
            builder
        }
        None => builder,
    }
}
