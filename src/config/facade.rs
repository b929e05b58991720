//! Entry point for loading configuration.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::StrataConfig;
use crate::error::ApiError;
use config::File;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`StrataConfig`] from layered sources.
///
/// Precedence (lowest to highest): built-in defaults, global file,
/// workspace `strata.toml`, `STRATA__*` environment variables.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load for a workspace using the real global file and process environment.
    pub fn load(workspace_root: &Path) -> Result<StrataConfig, ApiError> {
        Self::load_layers(workspace_root, global_file::global_config_path(), None)
    }

    /// Load with an explicit global file path and environment.
    ///
    /// `env: None` reads the process environment.
    pub fn load_layers(
        workspace_root: &Path,
        global_path: Option<PathBuf>,
        env: Option<HashMap<String, String>>,
    ) -> Result<StrataConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder, global_path.as_deref());
        let builder = workspace_file::add_to_builder(builder, workspace_root);
        let builder = merge_policy::add_environment(builder, env);

        let config: StrataConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace = %workspace_root.display(),
            columns = config.grid.columns,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Load a single file on top of the built-in defaults, ignoring other layers.
    pub fn load_from_file(path: &Path) -> Result<StrataConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// The built-in defaults with no files or environment applied.
    pub fn defaults() -> StrataConfig {
        StrataConfig::default()
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
        workspace_file::workspace_config_path(workspace_root)
    }
}
