//! Merge rules: built-in defaults, override order, environment overrides.

use crate::config::default_store_path;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment};
use std::collections::HashMap;

/// Prefix for environment overrides, e.g. `STRATA__GRID__COLUMNS=12`.
pub const ENV_PREFIX: &str = "STRATA";
pub const ENV_SEPARATOR: &str = "__";

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("grid.columns", 24)?
        .set_default("grid.default_width", 12)?
        .set_default("grid.default_height", 8)?
        .set_default("grid.min_width", 1)?
        .set_default("grid.min_height", 1)?
        .set_default(
            "storage.store_path",
            default_store_path().to_string_lossy().to_string(),
        )
}

/// Environment overrides go last so they win over every file.
///
/// `vars` replaces the process environment when given.
pub fn add_environment(
    builder: ConfigBuilder<DefaultState>,
    vars: Option<HashMap<String, String>>,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .source(vars),
    )
}
