//! CLI route: single route table and run context. Dispatches to the scene
//! library and presentation.

use crate::cli::parse::{Commands, StoreCommands};
use crate::cli::presentation::{
    format_binding, format_scene_json, format_scene_table, format_store_list,
    format_validation_ok,
};
use crate::config::{ConfigLoader, StrataConfig};
use crate::demo;
use crate::error::ApiError;
use crate::graph::SceneGraph;
use crate::persistence::SceneDocument;
use crate::store::{SceneStore, SledSceneStore};
use crate::types::NodeKey;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace and effective configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: StrataConfig,
}

impl RunContext {
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)
                .with_context(|| format!("loading config file {}", path.display()))?,
            None => ConfigLoader::load(&workspace_root).with_context(|| {
                format!("loading configuration for {}", workspace_root.display())
            })?,
        };
        let config = config.validated()?;
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn from_config(workspace_root: PathBuf, config: StrataConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn config(&self) -> &StrataConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String> {
        match command {
            Commands::Demo { standalone, output } => {
                self.handle_demo(*standalone, output.as_deref())
            }
            Commands::Show { file, format } => self.handle_show(file, format),
            Commands::Resolve { file, node, slot } => {
                let mut graph = self.load_graph(file)?;
                let key = NodeKey::from(node.as_str());
                let binding = graph
                    .resolve(&key, *slot)
                    .with_context(|| format!("resolving {} at {}", slot, key))?;
                Ok(format_binding(&binding)?)
            }
            Commands::Validate { file } => {
                let graph = self.load_graph(file)?;
                graph.validate_layout()?;
                let tree = graph.tree();
                let containers = tree
                    .descendants(tree.root())
                    .iter()
                    .filter_map(|key| tree.node(key))
                    .filter(|node| !node.children().is_empty())
                    .count();
                Ok(format_validation_ok(
                    tree.root().as_str(),
                    tree.len(),
                    containers,
                ))
            }
            Commands::Fingerprint { file } => Ok(self.read_document(file)?.fingerprint()?),
            Commands::Store { command } => self.handle_store(command),
            Commands::Config => Ok(self.config.to_toml_string()?),
        }
    }

    fn handle_demo(&self, standalone: bool, output: Option<&Path>) -> Result<String> {
        let subtree = demo::grid_with_multiple_time_ranges(standalone)?;
        let document = SceneDocument::from_subtree(&subtree)?;
        match output {
            Some(path) => {
                document
                    .write_to(path)
                    .with_context(|| format!("writing {}", path.display()))?;
                Ok(format!(
                    "Wrote {} nodes to {}",
                    document.node_count(),
                    path.display()
                ))
            }
            None => Ok(document.to_json_string()?),
        }
    }

    fn handle_show(&self, file: &Path, format: &str) -> Result<String> {
        let mut graph = self.load_graph(file)?;
        let snapshot = graph.snapshot();
        match format {
            "json" => Ok(format_scene_json(&snapshot)?),
            "text" => Ok(format_scene_table(&snapshot)),
            other => Err(ApiError::ConfigError(format!(
                "Invalid output format: {} (must be 'text' or 'json')",
                other
            ))
            .into()),
        }
    }

    fn handle_store(&self, command: &StoreCommands) -> Result<String> {
        let store = self.open_store()?;
        let result = match command {
            StoreCommands::Put { name, file } => {
                let document = self.read_document(file)?;
                // Refuse documents that would not load as a scene.
                self.graph_from(&document)
                    .with_context(|| format!("validating {}", file.display()))?;
                let record = store.put(name, &document)?;
                format!(
                    "Stored '{}' ({} nodes, {})",
                    record.name, record.node_count, record.fingerprint
                )
            }
            StoreCommands::Get { name, output } => {
                let record = store
                    .get(name)?
                    .ok_or_else(|| ApiError::DocumentNotFound(name.clone()))?;
                match output {
                    Some(path) => {
                        record
                            .document
                            .write_to(path)
                            .with_context(|| format!("writing {}", path.display()))?;
                        format!("Wrote '{}' to {}", name, path.display())
                    }
                    None => record.document.to_json_string()?,
                }
            }
            StoreCommands::List => format_store_list(&store.list()?),
            StoreCommands::Delete { name } => {
                if !store.delete(name)? {
                    return Err(ApiError::DocumentNotFound(name.clone()).into());
                }
                format!("Deleted '{}'", name)
            }
        };
        store.flush()?;
        Ok(result)
    }

    fn open_store(&self) -> Result<SledSceneStore> {
        let path = self.store_path();
        std::fs::create_dir_all(&path)
            .with_context(|| format!("creating store directory {}", path.display()))?;
        debug!(store = %path.display(), "Opening scene store");
        Ok(SledSceneStore::new(&path)?)
    }

    /// Relative store paths are taken from the workspace root.
    fn store_path(&self) -> PathBuf {
        let path = &self.config.storage.store_path;
        if path.is_absolute() {
            path.clone()
        } else {
            self.workspace_root.join(path)
        }
    }

    fn read_document(&self, file: &Path) -> Result<SceneDocument> {
        SceneDocument::read_from(file).with_context(|| format!("reading {}", file.display()))
    }

    fn load_graph(&self, file: &Path) -> Result<SceneGraph> {
        let document = self.read_document(file)?;
        self.graph_from(&document)
            .with_context(|| format!("loading scene from {}", file.display()))
    }

    fn graph_from(&self, document: &SceneDocument) -> Result<SceneGraph, ApiError> {
        let graph = document.into_graph(
            self.config.defaults.root_defaults(),
            self.config.grid.constraints(),
        )?;
        info!(root = %graph.tree().root(), "Scene ready");
        Ok(graph)
    }
}
