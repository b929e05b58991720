//! CLI parse: clap types for Strata. No behavior; definitions only.

use crate::types::SlotKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strata CLI - inspect, validate and store scene documents
#[derive(Debug, Parser)]
#[command(name = "strata")]
#[command(about = "Scene graphs with inherited time ranges, data providers and grid layout")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Shorthand for --log-level debug
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the demo scene document as JSON
    Demo {
        /// Build the standalone variant of the scene
        #[arg(long)]
        standalone: bool,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show every node with its placement and resolved bindings
    Show {
        /// Scene document (JSON)
        file: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Resolve one slot at one node
    Resolve {
        /// Scene document (JSON)
        file: PathBuf,
        /// Node key
        #[arg(long)]
        node: String,
        /// Slot kind (timeRange, dataProvider, editorController)
        #[arg(long)]
        slot: SlotKind,
    },
    /// Load a document and check every container's layout
    Validate {
        /// Scene document (JSON)
        file: PathBuf,
    },
    /// Print the document fingerprint
    Fingerprint {
        /// Scene document (JSON)
        file: PathBuf,
    },
    /// Named documents in the scene store
    Store {
        #[command(subcommand)]
        command: StoreCommands,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Subcommand)]
pub enum StoreCommands {
    /// Validate and store a document under a name
    Put {
        name: String,
        /// Scene document (JSON)
        file: PathBuf,
    },
    /// Print a stored document
    Get {
        name: String,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List stored documents
    List,
    /// Remove a stored document
    Delete { name: String },
}
