//! Strata: Hierarchical Scene Graphs
//!
//! A scene is a tree of layout containers and panels. Each node can define
//! context slots (time range, data provider, editor) locally or inherit them
//! from the nearest ancestor; containers arrange their children on a grid.
//! Mutations are validated before they touch the tree, and resolved bindings
//! are cached until something on their inheritance path changes.

pub mod binding;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod persistence;
pub mod slot;
pub mod snapshot;
pub mod store;
pub mod tree;
pub mod types;

pub use error::{ApiError, SceneError};
pub use graph::{Mutation, MutationOutcome, SceneGraph, SharedSceneGraph};
pub use persistence::SceneDocument;
pub use types::{NodeKey, SlotKind, SlotValue};
