//! Scene Tree
//!
//! The node hierarchy of a scene: an arena of attached nodes, detached
//! subtrees produced by the builder or by removal, and the walks over them.

pub mod arena;
pub mod builder;
pub mod node;
pub mod walker;

pub use arena::SceneTree;
pub use builder::{NodeBuilder, Subtree};
pub use node::{NodeKind, NodeState, SceneNode};
