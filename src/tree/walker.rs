//! Tree walks: ancestor chains and pre-order descent

use crate::tree::SceneTree;
use crate::types::NodeKey;

/// Iterator over the strict ancestors of a node, nearest first.
pub struct Ancestors<'a> {
    tree: &'a SceneTree,
    current: Option<&'a NodeKey>,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(tree: &'a SceneTree, start: &NodeKey) -> Self {
        Self {
            tree,
            current: tree.parents.get(start),
        }
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a NodeKey;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.current?;
        self.current = self.tree.parents.get(key);
        Some(key)
    }
}

/// Pre-order walk of `start` and its descendants, with depth relative to `start`.
///
/// `descend` is asked for every node below `start`; returning false skips
/// that node and everything under it.
pub fn walk_from<F>(tree: &SceneTree, start: &NodeKey, mut descend: F) -> Vec<(NodeKey, usize)>
where
    F: FnMut(&NodeKey) -> bool,
{
    let mut visited = Vec::new();
    if !tree.contains(start) {
        return visited;
    }
    let mut stack = vec![(start.clone(), 0usize)];
    while let Some((key, depth)) = stack.pop() {
        if let Some(node) = tree.node(&key) {
            for child in node.children.iter().rev() {
                if descend(child) {
                    stack.push((child.clone(), depth + 1));
                }
            }
        }
        visited.push((key, depth));
    }
    visited
}

/// `start` and every descendant, pre-order.
pub fn descendants(tree: &SceneTree, start: &NodeKey) -> Vec<NodeKey> {
    walk_from(tree, start, |_| true)
        .into_iter()
        .map(|(key, _)| key)
        .collect()
}
