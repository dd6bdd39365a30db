//! Absolute path value type for tree nodes

use crate::error::NodeError;
use std::fmt;

/// An absolute, slash-delimited path identifying a node's location.
///
/// Immutable once constructed. Ordering is lexicographic by component
/// sequence and defines the total order used for sibling ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreePath {
    components: Vec<String>,
}

impl TreePath {
    /// Parse a slash-delimited path. A single leading `/` is accepted and
    /// ignored. Fails with `InvalidPath` on empty input or empty components.
    pub fn new(path: &str) -> Result<Self, NodeError> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        if trimmed.is_empty() {
            return Err(NodeError::InvalidPath(format!(
                "path has no components: {:?}",
                path
            )));
        }

        let mut components = Vec::new();
        for part in trimmed.split('/') {
            if part.is_empty() {
                return Err(NodeError::InvalidPath(format!(
                    "empty component in path: {:?}",
                    path
                )));
            }
            components.push(part.to_string());
        }

        Ok(Self { components })
    }

    /// Number of components. Always at least 1 for a constructed path.
    pub fn depth(&self) -> usize {
        self.components.len()
    }

    /// Component at the given depth index, if in range.
    pub fn component(&self, index: usize) -> Option<&str> {
        self.components.get(index).map(|c| c.as_str())
    }

    /// All components in order.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Number of leading components this path has in common with `other`.
    pub fn shared_prefix_depth(&self, other: &TreePath) -> usize {
        self.components
            .iter()
            .zip(other.components.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// True iff every component of `self` is a leading component of `other`.
    /// A path is a prefix of itself.
    pub fn is_prefix_of(&self, other: &TreePath) -> bool {
        self.shared_prefix_depth(other) == self.depth()
    }

    /// The leading `depth` components as a new path. `depth` is clamped to
    /// the full depth; a value of 0 is clamped to 1.
    pub fn prefix(&self, depth: usize) -> TreePath {
        let depth = depth.clamp(1, self.components.len());
        TreePath {
            components: self.components[..depth].to_vec(),
        }
    }

    /// All but the last component, or `None` for a depth-1 path.
    pub fn parent(&self) -> Option<TreePath> {
        if self.depth() > 1 {
            Some(self.prefix(self.depth() - 1))
        } else {
            None
        }
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.components.join("/"))
    }
}
