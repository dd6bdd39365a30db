//! File tree façade
//!
//! Owns the root node and the externally tracked node count, and performs
//! the path-level mutations (insert, remove, set-contents). Every mutation
//! is bracketed by the invariant checker in debug builds, so a buggy
//! mutation is caught at the operation that introduced it.

use crate::checker;
use crate::error::NodeError;
use crate::tree::node::{Node, NodeType};
use crate::tree::path::TreePath;
use std::fmt;
use tracing::debug;

/// A validated file tree of directories and files.
#[derive(Debug, Default)]
pub struct FileTree {
    root: Option<Node>,
    count: usize,
}

impl FileTree {
    /// Create an empty, initialized tree.
    pub fn new() -> Self {
        Self {
            root: None,
            count: 0,
        }
    }

    /// The root node, if any node has been inserted.
    pub fn root(&self) -> Option<Node> {
        self.root.clone()
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.count
    }

    /// True iff the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Insert a directory at `path`, allocating intermediate directories as
    /// needed.
    pub fn insert_dir(&mut self, path: &str) -> Result<(), NodeError> {
        let path = TreePath::new(path)?;
        self.insert(path, NodeType::Directory, None)
    }

    /// Insert a file with `contents` at `path`, allocating intermediate
    /// directories as needed. The tree root must be a directory, so a
    /// depth-1 file insert fails with `NotADirectory`.
    pub fn insert_file(&mut self, path: &str, contents: Vec<u8>) -> Result<(), NodeError> {
        let path = TreePath::new(path)?;
        self.insert(path, NodeType::File, Some(contents))
    }

    /// True iff a node with exactly `path` is in the tree. Malformed paths
    /// are simply not present.
    pub fn contains(&self, path: &str) -> bool {
        TreePath::new(path)
            .ok()
            .and_then(|path| self.find_node(&path))
            .is_some()
    }

    /// The node at `path`, if present.
    pub fn find(&self, path: &str) -> Option<Node> {
        self.find_node(&TreePath::new(path).ok()?)
    }

    /// Remove the node at `path` and its whole subtree, returning how many
    /// nodes were removed. Fails with `NoSuchPath` if `path` is not in the
    /// tree.
    pub fn remove(&mut self, path: &str) -> Result<usize, NodeError> {
        let path = TreePath::new(path)?;
        debug_assert!(checker::is_valid(true, self.root.as_ref(), self.count));

        let node = self
            .find_node(&path)
            .ok_or_else(|| NodeError::NoSuchPath(path.to_string()))?;

        match node.parent() {
            Some(parent) => {
                let (found, index) = parent.has_child(&path);
                debug_assert!(found);
                parent.unlink_child(index);
            }
            None => {
                self.root = None;
            }
        }

        let removed = node.destroy_subtree();
        self.count -= removed;
        debug!(path = %path, removed, "removed subtree");

        debug_assert!(checker::is_valid(true, self.root.as_ref(), self.count));
        Ok(removed)
    }

    /// Replace the contents of the file at `path`, returning the previous
    /// contents. Fails with `NoSuchPath` if absent and `NotAFile` if the
    /// node is a directory.
    pub fn set_file_contents(
        &mut self,
        path: &str,
        contents: Vec<u8>,
    ) -> Result<Vec<u8>, NodeError> {
        let path = TreePath::new(path)?;
        let node = self
            .find_node(&path)
            .ok_or_else(|| NodeError::NoSuchPath(path.to_string()))?;

        let previous = node
            .set_contents(contents)
            .ok_or_else(|| NodeError::NotAFile(path.to_string()))?;

        debug_assert!(checker::is_valid(true, self.root.as_ref(), self.count));
        Ok(previous)
    }

    fn insert(
        &mut self,
        path: TreePath,
        node_type: NodeType,
        contents: Option<Vec<u8>>,
    ) -> Result<(), NodeError> {
        debug_assert!(checker::is_valid(true, self.root.as_ref(), self.count));

        // Descend to the deepest existing ancestor of the new path.
        let mut parent: Option<Node> = None;
        let mut depth = 0;

        if let Some(root) = &self.root {
            if path.shared_prefix_depth(&root.path()) == 0 {
                return Err(NodeError::ConflictingPath {
                    parent: root.path().to_string(),
                    child: path.to_string(),
                });
            }

            let mut node = root.clone();
            depth = 1;
            while depth < path.depth() {
                let next = path.prefix(depth + 1);
                let (found, index) = node.has_child(&next);
                if !found {
                    break;
                }
                node = node.child_at(index)?;
                depth += 1;
            }

            if depth == path.depth() {
                return Err(NodeError::AlreadyExists(path.to_string()));
            }
            if node.node_type() == NodeType::File {
                return Err(NodeError::NotADirectory(node.to_string()));
            }
            parent = Some(node);
        }

        // Create intermediate directories, then the requested leaf.
        let mut contents = contents;
        let mut first_new: Option<Node> = None;
        let mut created = 0usize;

        while depth < path.depth() {
            let sub_path = path.prefix(depth + 1);
            let is_leaf = depth + 1 == path.depth();
            let result = Node::new(
                sub_path,
                parent.as_ref(),
                if is_leaf { node_type } else { NodeType::Directory },
                if is_leaf { contents.take() } else { None },
            );

            match result {
                Ok(node) => {
                    if first_new.is_none() {
                        first_new = Some(node.clone());
                    }
                    parent = Some(node);
                    created += 1;
                    depth += 1;
                }
                Err(err) => {
                    // Unwind any intermediates created before the failure so
                    // the tree is left exactly as it was.
                    if let Some(first) = first_new {
                        if let Some(grandparent) = first.parent() {
                            let (found, index) = grandparent.has_child(&first.path());
                            if found {
                                grandparent.unlink_child(index);
                            }
                        }
                        first.destroy_subtree();
                    }
                    return Err(err);
                }
            }
        }

        if self.root.is_none() {
            self.root = first_new;
        }
        self.count += created;
        debug!(path = %path, created, "inserted path");

        debug_assert!(checker::is_valid(true, self.root.as_ref(), self.count));
        Ok(())
    }

    fn find_node(&self, path: &TreePath) -> Option<Node> {
        let root = self.root.as_ref()?;
        if root.path() != path.prefix(1) {
            return None;
        }

        let mut node = root.clone();
        for depth in 1..path.depth() {
            let next = path.prefix(depth + 1);
            let (found, index) = node.has_child(&next);
            if !found {
                return None;
            }
            node = node.child_at(index).ok()?;
        }
        Some(node)
    }

    fn render(node: &Node, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(out, "{}", node)?;
        for index in 0..node.child_count() {
            if let Ok(child) = node.child_at(index) {
                Self::render(&child, out)?;
            }
        }
        Ok(())
    }
}

/// Pre-order rendering, one absolute path per line.
impl fmt::Display for FileTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => Self::render(root, f),
            None => Ok(()),
        }
    }
}
