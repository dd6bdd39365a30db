//! Tree node representation and linkage

use crate::error::NodeError;
use crate::tree::path::TreePath;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::{Rc, Weak};

/// Node type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Directory,
    File,
}

/// Directory-only and file-only state, mutually exclusive by construction.
/// Children are kept in ascending path order.
#[derive(Debug)]
enum NodeKind {
    Directory { children: Vec<Node> },
    File { contents: Vec<u8> },
}

#[derive(Debug)]
struct NodeData {
    path: TreePath,
    parent: Weak<RefCell<NodeData>>,
    kind: NodeKind,
}

/// A vertex in the file tree, either a directory or a file.
///
/// `Node` is a cheap-clone handle: a parent directory exclusively owns its
/// children, while a child holds only a non-owning back-reference to its
/// parent. Destroying a subtree therefore cannot be kept alive or corrupted
/// by parent links in detached children.
#[derive(Debug, Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

impl Node {
    /// Create a new node with the given path, parent, and type, and link it
    /// into the parent's ordered child sequence.
    ///
    /// Fails with:
    /// * `ConflictingPath` if the parent's path is not a prefix of `path`
    /// * `InvalidPath` if the parent is absent but `path` has depth != 1, or
    ///   the parent's path is not the direct parent of `path`
    /// * `AlreadyExists` if the parent already has a child with this path
    /// * `NotAFile` if the type is `Directory` but contents were supplied
    /// * `NotADirectory` if the type is `File` and the node would be the tree
    ///   root, or the parent is a file
    pub fn new(
        path: TreePath,
        parent: Option<&Node>,
        node_type: NodeType,
        contents: Option<Vec<u8>>,
    ) -> Result<Node, NodeError> {
        match parent {
            Some(parent_node) => {
                let parent_path = parent_node.path();
                if !parent_path.is_prefix_of(&path) {
                    return Err(NodeError::ConflictingPath {
                        parent: parent_path.to_string(),
                        child: path.to_string(),
                    });
                }
                if parent_path.shared_prefix_depth(&path) != path.depth() - 1 {
                    return Err(NodeError::InvalidPath(format!(
                        "{} is not the direct parent of {}",
                        parent_path, path
                    )));
                }
                if parent_node.node_type() == NodeType::File {
                    return Err(NodeError::NotADirectory(parent_path.to_string()));
                }
                let (found, _) = parent_node.has_child(&path);
                if found {
                    return Err(NodeError::AlreadyExists(path.to_string()));
                }
            }
            None => {
                if path.depth() != 1 {
                    return Err(NodeError::InvalidPath(format!(
                        "{} has depth {} but no parent",
                        path,
                        path.depth()
                    )));
                }
                if node_type == NodeType::File {
                    return Err(NodeError::NotADirectory(path.to_string()));
                }
            }
        }

        if node_type == NodeType::Directory && contents.is_some() {
            return Err(NodeError::NotAFile(path.to_string()));
        }

        let kind = match node_type {
            NodeType::Directory => NodeKind::Directory {
                children: Vec::new(),
            },
            NodeType::File => NodeKind::File {
                contents: contents.unwrap_or_default(),
            },
        };

        let node = Node(Rc::new(RefCell::new(NodeData {
            path,
            parent: parent.map_or_else(Weak::new, |p| Rc::downgrade(&p.0)),
            kind,
        })));

        if let Some(parent_node) = parent {
            let (_, position) = parent_node.has_child(&node.path());
            parent_node.insert_child_at(position, node.clone());
        }

        Ok(node)
    }

    /// Destroy this node and all its descendants, returning the number of
    /// nodes destroyed. The incoming link from the parent, if any, must be
    /// removed by the caller first.
    pub fn destroy_subtree(self) -> usize {
        let children = match &mut self.0.borrow_mut().kind {
            NodeKind::Directory { children } => std::mem::take(children),
            NodeKind::File { .. } => Vec::new(),
        };

        let mut destroyed = 1;
        for child in children {
            destroyed += child.destroy_subtree();
        }
        destroyed
    }

    /// The node's absolute path.
    pub fn path(&self) -> TreePath {
        self.0.borrow().path.clone()
    }

    /// The parent node, or `None` if this is the root or the node has been
    /// detached.
    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().parent.upgrade().map(Node)
    }

    /// Directory or file.
    pub fn node_type(&self) -> NodeType {
        match self.0.borrow().kind {
            NodeKind::Directory { .. } => NodeType::Directory,
            NodeKind::File { .. } => NodeType::File,
        }
    }

    /// Number of children. Files report zero.
    pub fn child_count(&self) -> usize {
        match &self.0.borrow().kind {
            NodeKind::Directory { children } => children.len(),
            NodeKind::File { .. } => 0,
        }
    }

    /// Child at `index`, in stored (ascending path) order.
    ///
    /// Fails with `NoSuchPath` when `index` is out of range and
    /// `NotADirectory` when this node is a file.
    pub fn child_at(&self, index: usize) -> Result<Node, NodeError> {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Directory { children } => {
                children.get(index).cloned().ok_or_else(|| {
                    NodeError::NoSuchPath(format!("{} has no child at index {}", data.path, index))
                })
            }
            NodeKind::File { .. } => Err(NodeError::NotADirectory(data.path.to_string())),
        }
    }

    /// Whether this directory has a child with exactly `path`.
    ///
    /// Returns the child's index if found, otherwise the index at which a
    /// child with that path would be inserted to preserve order. Files
    /// report `(false, 0)`.
    pub fn has_child(&self, path: &TreePath) -> (bool, usize) {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Directory { children } => {
                match children.binary_search_by(|child| child.path().cmp(path)) {
                    Ok(index) => (true, index),
                    Err(index) => (false, index),
                }
            }
            NodeKind::File { .. } => (false, 0),
        }
    }

    /// Lexicographic comparison by path; defines the sibling total order.
    pub fn compare(&self, other: &Node) -> Ordering {
        self.path().cmp(&other.path())
    }

    /// File contents, or `None` for a directory.
    pub fn contents(&self) -> Option<Vec<u8>> {
        match &self.0.borrow().kind {
            NodeKind::File { contents } => Some(contents.clone()),
            NodeKind::Directory { .. } => None,
        }
    }

    /// File content size in bytes, or `None` for a directory.
    pub fn content_size(&self) -> Option<usize> {
        match &self.0.borrow().kind {
            NodeKind::File { contents } => Some(contents.len()),
            NodeKind::Directory { .. } => None,
        }
    }

    /// Replace file contents, returning the previous contents. No effect and
    /// `None` on a directory.
    pub fn set_contents(&self, new_contents: Vec<u8>) -> Option<Vec<u8>> {
        match &mut self.0.borrow_mut().kind {
            NodeKind::File { contents } => Some(std::mem::replace(contents, new_contents)),
            NodeKind::Directory { .. } => None,
        }
    }

    /// True iff both handles refer to the same node.
    pub fn same_node(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn insert_child_at(&self, index: usize, child: Node) {
        if let NodeKind::Directory { children } = &mut self.0.borrow_mut().kind {
            children.insert(index, child);
        }
    }

    /// Remove the child at `index` from the ordered sequence without
    /// destroying it. Used by the tree façade before `destroy_subtree`.
    pub(crate) fn unlink_child(&self, index: usize) -> Option<Node> {
        match &mut self.0.borrow_mut().kind {
            NodeKind::Directory { children } if index < children.len() => {
                Some(children.remove(index))
            }
            _ => None,
        }
    }
}

/// Corruption hooks for checker tests. These bypass every construction-time
/// guarantee so the checker can be exercised against trees built by buggy
/// mutation code.
#[cfg(test)]
impl Node {
    pub(crate) fn new_detached(path: TreePath, node_type: NodeType) -> Node {
        let kind = match node_type {
            NodeType::Directory => NodeKind::Directory {
                children: Vec::new(),
            },
            NodeType::File => NodeKind::File {
                contents: Vec::new(),
            },
        };
        Node(Rc::new(RefCell::new(NodeData {
            path,
            parent: Weak::new(),
            kind,
        })))
    }

    pub(crate) fn swap_children(&self, a: usize, b: usize) {
        if let NodeKind::Directory { children } = &mut self.0.borrow_mut().kind {
            children.swap(a, b);
        }
    }

    pub(crate) fn push_child_unchecked(&self, child: Node) {
        if let NodeKind::Directory { children } = &mut self.0.borrow_mut().kind {
            children.push(child);
        }
    }

    pub(crate) fn set_parent_link(&self, parent: Option<&Node>) {
        self.0.borrow_mut().parent = parent.map_or_else(Weak::new, |p| Rc::downgrade(&p.0));
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.borrow().path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> TreePath {
        TreePath::new(s).unwrap()
    }

    fn root_dir(s: &str) -> Node {
        Node::new(path(s), None, NodeType::Directory, None).unwrap()
    }

    #[test]
    fn test_new_root_directory() {
        let root = root_dir("/a");
        assert_eq!(root.node_type(), NodeType::Directory);
        assert_eq!(root.path(), path("/a"));
        assert!(root.parent().is_none());
        assert_eq!(root.child_count(), 0);
    }

    #[test]
    fn test_new_root_file_rejected() {
        let result = Node::new(path("/a"), None, NodeType::File, None);
        assert!(matches!(result, Err(NodeError::NotADirectory(_))));
    }

    #[test]
    fn test_new_deep_path_without_parent_rejected() {
        let result = Node::new(path("/a/b"), None, NodeType::Directory, None);
        assert!(matches!(result, Err(NodeError::InvalidPath(_))));
    }

    #[test]
    fn test_new_child_links_into_parent() {
        let root = root_dir("/a");
        let child = Node::new(path("/a/b"), Some(&root), NodeType::File, None).unwrap();
        assert_eq!(root.child_count(), 1);
        assert!(root.child_at(0).unwrap().same_node(&child));
        assert!(child.parent().unwrap().same_node(&root));
    }

    #[test]
    fn test_new_rejects_non_prefix_parent() {
        let root = root_dir("/a");
        let result = Node::new(path("/x/y"), Some(&root), NodeType::Directory, None);
        assert!(matches!(result, Err(NodeError::ConflictingPath { .. })));
    }

    #[test]
    fn test_new_rejects_grandparent_as_parent() {
        let root = root_dir("/a");
        let result = Node::new(path("/a/b/c"), Some(&root), NodeType::Directory, None);
        assert!(matches!(result, Err(NodeError::InvalidPath(_))));
    }

    #[test]
    fn test_new_rejects_duplicate_child() {
        let root = root_dir("/a");
        Node::new(path("/a/b"), Some(&root), NodeType::File, None).unwrap();
        let result = Node::new(path("/a/b"), Some(&root), NodeType::File, None);
        assert!(matches!(result, Err(NodeError::AlreadyExists(_))));
    }

    #[test]
    fn test_new_rejects_directory_with_contents() {
        let root = root_dir("/a");
        let result = Node::new(
            path("/a/b"),
            Some(&root),
            NodeType::Directory,
            Some(b"data".to_vec()),
        );
        assert!(matches!(result, Err(NodeError::NotAFile(_))));
    }

    #[test]
    fn test_new_rejects_file_parent() {
        let root = root_dir("/a");
        let file = Node::new(path("/a/b"), Some(&root), NodeType::File, None).unwrap();
        let result = Node::new(path("/a/b/c"), Some(&file), NodeType::File, None);
        assert!(matches!(result, Err(NodeError::NotADirectory(_))));
    }

    #[test]
    fn test_children_kept_in_ascending_path_order() {
        let root = root_dir("/a");
        Node::new(path("/a/c"), Some(&root), NodeType::Directory, None).unwrap();
        Node::new(path("/a/b"), Some(&root), NodeType::File, None).unwrap();
        Node::new(path("/a/d"), Some(&root), NodeType::File, None).unwrap();

        assert_eq!(root.child_at(0).unwrap().path(), path("/a/b"));
        assert_eq!(root.child_at(1).unwrap().path(), path("/a/c"));
        assert_eq!(root.child_at(2).unwrap().path(), path("/a/d"));
    }

    #[test]
    fn test_has_child_reports_insertion_point() {
        let root = root_dir("/a");
        Node::new(path("/a/b"), Some(&root), NodeType::File, None).unwrap();
        Node::new(path("/a/d"), Some(&root), NodeType::File, None).unwrap();

        assert_eq!(root.has_child(&path("/a/b")), (true, 0));
        assert_eq!(root.has_child(&path("/a/c")), (false, 1));
        assert_eq!(root.has_child(&path("/a/e")), (false, 2));
    }

    #[test]
    fn test_child_at_out_of_range_is_no_such_path() {
        let root = root_dir("/a");
        Node::new(path("/a/b"), Some(&root), NodeType::File, None).unwrap();
        assert!(matches!(root.child_at(1), Err(NodeError::NoSuchPath(_))));
    }

    #[test]
    fn test_child_at_on_file_is_not_a_directory() {
        let root = root_dir("/a");
        let file = Node::new(path("/a/b"), Some(&root), NodeType::File, None).unwrap();
        assert!(matches!(
            file.child_at(0),
            Err(NodeError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_contents_only_defined_for_files() {
        let root = root_dir("/a");
        let file = Node::new(
            path("/a/b"),
            Some(&root),
            NodeType::File,
            Some(b"hello".to_vec()),
        )
        .unwrap();

        assert_eq!(file.contents().unwrap(), b"hello");
        assert_eq!(file.content_size(), Some(5));
        assert_eq!(root.contents(), None);
        assert_eq!(root.content_size(), None);
    }

    #[test]
    fn test_set_contents_returns_previous() {
        let root = root_dir("/a");
        let file = Node::new(
            path("/a/b"),
            Some(&root),
            NodeType::File,
            Some(b"old".to_vec()),
        )
        .unwrap();

        let previous = file.set_contents(b"new".to_vec());
        assert_eq!(previous.unwrap(), b"old");
        assert_eq!(file.contents().unwrap(), b"new");

        assert_eq!(root.set_contents(b"x".to_vec()), None);
    }

    #[test]
    fn test_compare_orders_by_path() {
        let first = root_dir("/a");
        let second = root_dir("/b");
        assert_eq!(first.compare(&second), Ordering::Less);
        assert_eq!(second.compare(&first), Ordering::Greater);
        assert_eq!(first.compare(&first), Ordering::Equal);
    }

    #[test]
    fn test_destroy_subtree_counts_all_nodes() {
        let root = root_dir("/a");
        let dir = Node::new(path("/a/b"), Some(&root), NodeType::Directory, None).unwrap();
        Node::new(path("/a/b/c"), Some(&dir), NodeType::File, None).unwrap();
        Node::new(path("/a/b/d"), Some(&dir), NodeType::File, None).unwrap();

        let (found, index) = root.has_child(&path("/a/b"));
        assert!(found);
        let detached = root.unlink_child(index).unwrap();
        assert_eq!(detached.destroy_subtree(), 3);
        assert_eq!(root.child_count(), 0);
    }

    #[test]
    fn test_display_renders_path() {
        let root = root_dir("/a");
        assert_eq!(root.to_string(), "/a");
    }
}
