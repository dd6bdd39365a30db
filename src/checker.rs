//! Tree invariant checker
//!
//! A read-only verifier for the structural invariants of the file tree. It
//! observes nodes only through their public contract and never mutates the
//! tree, so it can be pointed at a tree built by arbitrary mutation code.
//! Checks short-circuit: the first violation found decides the verdict and
//! is the only one reported.
//!
//! Diagnostics are emitted through `tracing::error!`; the verdict itself is
//! the returned boolean.

use crate::error::NodeError;
use crate::tree::node::{Node, NodeType};
use crate::tree::path::TreePath;
use std::cmp::Ordering;
use tracing::error;

/// Verify every structural invariant of the tree rooted at `root`.
///
/// `initialized` and `claimed_count` are the façade's externally tracked
/// state: an uninitialized tree must claim zero nodes, and `claimed_count`
/// must equal the number of nodes actually reachable from `root`.
///
/// Intended to be called by the owning façade immediately after any
/// mutation, typically under `debug_assert!`.
pub fn is_valid(initialized: bool, root: Option<&Node>, claimed_count: usize) -> bool {
    if !initialized && claimed_count != 0 {
        error!(claimed_count, "tree is not initialized but count is not 0");
        return false;
    }

    let mut visited = 0usize;
    if let Some(root) = root {
        if !tree_check(root, &mut visited) {
            return false;
        }
    }

    if visited != claimed_count {
        error!(
            visited,
            claimed_count, "reachable node count does not match claimed count"
        );
        return false;
    }

    if let Some(root) = root {
        let mut seen: Vec<TreePath> = Vec::new();
        if !unique_paths(root, &mut seen) {
            return false;
        }
    }

    true
}

/// Invariants local to a single node: the parent link, when present, must
/// point at a node whose path is the immediate parent of this node's path.
fn node_is_valid(node: &Node) -> bool {
    if let Some(parent) = node.parent() {
        let node_path = node.path();
        let parent_path = parent.path();
        if parent_path.shared_prefix_depth(&node_path) != node_path.depth() - 1 {
            error!(
                parent = %parent_path,
                child = %node_path,
                "parent and child do not have parent-child paths"
            );
            return false;
        }
    }
    true
}

/// Pre-order structural walk. Visits every reachable node exactly once,
/// children in stored order, counting visits into `visited`. Any failure
/// aborts the walk.
fn tree_check(node: &Node, visited: &mut usize) -> bool {
    if !node_is_valid(node) {
        return false;
    }
    *visited += 1;

    if node.node_type() == NodeType::File {
        if node.child_count() != 0 {
            error!(node = %node, "file reports children");
            return false;
        }
        return true;
    }

    let count = node.child_count();

    // The reported count must be exact: retrieval at index == count fails
    // with NoSuchPath, and every index below it succeeds.
    match node.child_at(count) {
        Err(NodeError::NoSuchPath(_)) => {}
        Ok(_) => {
            error!(node = %node, count, "child_count claims fewer children than child_at returns");
            return false;
        }
        Err(err) => {
            error!(node = %node, %err, "child probe at reported count failed unexpectedly");
            return false;
        }
    }

    let mut previous: Option<Node> = None;
    for index in 0..count {
        let child = match node.child_at(index) {
            Ok(child) => child,
            Err(err) => {
                error!(
                    node = %node,
                    index,
                    %err,
                    "child_count claims more children than child_at returns"
                );
                return false;
            }
        };

        if let Some(previous) = &previous {
            if previous.compare(&child) != Ordering::Less {
                error!(
                    first = %previous,
                    second = %child,
                    "children are not in strictly ascending path order"
                );
                return false;
            }
        }

        if !tree_check(&child, visited) {
            return false;
        }
        previous = Some(child);
    }

    true
}

/// Global path uniqueness. A second pre-order walk, separate from
/// `tree_check` because uniqueness needs whole-tree context while the
/// structural checks are local to a node and its immediate children.
///
/// The linear scan over accumulated paths is quadratic; correctness, not
/// performance, is the contract here.
fn unique_paths(node: &Node, seen: &mut Vec<TreePath>) -> bool {
    let path = node.path();
    for earlier in seen.iter() {
        if *earlier == path {
            error!(%path, "identical paths are not allowed");
            return false;
        }
    }
    seen.push(path);

    for index in 0..node.child_count() {
        let child = match node.child_at(index) {
            Ok(child) => child,
            Err(err) => {
                error!(node = %node, index, %err, "child retrieval failed during uniqueness walk");
                return false;
            }
        };
        if !unique_paths(&child, seen) {
            return false;
        }
    }

    true
}
