//! Property-based tests for tree invariants
//!
//! Trees built through the façade from arbitrary insert sequences must
//! always satisfy the checker, and the per-node structural properties must
//! hold for every reachable node.

use ftree::checker;
use ftree::error::NodeError;
use ftree::tree::file_tree::FileTree;
use ftree::tree::node::{Node, NodeType};
use proptest::prelude::*;

const COMPONENTS: &[&str] = &["a", "b", "c"];

/// Strategy: a sequence of inserts, each a short path over a 3-letter
/// component alphabet plus a directory/file choice. The small alphabet
/// forces collisions, shared prefixes, and file-in-the-way conflicts.
fn insert_sequence() -> impl Strategy<Value = Vec<(String, bool)>> {
    prop::collection::vec(
        (
            prop::collection::vec(0usize..COMPONENTS.len(), 1..4)
                .prop_map(|ids| {
                    let parts: Vec<&str> = ids.iter().map(|&i| COMPONENTS[i]).collect();
                    format!("/{}", parts.join("/"))
                }),
            any::<bool>(),
        ),
        0..24,
    )
}

fn build_tree(inserts: &[(String, bool)]) -> FileTree {
    let mut tree = FileTree::new();
    for (path, is_dir) in inserts {
        // Rejected inserts are fine; they must just leave the tree intact.
        let _ = if *is_dir {
            tree.insert_dir(path)
        } else {
            tree.insert_file(path, path.as_bytes().to_vec())
        };
    }
    tree
}

fn visit_all(node: &Node, out: &mut Vec<Node>) {
    out.push(node.clone());
    for index in 0..node.child_count() {
        let child = node.child_at(index).unwrap();
        visit_all(&child, out);
    }
}

fn subtree_size(node: &Node) -> usize {
    let mut nodes = Vec::new();
    visit_all(node, &mut nodes);
    nodes.len()
}

/// Any tree built through the façade passes the checker with the façade's
/// own count.
#[test]
fn test_built_trees_always_pass_checker() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&insert_sequence(), |inserts| {
            let tree = build_tree(&inserts);
            prop_assert!(checker::is_valid(true, tree.root().as_ref(), tree.len()));
            Ok(())
        })
        .unwrap();
}

/// Every non-root node's parent path is the immediate parent of its own
/// path, and every directory's boundary probe fails with NoSuchPath.
#[test]
fn test_structural_properties_hold_for_every_node() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&insert_sequence(), |inserts| {
            let tree = build_tree(&inserts);
            let mut nodes = Vec::new();
            if let Some(root) = tree.root() {
                visit_all(&root, &mut nodes);
            }
            prop_assert_eq!(nodes.len(), tree.len());

            for node in &nodes {
                if let Some(parent) = node.parent() {
                    let node_path = node.path();
                    let parent_path = parent.path();
                    prop_assert_eq!(
                        parent_path.shared_prefix_depth(&node_path),
                        node_path.depth() - 1
                    );
                }
                if node.node_type() == NodeType::Directory {
                    prop_assert!(matches!(
                        node.child_at(node.child_count()),
                        Err(NodeError::NoSuchPath(_))
                    ));
                    for index in 1..node.child_count() {
                        let left = node.child_at(index - 1).unwrap();
                        let right = node.child_at(index).unwrap();
                        prop_assert!(left.compare(&right) == std::cmp::Ordering::Less);
                    }
                } else {
                    prop_assert_eq!(node.child_count(), 0);
                }
            }
            Ok(())
        })
        .unwrap();
}

/// Removing any present path returns exactly the subtree's node count and
/// leaves a consistent tree without that entry.
#[test]
fn test_remove_roundtrip_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(insert_sequence(), insert_sequence()),
            |(inserts, probes)| {
                let mut tree = build_tree(&inserts);

                for (path, _) in &probes {
                    match tree.find(path) {
                        Some(node) => {
                            let expected = subtree_size(&node);
                            let removed = tree.remove(path).unwrap();
                            prop_assert_eq!(removed, expected);
                            prop_assert!(!tree.contains(path));
                        }
                        None => {
                            prop_assert!(matches!(
                                tree.remove(path),
                                Err(NodeError::NoSuchPath(_))
                            ));
                        }
                    }
                    prop_assert!(checker::is_valid(true, tree.root().as_ref(), tree.len()));
                }
                Ok(())
            },
        )
        .unwrap();
}
