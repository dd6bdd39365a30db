//! File tree core
//!
//! A validated hierarchical tree of directory and file nodes organized by
//! absolute path. Each node carries its full path; a directory keeps its
//! children in ascending path order as a load-bearing invariant.

pub mod file_tree;
pub mod node;
pub mod path;
