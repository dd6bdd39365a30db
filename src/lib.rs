//! Ftree: Validated In-Memory File Tree
//!
//! An in-memory file tree of directory and file nodes organized by absolute
//! path, paired with an independent checker that verifies the structural
//! invariants of the tree at any quiescent point in time.

pub mod checker;
pub mod error;
pub mod logging;
pub mod tree;
