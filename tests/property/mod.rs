pub mod tree_invariants;
