//! Uniqueness audit for `uidfix check`.

use std::path::Path;

use anyhow::Result;

use crate::core::invariants::find_duplicate_uids;
use crate::io::tree_store::load_tree;
use crate::tree::Node;

/// Structured check outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Every uid in the tree is distinct.
    Unique,
    /// One message per repeated uid occurrence.
    Duplicates(Vec<String>),
}

pub fn check_tree(tree: &Node) -> CheckOutcome {
    let errors = find_duplicate_uids(tree);
    if errors.is_empty() {
        CheckOutcome::Unique
    } else {
        CheckOutcome::Duplicates(errors)
    }
}

/// Load a tree from disk and audit it.
pub fn check_file(path: &Path) -> Result<CheckOutcome> {
    let tree = load_tree(path)?;
    Ok(check_tree(&tree))
}
