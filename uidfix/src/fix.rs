//! Orchestration for `uidfix fix`.

use std::borrow::Cow;
use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::core::FatalError;
use crate::core::generator::UidGenerator;
use crate::core::reconcile::{UidMappings, reconcile_generic};
use crate::core::relocate::{HighlightBoundsForUids, relocate};
use crate::io::tree_store::{load_highlight_bounds, load_tree, load_used_ids};
use crate::tree::Node;

/// Inputs for a file-based fix.
#[derive(Debug, Clone, Default)]
pub struct FixOptions {
    pub tree_path: PathBuf,
    /// JSON array of uids already claimed elsewhere in the document.
    pub used_ids_path: Option<PathBuf>,
    /// Highlight bounds to carry over to renamed uids.
    pub highlight_bounds_path: Option<PathBuf>,
}

/// Result of fixing one tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixReport {
    pub tree: Node,
    pub mappings: UidMappings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_bounds: Option<HighlightBoundsForUids>,
    /// False when the tree came back untouched.
    pub changed: bool,
}

/// Fix `tree` in memory, relocating `bounds` when given.
///
/// `used` is extended with every uid the fixed tree claims.
pub fn fix_tree(
    tree: &Node,
    used: &mut HashSet<String>,
    generator: &mut UidGenerator,
    bounds: Option<&HighlightBoundsForUids>,
) -> Result<FixReport, FatalError> {
    let result = reconcile_generic(tree, used, generator)?;
    let changed = matches!(result.value, Cow::Owned(_));
    let highlight_bounds = bounds.map(|bounds| relocate(bounds, &result.mappings));
    Ok(FixReport {
        tree: result.value.into_owned(),
        mappings: result.mappings,
        highlight_bounds,
        changed,
    })
}

/// Load inputs named by `options` and fix the tree.
pub fn fix_from_files(options: &FixOptions, generator: &mut UidGenerator) -> Result<FixReport> {
    let tree = load_tree(&options.tree_path)?;
    let mut used = match &options.used_ids_path {
        Some(path) => load_used_ids(path)?,
        None => HashSet::new(),
    };
    let bounds = options
        .highlight_bounds_path
        .as_deref()
        .map(load_highlight_bounds)
        .transpose()?;

    let report = fix_tree(&tree, &mut used, generator, bounds.as_ref())
        .with_context(|| format!("fix {}", options.tree_path.display()))?;
    info!(
        root = report.tree.uid(),
        mappings = report.mappings.len(),
        changed = report.changed,
        "tree fixed"
    );
    Ok(report)
}
