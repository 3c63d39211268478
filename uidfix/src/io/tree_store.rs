//! Load/save helpers for trees, used-id seeds and highlight bounds (JSON).

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::relocate::HighlightBoundsForUids;
use crate::tree::Node;

/// Load a node tree from a JSON file.
pub fn load_tree(path: &Path) -> Result<Node> {
    let tree: Node = load_json(path, "tree")?;
    debug!(path = %path.display(), root = tree.uid(), "tree loaded");
    Ok(tree)
}

/// Load the uids already in use elsewhere in the document (a JSON array).
pub fn load_used_ids(path: &Path) -> Result<HashSet<String>> {
    let ids: Vec<String> = load_json(path, "used ids")?;
    debug!(path = %path.display(), count = ids.len(), "used ids loaded");
    Ok(ids.into_iter().collect())
}

/// Load highlight bounds keyed by uid.
pub fn load_highlight_bounds(path: &Path) -> Result<HighlightBoundsForUids> {
    load_json(path, "highlight bounds")
}

/// Write tree to disk as pretty-printed JSON with a trailing newline.
pub fn write_tree(path: &Path, tree: &Node) -> Result<()> {
    write_json(path, tree).with_context(|| format!("write tree {}", path.display()))
}

/// Serialize `value` to pretty-printed JSON with trailing newline.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(value).context("serialize json")?;
    buf.push('\n');
    fs::write(path, buf).with_context(|| format!("write {}", path.display()))
}

fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read {} {}", what, path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {} {}", what, path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{element, text};

    /// Verifies write → load round-trip preserves tree structure.
    #[test]
    fn load_and_write_tree_round_trip() {
        let temp = tempfile::tempdir().expect("tempdir");
        let tree_path = temp.path().join("tree.json");
        let tree = element("div", "root", vec![text("t1", "hello")]);

        write_tree(&tree_path, &tree).expect("write tree");
        let loaded = load_tree(&tree_path).expect("load tree");
        assert_eq!(loaded, tree);
    }

    #[test]
    fn used_ids_load_from_array() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("used.json");
        fs::write(&path, r#"["aaa", "bbb", "aaa"]"#).expect("write");
        let ids = load_used_ids(&path).expect("load");
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("bbb"));
    }

    #[test]
    fn parse_errors_name_the_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("broken.json");
        fs::write(&path, "{").expect("write");
        let err = load_tree(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parse tree"));
    }
}
