//! Element paths: `/`-separated uids, grouped into `:`-separated parts.
//!
//! `app/card:card-root/title` has two parts, `[app, card]` and
//! `[card-root, title]`. The last uid identifies the element.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::tree::Node;

pub const PART_SEPARATOR: char = ':';
pub const UID_SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty element path")]
    Empty,
    #[error("element path '{0}' has an empty segment")]
    EmptySegment(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementPath {
    parts: Vec<Vec<String>>,
}

impl ElementPath {
    /// Build a path from parts; `None` if any part or uid is empty.
    pub fn from_parts(parts: Vec<Vec<String>>) -> Option<Self> {
        let valid = !parts.is_empty()
            && parts
                .iter()
                .all(|part| !part.is_empty() && part.iter().all(|uid| !uid.is_empty()));
        valid.then_some(Self { parts })
    }

    pub fn parts(&self) -> &[Vec<String>] {
        &self.parts
    }

    /// Uid of the element the path points at.
    pub fn to_uid(&self) -> &str {
        self.parts
            .last()
            .and_then(|part| part.last())
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Total number of uids across all parts.
    pub fn depth(&self) -> usize {
        self.parts.iter().map(Vec::len).sum()
    }
}

impl FromStr for ElementPath {
    type Err = PathError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        let parts = raw
            .split(PART_SEPARATOR)
            .map(|part| part.split(UID_SEPARATOR).map(str::to_string).collect())
            .collect();
        Self::from_parts(parts).ok_or_else(|| PathError::EmptySegment(raw.to_string()))
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .parts
            .iter()
            .map(|part| part.join(&UID_SEPARATOR.to_string()))
            .collect();
        f.write_str(&rendered.join(&PART_SEPARATOR.to_string()))
    }
}

/// Return the single-part path of uids from `root` down to `target_uid`,
/// following element, fragment and conditional children.
pub fn uid_path(root: &Node, target_uid: &str) -> Option<ElementPath> {
    let mut path = Vec::new();
    if uid_path_inner(root, target_uid, &mut path) {
        return ElementPath::from_parts(vec![path]);
    }
    None
}

fn uid_path_inner(node: &Node, target_uid: &str, path: &mut Vec<String>) -> bool {
    path.push(node.uid().to_string());
    if node.uid() == target_uid {
        return true;
    }
    let found = match node {
        Node::Element(element) => element
            .children
            .iter()
            .any(|child| uid_path_inner(child, target_uid, path)),
        Node::Fragment(fragment) => fragment
            .children
            .iter()
            .any(|child| uid_path_inner(child, target_uid, path)),
        Node::Conditional(conditional) => {
            uid_path_inner(&conditional.when_true, target_uid, path)
                || uid_path_inner(&conditional.when_false, target_uid, path)
        }
        _ => false,
    };
    if !found {
        path.pop();
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{element, fragment, text};

    #[test]
    fn parses_and_renders_multi_part_paths() {
        let path: ElementPath = "app/card:card-root/title".parse().expect("parse");
        assert_eq!(path.parts().len(), 2);
        assert_eq!(path.to_uid(), "title");
        assert_eq!(path.depth(), 4);
        assert_eq!(path.to_string(), "app/card:card-root/title");
    }

    #[test]
    fn rejects_empty_segments() {
        assert_eq!("".parse::<ElementPath>(), Err(PathError::Empty));
        assert!(matches!(
            "app//title".parse::<ElementPath>(),
            Err(PathError::EmptySegment(_))
        ));
        assert!("app:".parse::<ElementPath>().is_err());
    }

    #[test]
    fn uid_path_returns_root_for_root_uid() {
        let root = element("div", "root", Vec::new());
        assert_eq!(
            uid_path(&root, "root").map(|path| path.to_string()),
            Some("root".to_string())
        );
    }

    #[test]
    fn uid_path_walks_nested_children() {
        let root = element(
            "div",
            "root",
            vec![fragment("frg", vec![text("t1", "a"), text("t2", "b")])],
        );
        assert_eq!(
            uid_path(&root, "t2").map(|path| path.to_string()),
            Some("root/frg/t2".to_string())
        );
        assert!(uid_path(&root, "missing").is_none());
    }
}
