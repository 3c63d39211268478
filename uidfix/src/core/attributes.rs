//! Element attribute lookups and path-based writes.
//!
//! A [`PropertyPath`] addresses an attribute entry by key and then descends
//! through object literals (`style.color`). Writes never mutate the input
//! list; they return a rewritten copy or an [`AttributeError`].

use std::fmt;

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::tree::{ArrayElement, Attribute, NestedObject, Node, NodeKind, Property};

/// Attribute carrying an element's redundant stable identifier.
pub const DATA_UID: &str = "data-uid";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("empty property path")]
    EmptyPath,
    #[error("no attribute at '{0}'")]
    NotFound(String),
    #[error("cannot descend into {kind} at '{path}'")]
    NotAnObject { path: String, kind: NodeKind },
    #[error("{0} is not a simple value")]
    NotSimple(NodeKind),
    #[error("spread cannot be converted to a simple value")]
    Spread,
    #[error("attribute values must be expressions, got {0}")]
    NotAnExpression(NodeKind),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    elements: Vec<String>,
}

impl PropertyPath {
    pub fn new<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elements: elements.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a `.`-separated path. Empty segments are dropped.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split('.').filter(|segment| !segment.is_empty()))
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.elements.join("."))
    }
}

pub fn data_uid_path() -> PropertyPath {
    PropertyPath::new([DATA_UID])
}

/// Value of the first entry with `key`. Spreads are skipped.
pub fn get_attribute<'a>(props: &'a [Attribute], key: &str) -> Option<&'a Node> {
    props.iter().find_map(|attribute| match attribute {
        Attribute::Entry {
            key: entry_key,
            value,
            ..
        } if entry_key == key => Some(value),
        _ => None,
    })
}

/// Resolve `path` against the attribute list, descending into object literals.
pub fn get_value_at_path<'a>(
    props: &'a [Attribute],
    path: &PropertyPath,
) -> Result<&'a Node, AttributeError> {
    let (first, rest) = path
        .elements()
        .split_first()
        .ok_or(AttributeError::EmptyPath)?;
    let mut current =
        get_attribute(props, first).ok_or_else(|| AttributeError::NotFound(path.to_string()))?;
    for (depth, key) in rest.iter().enumerate() {
        let Node::NestedObject(object) = current else {
            return Err(AttributeError::NotAnObject {
                path: path.elements()[..=depth].join("."),
                kind: current.kind(),
            });
        };
        current = object_property(object, key)
            .ok_or_else(|| AttributeError::NotFound(path.to_string()))?;
    }
    Ok(current)
}

/// Convert a literal-only expression into plain JSON.
///
/// Values, arrays and objects built from values are simple; spreads and any
/// code-bearing node are rejected.
pub fn simple_value(node: &Node) -> Result<JsonValue, AttributeError> {
    match node {
        Node::Value(value) => Ok(value.value.clone()),
        Node::NestedArray(array) => {
            let mut items = Vec::with_capacity(array.content.len());
            for element in &array.content {
                match element {
                    ArrayElement::Value { value } => items.push(simple_value(value)?),
                    ArrayElement::Spread { .. } => {
                        return Err(AttributeError::Spread);
                    }
                }
            }
            Ok(JsonValue::Array(items))
        }
        Node::NestedObject(object) => {
            let mut map = Map::new();
            for property in &object.content {
                match property {
                    Property::Assignment { key, value } => {
                        map.insert(key.clone(), simple_value(value)?);
                    }
                    Property::Spread { .. } => return Err(AttributeError::Spread),
                }
            }
            Ok(JsonValue::Object(map))
        }
        other => Err(AttributeError::NotSimple(other.kind())),
    }
}

/// Write `value` at `path`, returning the rewritten attribute list.
///
/// A top-level key replaces the first matching entry (keeping its comments)
/// or is appended. Deeper keys require an object literal at every step.
pub fn set_value_at_path(
    props: &[Attribute],
    path: &PropertyPath,
    value: Node,
) -> Result<Vec<Attribute>, AttributeError> {
    if !value.is_expression() {
        return Err(AttributeError::NotAnExpression(value.kind()));
    }
    let (first, rest) = path
        .elements()
        .split_first()
        .ok_or(AttributeError::EmptyPath)?;

    let new_value = if rest.is_empty() {
        value
    } else {
        match get_attribute(props, first) {
            Some(Node::NestedObject(object)) => {
                Node::NestedObject(set_in_object(object, rest, value, first)?)
            }
            Some(other) => {
                return Err(AttributeError::NotAnObject {
                    path: first.clone(),
                    kind: other.kind(),
                });
            }
            None => return Err(AttributeError::NotFound(first.clone())),
        }
    };

    let mut updated = props.to_vec();
    let existing = updated.iter_mut().find_map(|attribute| match attribute {
        Attribute::Entry { key, value, .. } if key == first => Some(value),
        _ => None,
    });
    match existing {
        Some(slot) => *slot = new_value,
        None => updated.push(Attribute::entry(first.clone(), new_value)),
    }
    Ok(updated)
}

fn object_property<'a>(object: &'a NestedObject, key: &str) -> Option<&'a Node> {
    object.content.iter().find_map(|property| match property {
        Property::Assignment {
            key: property_key,
            value,
        } if property_key == key => Some(value),
        _ => None,
    })
}

fn set_in_object(
    object: &NestedObject,
    keys: &[String],
    value: Node,
    prefix: &str,
) -> Result<NestedObject, AttributeError> {
    let Some((first, rest)) = keys.split_first() else {
        return Err(AttributeError::EmptyPath);
    };
    let path = format!("{}.{}", prefix, first);

    let new_value = if rest.is_empty() {
        value
    } else {
        match object_property(object, first) {
            Some(Node::NestedObject(inner)) => {
                Node::NestedObject(set_in_object(inner, rest, value, &path)?)
            }
            Some(other) => {
                return Err(AttributeError::NotAnObject {
                    path,
                    kind: other.kind(),
                });
            }
            None => return Err(AttributeError::NotFound(path)),
        }
    };

    let mut updated = object.clone();
    let existing = updated
        .content
        .iter_mut()
        .find_map(|property| match property {
            Property::Assignment { key, value } if key == first => Some(value),
            _ => None,
        });
    match existing {
        Some(slot) => *slot = new_value,
        None => updated.content.push(Property::Assignment {
            key: first.clone(),
            value: new_value,
        }),
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{identifier, object, value};
    use serde_json::json;

    #[test]
    fn get_attribute_returns_first_entry_and_skips_spreads() {
        let props = vec![
            Attribute::spread(identifier("s1", "rest")),
            Attribute::entry("title", value("v1", json!("first"))),
            Attribute::entry("title", value("v2", json!("second"))),
        ];
        assert_eq!(get_attribute(&props, "title").map(Node::uid), Some("v1"));
        assert!(get_attribute(&props, "missing").is_none());
    }

    #[test]
    fn get_value_at_path_descends_into_objects() {
        let props = vec![Attribute::entry(
            "style",
            object("o1", vec![("color", value("v1", json!("red")))]),
        )];
        let found =
            get_value_at_path(&props, &PropertyPath::parse("style.color")).expect("lookup");
        assert_eq!(found.uid(), "v1");
    }

    #[test]
    fn get_value_at_path_rejects_non_objects() {
        let props = vec![Attribute::entry("style", identifier("i1", "styles"))];
        let err = get_value_at_path(&props, &PropertyPath::parse("style.color")).unwrap_err();
        assert_eq!(
            err,
            AttributeError::NotAnObject {
                path: "style".to_string(),
                kind: NodeKind::Identifier,
            }
        );
    }

    #[test]
    fn simple_value_flattens_literals() {
        let node = object(
            "o1",
            vec![
                ("a", value("v1", json!(1))),
                ("b", value("v2", json!("two"))),
            ],
        );
        assert_eq!(simple_value(&node), Ok(json!({"a": 1, "b": "two"})));
        assert_eq!(
            simple_value(&identifier("i1", "x")),
            Err(AttributeError::NotSimple(NodeKind::Identifier))
        );
    }

    #[test]
    fn set_value_at_path_replaces_in_place_or_appends() {
        let props = vec![
            Attribute::entry(DATA_UID, value("v1", json!("old"))),
            Attribute::entry("title", value("v2", json!("t"))),
        ];
        let replaced =
            set_value_at_path(&props, &data_uid_path(), value("v3", json!("new"))).expect("set");
        assert_eq!(replaced.len(), 2);
        assert_eq!(get_attribute(&replaced, DATA_UID).map(Node::uid), Some("v3"));

        let appended = set_value_at_path(&[], &data_uid_path(), value("v4", json!("x")))
            .expect("append");
        assert_eq!(appended.len(), 1);
        assert_eq!(get_attribute(&appended, DATA_UID).map(Node::uid), Some("v4"));
    }

    #[test]
    fn set_value_at_path_rejects_writes_through_code() {
        let props = vec![Attribute::entry("style", identifier("i1", "styles"))];
        let err = set_value_at_path(
            &props,
            &PropertyPath::parse("style.color"),
            value("v1", json!("red")),
        )
        .unwrap_err();
        assert!(matches!(err, AttributeError::NotAnObject { .. }));
    }

    #[test]
    fn set_value_at_path_rewrites_nested_object() {
        let props = vec![Attribute::entry(
            "style",
            object("o1", vec![("color", value("v1", json!("red")))]),
        )];
        let updated = set_value_at_path(
            &props,
            &PropertyPath::parse("style.color"),
            value("v2", json!("blue")),
        )
        .expect("set nested");
        let found =
            get_value_at_path(&updated, &PropertyPath::parse("style.color")).expect("lookup");
        assert_eq!(simple_value(found), Ok(json!("blue")));
    }
}
