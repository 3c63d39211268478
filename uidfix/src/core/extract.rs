//! Recover a node's previously assigned uid.
//!
//! Lookup order: a `@utopia/uid=<value>` comment flag, then the `data-uid`
//! attribute. Failures are plain values so callers can try other strategies.

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::core::attributes::{AttributeError, data_uid_path, get_value_at_path, simple_value};
use crate::tree::{Attribute, Element, ElementLike, Node, ParsedComments};

/// Prefix of structured flags embedded in comments.
pub const COMMENT_FLAG_PREFIX: &str = "@utopia/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("unable to find or parse uid comment")]
    NoCommentFlag,
    #[error("unable to read data-uid: {0}")]
    Attribute(#[from] AttributeError),
    #[error("unexpected data-uid value {0}")]
    NotAString(String),
}

/// Find the value of the `@utopia/<key>=<value>` flag in `text`, if any.
pub fn parse_comment_flag<'t>(text: &'t str, key: &str) -> Option<&'t str> {
    text.split_whitespace().find_map(|token| {
        let flag = token.strip_prefix(COMMENT_FLAG_PREFIX)?;
        let (flag_key, value) = flag.split_once('=')?;
        (flag_key == key && !value.is_empty()).then_some(value)
    })
}

/// Read the uid flag from leading, then trailing, comments.
pub fn parse_uid_from_comments(comments: &ParsedComments) -> Result<String, ExtractError> {
    comments
        .iter()
        .find_map(|comment| parse_comment_flag(&comment.text, "uid"))
        .map(str::to_string)
        .ok_or(ExtractError::NoCommentFlag)
}

/// Recover the uid from comments, falling back to the `data-uid` attribute.
pub fn parse_uid(
    attributes: &[Attribute],
    comments: &ParsedComments,
) -> Result<String, ExtractError> {
    if let Ok(uid) = parse_uid_from_comments(comments) {
        return Ok(uid);
    }

    let node = get_value_at_path(attributes, &data_uid_path())?;
    match simple_value(node)? {
        JsonValue::String(uid) => Ok(uid),
        other => Err(ExtractError::NotAString(other.to_string())),
    }
}

/// Recover the stable uid of the node in `root` currently carrying `uid`.
///
/// Elements are read through their attributes, other kinds through their
/// comments. `None` if no node carries `uid`.
pub fn stable_uid_of(root: &Node, uid: &str) -> Option<Result<String, ExtractError>> {
    if root.uid() == uid {
        return Some(parse_node_uid(root));
    }
    match root {
        Node::Element(element) => find_in_element(element, uid),
        Node::Fragment(fragment) => find_in(&fragment.children, uid),
        Node::Conditional(conditional) => stable_uid_of(&conditional.condition, uid)
            .or_else(|| stable_uid_of(&conditional.when_true, uid))
            .or_else(|| stable_uid_of(&conditional.when_false, uid)),
        Node::NestedArray(array) => array
            .content
            .iter()
            .find_map(|element| stable_uid_of(element.value(), uid)),
        Node::NestedObject(object) => object
            .content
            .iter()
            .find_map(|property| stable_uid_of(property.value(), uid)),
        Node::FunctionCall(call) => find_in(&call.parameters, uid),
        Node::MapExpression(map) => stable_uid_of(&map.value_to_map, uid)
            .or_else(|| stable_uid_of(&map.map_function, uid)),
        Node::OtherJavaScript(code) => {
            code.elements_within
                .values()
                .find_map(|element| match element {
                    ElementLike::Element(inner) if inner.uid == uid => {
                        Some(parse_uid(&inner.props, &ParsedComments::default()))
                    }
                    ElementLike::Element(inner) => find_in_element(inner, uid),
                    ElementLike::Fragment(inner) if inner.uid == uid => {
                        Some(parse_uid(&[], &ParsedComments::default()))
                    }
                    ElementLike::Fragment(inner) => find_in(&inner.children, uid),
                })
        }
        Node::PropertyAccess(access) => stable_uid_of(&access.on_value, uid),
        Node::ElementAccess(access) => stable_uid_of(&access.on_value, uid)
            .or_else(|| stable_uid_of(&access.element, uid)),
        Node::TextBlock(_) | Node::Value(_) | Node::Identifier(_) => None,
    }
}

fn parse_node_uid(node: &Node) -> Result<String, ExtractError> {
    let none = ParsedComments::default();
    let comments = node.comments().unwrap_or(&none);
    match node {
        Node::Element(element) => parse_uid(&element.props, comments),
        _ => parse_uid(&[], comments),
    }
}

fn find_in_element(element: &Element, uid: &str) -> Option<Result<String, ExtractError>> {
    element
        .props
        .iter()
        .map(|attribute| match attribute {
            Attribute::Entry { value, .. } => value,
            Attribute::Spread { spread_value, .. } => spread_value,
        })
        .chain(&element.children)
        .find_map(|node| stable_uid_of(node, uid))
}

fn find_in(nodes: &[Node], uid: &str) -> Option<Result<String, ExtractError>> {
    nodes.iter().find_map(|node| stable_uid_of(node, uid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attributes::DATA_UID;
    use crate::test_support::{
        bare_element, data_uid_attribute, element, fragment, function_call, identifier, text,
        value,
    };
    use crate::tree::{Comment, ExpressionValue, NodeKind};
    use serde_json::json;

    fn to_comments(texts: &[&str]) -> Vec<Comment> {
        texts
            .iter()
            .map(|text| Comment {
                text: text.to_string(),
                trailing_newline: false,
            })
            .collect()
    }

    fn comments(leading: &[&str], trailing: &[&str]) -> ParsedComments {
        ParsedComments {
            leading_comments: to_comments(leading),
            trailing_comments: to_comments(trailing),
        }
    }

    #[test]
    fn comment_flag_takes_precedence() {
        let attrs = vec![data_uid_attribute("from-attr")];
        let parsed = parse_uid(&attrs, &comments(&["* @utopia/uid=from-comment "], &[]));
        assert_eq!(parsed, Ok("from-comment".to_string()));
    }

    #[test]
    fn trailing_comments_are_searched() {
        let parsed = parse_uid_from_comments(&comments(&["unrelated"], &["@utopia/uid=abc"]));
        assert_eq!(parsed, Ok("abc".to_string()));
    }

    #[test]
    fn other_flags_and_empty_values_are_ignored() {
        assert_eq!(parse_comment_flag("@utopia/name=x @utopia/uid=", "uid"), None);
        assert_eq!(parse_comment_flag("@utopia/name=x", "name"), Some("x"));
    }

    #[test]
    fn falls_back_to_data_uid_attribute() {
        let attrs = vec![data_uid_attribute("abc")];
        assert_eq!(
            parse_uid(&attrs, &ParsedComments::default()),
            Ok("abc".to_string())
        );
    }

    #[test]
    fn missing_attribute_is_reported() {
        let parsed = parse_uid(&[], &ParsedComments::default());
        assert_eq!(
            parsed,
            Err(ExtractError::Attribute(AttributeError::NotFound(
                DATA_UID.to_string()
            )))
        );
    }

    #[test]
    fn non_string_values_are_rejected() {
        let attrs = vec![Attribute::entry(DATA_UID, value("v1", json!(42)))];
        assert_eq!(
            parse_uid(&attrs, &ParsedComments::default()),
            Err(ExtractError::NotAString("42".to_string()))
        );

        let attrs = vec![Attribute::entry(DATA_UID, identifier("i1", "uid"))];
        assert_eq!(
            parse_uid(&attrs, &ParsedComments::default()),
            Err(ExtractError::Attribute(AttributeError::NotSimple(
                NodeKind::Identifier
            )))
        );
    }

    #[test]
    fn stable_uid_of_finds_nested_elements() {
        let inner = bare_element("span", "now", vec![data_uid_attribute("before")], Vec::new());
        let root = element("div", "root", vec![fragment("frg", vec![inner])]);

        assert_eq!(
            stable_uid_of(&root, "now"),
            Some(Ok("before".to_string()))
        );
        assert_eq!(stable_uid_of(&root, "root"), Some(Ok("root".to_string())));
        assert_eq!(stable_uid_of(&root, "missing"), None);
    }

    #[test]
    fn stable_uid_of_reads_expression_comments() {
        let mut flagged = ExpressionValue::new(json!(1), "v1");
        flagged.comments = comments(&["@utopia/uid=kept"], &[]);
        let root = function_call("call", "f", vec![Node::Value(flagged)]);

        assert_eq!(stable_uid_of(&root, "v1"), Some(Ok("kept".to_string())));
        assert!(matches!(
            stable_uid_of(&root, "call"),
            Some(Err(ExtractError::Attribute(AttributeError::NotFound(_))))
        ));
    }

    #[test]
    fn unflagged_leaves_report_an_error() {
        let root = fragment("frg", vec![text("t1", "a")]);
        assert!(matches!(stable_uid_of(&root, "t1"), Some(Err(_))));
    }
}
