//! Node tree model shared by the reconciler, extractor and tree store.
//!
//! Every node kind carries its own `uid`. The tree is serialized as internally
//! tagged JSON (`{"type": "ELEMENT", ...}`) with camelCase field names.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Node {
    Element(Element),
    Fragment(Fragment),
    #[serde(rename = "CONDITIONAL_EXPRESSION")]
    Conditional(Conditional),
    TextBlock(TextBlock),
    Value(ExpressionValue),
    NestedArray(NestedArray),
    NestedObject(NestedObject),
    FunctionCall(FunctionCall),
    MapExpression(MapExpression),
    #[serde(rename = "OTHER_JAVASCRIPT")]
    OtherJavaScript(OtherJavaScript),
    Identifier(Identifier),
    PropertyAccess(PropertyAccess),
    ElementAccess(ElementAccess),
}

/// Discriminant of a [`Node`], used for kind-preservation checks and messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Fragment,
    Conditional,
    TextBlock,
    Value,
    NestedArray,
    NestedObject,
    FunctionCall,
    MapExpression,
    OtherJavaScript,
    Identifier,
    PropertyAccess,
    ElementAccess,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Element => "element",
            NodeKind::Fragment => "fragment",
            NodeKind::Conditional => "conditional",
            NodeKind::TextBlock => "text block",
            NodeKind::Value => "value",
            NodeKind::NestedArray => "nested array",
            NodeKind::NestedObject => "nested object",
            NodeKind::FunctionCall => "function call",
            NodeKind::MapExpression => "map expression",
            NodeKind::OtherJavaScript => "other javascript",
            NodeKind::Identifier => "identifier",
            NodeKind::PropertyAccess => "property access",
            NodeKind::ElementAccess => "element access",
        }
    }

    /// True for kinds that may appear where an expression is expected
    /// (attribute values, call parameters, conditions).
    pub fn is_expression(self) -> bool {
        !matches!(
            self,
            NodeKind::Fragment | NodeKind::Conditional | NodeKind::TextBlock
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub text: String,
    #[serde(default)]
    pub trailing_newline: bool,
}

/// Comments attached before and after a node in the source.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ParsedComments {
    pub leading_comments: Vec<Comment>,
    pub trailing_comments: Vec<Comment>,
}

impl ParsedComments {
    pub fn is_empty(&self) -> bool {
        self.leading_comments.is_empty() && self.trailing_comments.is_empty()
    }

    /// Leading comments first, then trailing ones.
    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.leading_comments
            .iter()
            .chain(self.trailing_comments.iter())
    }
}

/// Entry in an element's attribute list.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Attribute {
    Entry {
        key: String,
        value: Node,
        #[serde(default, skip_serializing_if = "ParsedComments::is_empty")]
        comments: ParsedComments,
    },
    Spread {
        spread_value: Node,
        #[serde(default, skip_serializing_if = "ParsedComments::is_empty")]
        comments: ParsedComments,
    },
}

impl Attribute {
    pub fn entry(key: impl Into<String>, value: Node) -> Self {
        Attribute::Entry {
            key: key.into(),
            value,
            comments: ParsedComments::default(),
        }
    }

    pub fn spread(spread_value: Node) -> Self {
        Attribute::Spread {
            spread_value,
            comments: ParsedComments::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub name: String,
    pub uid: String,
    #[serde(default)]
    pub props: Vec<Attribute>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub uid: String,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default)]
    pub long_form: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conditional {
    pub uid: String,
    pub condition: Box<Node>,
    #[serde(default)]
    pub original_condition_string: String,
    pub when_true: Box<Node>,
    pub when_false: Box<Node>,
    #[serde(default, skip_serializing_if = "ParsedComments::is_empty")]
    pub comments: ParsedComments,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub uid: String,
    pub text: String,
}

/// A literal value. The `value` is an arbitrary JSON literal.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionValue {
    pub uid: String,
    pub value: JsonValue,
    #[serde(default, skip_serializing_if = "ParsedComments::is_empty")]
    pub comments: ParsedComments,
}

impl ExpressionValue {
    pub fn new(value: impl Into<JsonValue>, uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            value: value.into(),
            comments: ParsedComments::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArrayElement {
    Value { value: Node },
    Spread { value: Node },
}

impl ArrayElement {
    pub fn value(&self) -> &Node {
        match self {
            ArrayElement::Value { value } | ArrayElement::Spread { value } => value,
        }
    }

    pub(crate) fn with_value(&self, value: Node) -> Self {
        match self {
            ArrayElement::Value { .. } => ArrayElement::Value { value },
            ArrayElement::Spread { .. } => ArrayElement::Spread { value },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NestedArray {
    pub uid: String,
    #[serde(default)]
    pub content: Vec<ArrayElement>,
    #[serde(default, skip_serializing_if = "ParsedComments::is_empty")]
    pub comments: ParsedComments,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Property {
    Assignment { key: String, value: Node },
    Spread { value: Node },
}

impl Property {
    pub fn value(&self) -> &Node {
        match self {
            Property::Assignment { value, .. } | Property::Spread { value } => value,
        }
    }

    pub(crate) fn with_value(&self, value: Node) -> Self {
        match self {
            Property::Assignment { key, .. } => Property::Assignment {
                key: key.clone(),
                value,
            },
            Property::Spread { .. } => Property::Spread { value },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NestedObject {
    pub uid: String,
    #[serde(default)]
    pub content: Vec<Property>,
    #[serde(default, skip_serializing_if = "ParsedComments::is_empty")]
    pub comments: ParsedComments,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCall {
    pub uid: String,
    pub function_name: String,
    #[serde(default)]
    pub parameters: Vec<Node>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapExpression {
    pub uid: String,
    pub value_to_map: Box<Node>,
    pub map_function: Box<Node>,
    #[serde(default, skip_serializing_if = "ParsedComments::is_empty")]
    pub comments: ParsedComments,
}

/// Element-like nodes embedded inside arbitrary code.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementLike {
    Element(Element),
    Fragment(Fragment),
}

impl ElementLike {
    pub fn uid(&self) -> &str {
        match self {
            ElementLike::Element(element) => &element.uid,
            ElementLike::Fragment(fragment) => &fragment.uid,
        }
    }
}

impl From<ElementLike> for Node {
    fn from(value: ElementLike) -> Self {
        match value {
            ElementLike::Element(element) => Node::Element(element),
            ElementLike::Fragment(fragment) => Node::Fragment(fragment),
        }
    }
}

/// Arbitrary code that may embed elements, keyed by the placeholder used
/// in `javascript_with_uids`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtherJavaScript {
    pub uid: String,
    pub original_javascript: String,
    #[serde(default)]
    pub javascript_with_uids: String,
    #[serde(default)]
    pub defined_elsewhere: Vec<String>,
    #[serde(default)]
    pub elements_within: BTreeMap<String, ElementLike>,
    #[serde(default, skip_serializing_if = "ParsedComments::is_empty")]
    pub comments: ParsedComments,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    pub uid: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAccess {
    pub uid: String,
    pub on_value: Box<Node>,
    pub property: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementAccess {
    pub uid: String,
    pub on_value: Box<Node>,
    pub element: Box<Node>,
}

impl Node {
    pub fn uid(&self) -> &str {
        match self {
            Node::Element(node) => &node.uid,
            Node::Fragment(node) => &node.uid,
            Node::Conditional(node) => &node.uid,
            Node::TextBlock(node) => &node.uid,
            Node::Value(node) => &node.uid,
            Node::NestedArray(node) => &node.uid,
            Node::NestedObject(node) => &node.uid,
            Node::FunctionCall(node) => &node.uid,
            Node::MapExpression(node) => &node.uid,
            Node::OtherJavaScript(node) => &node.uid,
            Node::Identifier(node) => &node.uid,
            Node::PropertyAccess(node) => &node.uid,
            Node::ElementAccess(node) => &node.uid,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Element(_) => NodeKind::Element,
            Node::Fragment(_) => NodeKind::Fragment,
            Node::Conditional(_) => NodeKind::Conditional,
            Node::TextBlock(_) => NodeKind::TextBlock,
            Node::Value(_) => NodeKind::Value,
            Node::NestedArray(_) => NodeKind::NestedArray,
            Node::NestedObject(_) => NodeKind::NestedObject,
            Node::FunctionCall(_) => NodeKind::FunctionCall,
            Node::MapExpression(_) => NodeKind::MapExpression,
            Node::OtherJavaScript(_) => NodeKind::OtherJavaScript,
            Node::Identifier(_) => NodeKind::Identifier,
            Node::PropertyAccess(_) => NodeKind::PropertyAccess,
            Node::ElementAccess(_) => NodeKind::ElementAccess,
        }
    }

    pub fn is_expression(&self) -> bool {
        self.kind().is_expression()
    }

    /// Source comments attached to this node, for kinds that keep them.
    pub fn comments(&self) -> Option<&ParsedComments> {
        match self {
            Node::Conditional(node) => Some(&node.comments),
            Node::Value(node) => Some(&node.comments),
            Node::NestedArray(node) => Some(&node.comments),
            Node::NestedObject(node) => Some(&node.comments),
            Node::MapExpression(node) => Some(&node.comments),
            Node::OtherJavaScript(node) => Some(&node.comments),
            Node::Element(_)
            | Node::Fragment(_)
            | Node::TextBlock(_)
            | Node::FunctionCall(_)
            | Node::Identifier(_)
            | Node::PropertyAccess(_)
            | Node::ElementAccess(_) => None,
        }
    }
}
