//! Test-only helpers for constructing node trees.

use serde_json::Value as JsonValue;

use crate::core::attributes::DATA_UID;
use crate::tree::{
    ArrayElement, Attribute, Conditional, Element, ElementAccess, ElementLike, ExpressionValue,
    Fragment, FunctionCall, Identifier, MapExpression, NestedArray, NestedObject, Node,
    OtherJavaScript, ParsedComments, Property, PropertyAccess, TextBlock,
};

/// `data-uid` entry whose literal is `uid` and whose own uid is `<uid>-attr`.
pub fn data_uid_attribute(uid: &str) -> Attribute {
    Attribute::entry(
        DATA_UID,
        Node::Value(ExpressionValue::new(uid, format!("{}-attr", uid))),
    )
}

/// Create a well-formed element carrying a matching `data-uid` attribute.
pub fn element(name: &str, uid: &str, children: Vec<Node>) -> Node {
    bare_element(name, uid, vec![data_uid_attribute(uid)], children)
}

/// Create an element with exactly the given attributes.
pub fn bare_element(name: &str, uid: &str, props: Vec<Attribute>, children: Vec<Node>) -> Node {
    Node::Element(Element {
        name: name.to_string(),
        uid: uid.to_string(),
        props,
        children,
    })
}

pub fn fragment(uid: &str, children: Vec<Node>) -> Node {
    Node::Fragment(Fragment {
        uid: uid.to_string(),
        children,
        long_form: false,
    })
}

pub fn text(uid: &str, text: &str) -> Node {
    Node::TextBlock(TextBlock {
        uid: uid.to_string(),
        text: text.to_string(),
    })
}

pub fn value(uid: &str, value: JsonValue) -> Node {
    Node::Value(ExpressionValue::new(value, uid))
}

pub fn identifier(uid: &str, name: &str) -> Node {
    Node::Identifier(Identifier {
        uid: uid.to_string(),
        name: name.to_string(),
    })
}

pub fn array(uid: &str, items: Vec<Node>) -> Node {
    Node::NestedArray(NestedArray {
        uid: uid.to_string(),
        content: items
            .into_iter()
            .map(|value| ArrayElement::Value { value })
            .collect(),
        comments: ParsedComments::default(),
    })
}

pub fn object(uid: &str, entries: Vec<(&str, Node)>) -> Node {
    Node::NestedObject(NestedObject {
        uid: uid.to_string(),
        content: entries
            .into_iter()
            .map(|(key, value)| Property::Assignment {
                key: key.to_string(),
                value,
            })
            .collect(),
        comments: ParsedComments::default(),
    })
}

pub fn function_call(uid: &str, name: &str, parameters: Vec<Node>) -> Node {
    Node::FunctionCall(FunctionCall {
        uid: uid.to_string(),
        function_name: name.to_string(),
        parameters,
    })
}

pub fn conditional(uid: &str, condition: Node, when_true: Node, when_false: Node) -> Node {
    Node::Conditional(Conditional {
        uid: uid.to_string(),
        condition: Box::new(condition),
        original_condition_string: String::new(),
        when_true: Box::new(when_true),
        when_false: Box::new(when_false),
        comments: ParsedComments::default(),
    })
}

pub fn map_expression(uid: &str, value_to_map: Node, map_function: Node) -> Node {
    Node::MapExpression(MapExpression {
        uid: uid.to_string(),
        value_to_map: Box::new(value_to_map),
        map_function: Box::new(map_function),
        comments: ParsedComments::default(),
    })
}

/// Code embedding `elements`, keyed by their own uids.
pub fn other_javascript(uid: &str, code: &str, elements: Vec<ElementLike>) -> Node {
    Node::OtherJavaScript(OtherJavaScript {
        uid: uid.to_string(),
        original_javascript: code.to_string(),
        javascript_with_uids: code.to_string(),
        defined_elsewhere: Vec::new(),
        elements_within: elements
            .into_iter()
            .map(|element| (element.uid().to_string(), element))
            .collect(),
        comments: ParsedComments::default(),
    })
}

pub fn property_access(uid: &str, on_value: Node, property: &str) -> Node {
    Node::PropertyAccess(PropertyAccess {
        uid: uid.to_string(),
        on_value: Box::new(on_value),
        property: property.to_string(),
    })
}

pub fn element_access(uid: &str, on_value: Node, element: Node) -> Node {
    Node::ElementAccess(ElementAccess {
        uid: uid.to_string(),
        on_value: Box::new(on_value),
        element: Box::new(element),
    })
}
