//! Uniqueness checks over a whole node tree.
//!
//! Every uid is visited: nodes, attribute values (including the `data-uid`
//! literal), array and object members, and elements embedded in code.

use std::collections::HashSet;

use crate::tree::{Attribute, Element, ElementLike, Node};

/// Insert every uid in `root` into `into`.
pub fn collect_uids(root: &Node, into: &mut HashSet<String>) {
    visit(root, root.uid(), &mut |uid: &str, _: &str| {
        into.insert(uid.to_string());
    });
}

/// Report every uid that appears more than once, in traversal order.
///
/// Each message names the duplicate and the `/`-separated uid path where it
/// was seen again.
pub fn find_duplicate_uids(root: &Node) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();
    visit(root, root.uid(), &mut |uid: &str, path: &str| {
        if !seen.insert(uid.to_string()) {
            errors.push(format!("duplicate uid '{}' at {}", uid, path));
        }
    });
    errors
}

type Visitor<'f> = dyn FnMut(&str, &str) + 'f;

fn visit(node: &Node, path: &str, f: &mut Visitor<'_>) {
    f(node.uid(), path);
    match node {
        Node::Element(element) => visit_element_contents(element, path, f),
        Node::Fragment(fragment) => visit_all(&fragment.children, path, f),
        Node::Conditional(conditional) => {
            visit_child(&conditional.condition, path, f);
            visit_child(&conditional.when_true, path, f);
            visit_child(&conditional.when_false, path, f);
        }
        Node::NestedArray(array) => {
            for element in &array.content {
                visit_child(element.value(), path, f);
            }
        }
        Node::NestedObject(object) => {
            for property in &object.content {
                visit_child(property.value(), path, f);
            }
        }
        Node::FunctionCall(call) => visit_all(&call.parameters, path, f),
        Node::MapExpression(map) => {
            visit_child(&map.value_to_map, path, f);
            visit_child(&map.map_function, path, f);
        }
        Node::OtherJavaScript(code) => {
            for element in code.elements_within.values() {
                let child_path = format!("{}/{}", path, element.uid());
                f(element.uid(), &child_path);
                match element {
                    ElementLike::Element(inner) => visit_element_contents(inner, &child_path, f),
                    ElementLike::Fragment(inner) => visit_all(&inner.children, &child_path, f),
                }
            }
        }
        Node::PropertyAccess(access) => visit_child(&access.on_value, path, f),
        Node::ElementAccess(access) => {
            visit_child(&access.on_value, path, f);
            visit_child(&access.element, path, f);
        }
        Node::TextBlock(_) | Node::Value(_) | Node::Identifier(_) => {}
    }
}

fn visit_element_contents(element: &Element, path: &str, f: &mut Visitor<'_>) {
    for attribute in &element.props {
        match attribute {
            Attribute::Entry { value, .. } => visit_child(value, path, f),
            Attribute::Spread { spread_value, .. } => visit_child(spread_value, path, f),
        }
    }
    visit_all(&element.children, path, f);
}

fn visit_all(children: &[Node], path: &str, f: &mut Visitor<'_>) {
    for child in children {
        visit_child(child, path, f);
    }
}

fn visit_child(child: &Node, path: &str, f: &mut Visitor<'_>) {
    let child_path = format!("{}/{}", path, child.uid());
    visit(child, &child_path, f);
}
