//! Recursive uid reconciliation.
//!
//! Walks a node tree, fixing missing or colliding uids against a caller-owned
//! used-id set. Children and sub-expressions are fixed before the node that
//! contains them, and every rename is recorded in discovery order.
//!
//! Untouched subtrees are returned as [`Cow::Borrowed`] so callers can detect
//! (and keep) unchanged nodes without comparing them.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::core::FatalError;
use crate::core::attributes::{DATA_UID, data_uid_path, get_attribute, set_value_at_path};
use crate::core::generator::UidGenerator;
use crate::tree::{
    Attribute, Conditional, Element, ElementAccess, ElementLike, ExpressionValue, Fragment,
    FunctionCall, Identifier, MapExpression, NestedArray, NestedObject, Node, OtherJavaScript,
    PropertyAccess, TextBlock,
};

/// A single rename produced by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UidMapping {
    pub original_uid: String,
    pub new_uid: String,
}

impl UidMapping {
    pub fn new(original_uid: impl Into<String>, new_uid: impl Into<String>) -> Self {
        Self {
            original_uid: original_uid.into(),
            new_uid: new_uid.into(),
        }
    }
}

/// Renames in the order they were discovered.
pub type UidMappings = Vec<UidMapping>;

#[derive(Debug, Clone, PartialEq)]
pub struct WithUidMappings<T> {
    pub mappings: UidMappings,
    pub value: T,
}

/// Reconcile `node` against `used`, which is extended with every uid the
/// result claims.
///
/// On error `used` is left partially advanced and must not be reused.
pub fn reconcile<'a>(
    node: &'a Node,
    used: &mut HashSet<String>,
    generator: &mut UidGenerator,
) -> Result<WithUidMappings<Cow<'a, Node>>, FatalError> {
    let mut fixer = Fixer {
        used,
        generator,
        mappings: Vec::new(),
    };
    let value = fixer.node(node)?;
    Ok(WithUidMappings {
        mappings: fixer.mappings,
        value,
    })
}

/// [`reconcile`], rejecting any result whose kind differs from the input.
pub fn reconcile_generic<'a>(
    node: &'a Node,
    used: &mut HashSet<String>,
    generator: &mut UidGenerator,
) -> Result<WithUidMappings<Cow<'a, Node>>, FatalError> {
    let result = reconcile(node, used, generator)?;
    let (expected, actual) = (node.kind(), result.value.kind());
    if expected != actual {
        return Err(FatalError::KindChanged { expected, actual });
    }
    Ok(result)
}

/// [`reconcile`] for expression positions; the result must be an expression.
pub fn reconcile_expression<'a>(
    node: &'a Node,
    used: &mut HashSet<String>,
    generator: &mut UidGenerator,
) -> Result<WithUidMappings<Cow<'a, Node>>, FatalError> {
    let result = reconcile(node, used, generator)?;
    if !result.value.is_expression() {
        return Err(FatalError::NotAnExpression(result.value.kind()));
    }
    Ok(result)
}

struct Fixer<'c> {
    used: &'c mut HashSet<String>,
    generator: &'c mut UidGenerator,
    mappings: UidMappings,
}

impl Fixer<'_> {
    fn node<'a>(&mut self, node: &'a Node) -> Result<Cow<'a, Node>, FatalError> {
        Ok(match node {
            Node::Element(element) => lift(node, self.element(element)?, Node::Element),
            Node::Fragment(fragment) => lift(node, self.fragment(fragment)?, Node::Fragment),
            Node::Conditional(conditional) => {
                lift(node, self.conditional(conditional)?, Node::Conditional)
            }
            Node::TextBlock(block) => lift(node, self.text_block(block)?, Node::TextBlock),
            Node::Value(value) => lift(node, self.value(value)?, Node::Value),
            Node::NestedArray(array) => lift(node, self.nested_array(array)?, Node::NestedArray),
            Node::NestedObject(object) => {
                lift(node, self.nested_object(object)?, Node::NestedObject)
            }
            Node::FunctionCall(call) => lift(node, self.function_call(call)?, Node::FunctionCall),
            Node::MapExpression(map) => {
                lift(node, self.map_expression(map)?, Node::MapExpression)
            }
            Node::OtherJavaScript(code) => {
                lift(node, self.other_javascript(code)?, Node::OtherJavaScript)
            }
            Node::Identifier(identifier) => {
                lift(node, self.identifier(identifier)?, Node::Identifier)
            }
            Node::PropertyAccess(access) => {
                lift(node, self.property_access(access)?, Node::PropertyAccess)
            }
            Node::ElementAccess(access) => {
                lift(node, self.element_access(access)?, Node::ElementAccess)
            }
        })
    }

    fn nodes<'a>(&mut self, nodes: &'a [Node]) -> Result<Cow<'a, [Node]>, FatalError> {
        let mut fixed = Vec::with_capacity(nodes.len());
        for node in nodes {
            fixed.push(self.node(node)?);
        }
        Ok(collect(nodes, fixed))
    }

    fn element<'a>(&mut self, element: &'a Element) -> Result<Cow<'a, Element>, FatalError> {
        let children = self.nodes(&element.children)?;
        let props = self.attributes(&element.props)?;

        let uid = &element.uid;
        let uid_prop = get_attribute(&props, DATA_UID);
        let has_literal_uid = matches!(uid_prop, Some(Node::Value(_)));

        if !has_literal_uid || self.used.contains(uid) {
            let prop_original = uid_prop.map(|prop| prop.uid().to_string());

            let new_uid = self.generator.generate_consistent(uid, self.used)?;
            self.record(uid, &new_uid);
            self.used.insert(new_uid.clone());

            let new_prop_uid = self.generator.generate_consistent(uid, self.used)?;
            if let Some(original) = prop_original {
                self.record(&original, &new_prop_uid);
            }
            self.used.insert(new_prop_uid.clone());

            let uid_value = Node::Value(ExpressionValue::new(
                JsonValue::String(new_uid.clone()),
                new_prop_uid,
            ));
            let props = set_value_at_path(&props, &data_uid_path(), uid_value).map_err(
                |source| FatalError::AttributeWrite {
                    uid: uid.clone(),
                    source,
                },
            )?;

            return Ok(Cow::Owned(Element {
                name: element.name.clone(),
                uid: new_uid,
                props,
                children: children.into_owned(),
            }));
        }

        self.used.insert(uid.clone());
        if is_borrowed(&children) && is_borrowed(&props) {
            return Ok(Cow::Borrowed(element));
        }
        Ok(Cow::Owned(Element {
            name: element.name.clone(),
            uid: uid.clone(),
            props: props.into_owned(),
            children: children.into_owned(),
        }))
    }

    fn attributes<'a>(
        &mut self,
        attributes: &'a [Attribute],
    ) -> Result<Cow<'a, [Attribute]>, FatalError> {
        let mut fixed = Vec::with_capacity(attributes.len());
        for attribute in attributes {
            let entry = match attribute {
                Attribute::Entry {
                    key,
                    value,
                    comments,
                } => match self.node(value)? {
                    Cow::Borrowed(_) => Cow::Borrowed(attribute),
                    Cow::Owned(value) => Cow::Owned(Attribute::Entry {
                        key: key.clone(),
                        value,
                        comments: comments.clone(),
                    }),
                },
                Attribute::Spread {
                    spread_value,
                    comments,
                } => match self.node(spread_value)? {
                    Cow::Borrowed(_) => Cow::Borrowed(attribute),
                    Cow::Owned(spread_value) => Cow::Owned(Attribute::Spread {
                        spread_value,
                        comments: comments.clone(),
                    }),
                },
            };
            fixed.push(entry);
        }
        Ok(collect(attributes, fixed))
    }

    fn element_like<'a>(
        &mut self,
        element: &'a ElementLike,
    ) -> Result<Cow<'a, ElementLike>, FatalError> {
        Ok(match element {
            ElementLike::Element(inner) => match self.element(inner)? {
                Cow::Borrowed(_) => Cow::Borrowed(element),
                Cow::Owned(fixed) => Cow::Owned(ElementLike::Element(fixed)),
            },
            ElementLike::Fragment(inner) => match self.fragment(inner)? {
                Cow::Borrowed(_) => Cow::Borrowed(element),
                Cow::Owned(fixed) => Cow::Owned(ElementLike::Fragment(fixed)),
            },
        })
    }

    fn fragment<'a>(&mut self, fragment: &'a Fragment) -> Result<Cow<'a, Fragment>, FatalError> {
        let children = self.nodes(&fragment.children)?;
        let uid = self.claim(&fragment.uid)?;
        if uid.is_none() && is_borrowed(&children) {
            return Ok(Cow::Borrowed(fragment));
        }
        Ok(Cow::Owned(Fragment {
            uid: uid.unwrap_or_else(|| fragment.uid.clone()),
            children: children.into_owned(),
            long_form: fragment.long_form,
        }))
    }

    fn conditional<'a>(
        &mut self,
        conditional: &'a Conditional,
    ) -> Result<Cow<'a, Conditional>, FatalError> {
        let condition = self.node(&conditional.condition)?;
        let when_true = self.node(&conditional.when_true)?;
        let when_false = self.node(&conditional.when_false)?;
        let uid = self.claim(&conditional.uid)?;
        if uid.is_none()
            && is_borrowed(&condition)
            && is_borrowed(&when_true)
            && is_borrowed(&when_false)
        {
            return Ok(Cow::Borrowed(conditional));
        }
        Ok(Cow::Owned(Conditional {
            uid: uid.unwrap_or_else(|| conditional.uid.clone()),
            condition: Box::new(condition.into_owned()),
            original_condition_string: conditional.original_condition_string.clone(),
            when_true: Box::new(when_true.into_owned()),
            when_false: Box::new(when_false.into_owned()),
            comments: conditional.comments.clone(),
        }))
    }

    fn text_block<'a>(&mut self, block: &'a TextBlock) -> Result<Cow<'a, TextBlock>, FatalError> {
        Ok(match self.claim(&block.uid)? {
            None => Cow::Borrowed(block),
            Some(uid) => Cow::Owned(TextBlock {
                uid,
                ..block.clone()
            }),
        })
    }

    fn value<'a>(
        &mut self,
        value: &'a ExpressionValue,
    ) -> Result<Cow<'a, ExpressionValue>, FatalError> {
        Ok(match self.claim(&value.uid)? {
            None => Cow::Borrowed(value),
            Some(uid) => Cow::Owned(ExpressionValue {
                uid,
                ..value.clone()
            }),
        })
    }

    fn nested_array<'a>(
        &mut self,
        array: &'a NestedArray,
    ) -> Result<Cow<'a, NestedArray>, FatalError> {
        let mut fixed = Vec::with_capacity(array.content.len());
        for element in &array.content {
            fixed.push(match self.node(element.value())? {
                Cow::Borrowed(_) => Cow::Borrowed(element),
                Cow::Owned(value) => Cow::Owned(element.with_value(value)),
            });
        }
        let content = collect(&array.content, fixed);
        let uid = self.claim(&array.uid)?;
        if uid.is_none() && is_borrowed(&content) {
            return Ok(Cow::Borrowed(array));
        }
        Ok(Cow::Owned(NestedArray {
            uid: uid.unwrap_or_else(|| array.uid.clone()),
            content: content.into_owned(),
            comments: array.comments.clone(),
        }))
    }

    fn nested_object<'a>(
        &mut self,
        object: &'a NestedObject,
    ) -> Result<Cow<'a, NestedObject>, FatalError> {
        let mut fixed = Vec::with_capacity(object.content.len());
        for property in &object.content {
            fixed.push(match self.node(property.value())? {
                Cow::Borrowed(_) => Cow::Borrowed(property),
                Cow::Owned(value) => Cow::Owned(property.with_value(value)),
            });
        }
        let content = collect(&object.content, fixed);
        let uid = self.claim(&object.uid)?;
        if uid.is_none() && is_borrowed(&content) {
            return Ok(Cow::Borrowed(object));
        }
        Ok(Cow::Owned(NestedObject {
            uid: uid.unwrap_or_else(|| object.uid.clone()),
            content: content.into_owned(),
            comments: object.comments.clone(),
        }))
    }

    fn function_call<'a>(
        &mut self,
        call: &'a FunctionCall,
    ) -> Result<Cow<'a, FunctionCall>, FatalError> {
        let parameters = self.nodes(&call.parameters)?;
        let uid = self.claim(&call.uid)?;
        if uid.is_none() && is_borrowed(&parameters) {
            return Ok(Cow::Borrowed(call));
        }
        Ok(Cow::Owned(FunctionCall {
            uid: uid.unwrap_or_else(|| call.uid.clone()),
            function_name: call.function_name.clone(),
            parameters: parameters.into_owned(),
        }))
    }

    fn map_expression<'a>(
        &mut self,
        map: &'a MapExpression,
    ) -> Result<Cow<'a, MapExpression>, FatalError> {
        let value_to_map = self.node(&map.value_to_map)?;
        let map_function = self.node(&map.map_function)?;
        let uid = self.claim(&map.uid)?;
        if uid.is_none() && is_borrowed(&value_to_map) && is_borrowed(&map_function) {
            return Ok(Cow::Borrowed(map));
        }
        Ok(Cow::Owned(MapExpression {
            uid: uid.unwrap_or_else(|| map.uid.clone()),
            value_to_map: Box::new(value_to_map.into_owned()),
            map_function: Box::new(map_function.into_owned()),
            comments: map.comments.clone(),
        }))
    }

    fn other_javascript<'a>(
        &mut self,
        code: &'a OtherJavaScript,
    ) -> Result<Cow<'a, OtherJavaScript>, FatalError> {
        let mut fixed = Vec::with_capacity(code.elements_within.len());
        for (key, element) in &code.elements_within {
            fixed.push((key, self.element_like(element)?));
        }
        let within_changed = fixed.iter().any(|(_, element)| !is_borrowed(element));
        let uid = self.claim(&code.uid)?;
        if uid.is_none() && !within_changed {
            return Ok(Cow::Borrowed(code));
        }
        let elements_within: BTreeMap<String, ElementLike> = fixed
            .into_iter()
            .map(|(key, element)| (key.clone(), element.into_owned()))
            .collect();
        Ok(Cow::Owned(OtherJavaScript {
            uid: uid.unwrap_or_else(|| code.uid.clone()),
            elements_within,
            ..code.clone()
        }))
    }

    fn identifier<'a>(
        &mut self,
        identifier: &'a Identifier,
    ) -> Result<Cow<'a, Identifier>, FatalError> {
        Ok(match self.claim(&identifier.uid)? {
            None => Cow::Borrowed(identifier),
            Some(uid) => Cow::Owned(Identifier {
                uid,
                name: identifier.name.clone(),
            }),
        })
    }

    fn property_access<'a>(
        &mut self,
        access: &'a PropertyAccess,
    ) -> Result<Cow<'a, PropertyAccess>, FatalError> {
        let on_value = self.node(&access.on_value)?;
        let uid = self.claim(&access.uid)?;
        if uid.is_none() && is_borrowed(&on_value) {
            return Ok(Cow::Borrowed(access));
        }
        Ok(Cow::Owned(PropertyAccess {
            uid: uid.unwrap_or_else(|| access.uid.clone()),
            on_value: Box::new(on_value.into_owned()),
            property: access.property.clone(),
        }))
    }

    fn element_access<'a>(
        &mut self,
        access: &'a ElementAccess,
    ) -> Result<Cow<'a, ElementAccess>, FatalError> {
        let on_value = self.node(&access.on_value)?;
        let element = self.node(&access.element)?;
        let uid = self.claim(&access.uid)?;
        if uid.is_none() && is_borrowed(&on_value) && is_borrowed(&element) {
            return Ok(Cow::Borrowed(access));
        }
        Ok(Cow::Owned(ElementAccess {
            uid: uid.unwrap_or_else(|| access.uid.clone()),
            on_value: Box::new(on_value.into_owned()),
            element: Box::new(element.into_owned()),
        }))
    }

    /// Claim `uid` for a non-element node, returning the replacement if it
    /// was already taken.
    fn claim(&mut self, uid: &str) -> Result<Option<String>, FatalError> {
        let replacement = if self.used.contains(uid) {
            let fixed = self.generator.generate_consistent(uid, self.used)?;
            (fixed != uid).then_some(fixed)
        } else {
            None
        };
        match &replacement {
            Some(fixed) => {
                self.record(uid, fixed);
                self.used.insert(fixed.clone());
            }
            None => {
                self.used.insert(uid.to_string());
            }
        }
        Ok(replacement)
    }

    fn record(&mut self, original_uid: &str, new_uid: &str) {
        debug!(original_uid, new_uid, "uid reassigned");
        self.mappings.push(UidMapping::new(original_uid, new_uid));
    }
}

fn lift<'a, T: Clone>(
    original: &'a Node,
    fixed: Cow<'a, T>,
    wrap: fn(T) -> Node,
) -> Cow<'a, Node> {
    match fixed {
        Cow::Borrowed(_) => Cow::Borrowed(original),
        Cow::Owned(value) => Cow::Owned(wrap(value)),
    }
}

fn collect<'a, T: Clone>(original: &'a [T], fixed: Vec<Cow<'a, T>>) -> Cow<'a, [T]> {
    if fixed.iter().all(is_borrowed) {
        Cow::Borrowed(original)
    } else {
        Cow::Owned(fixed.into_iter().map(Cow::into_owned).collect())
    }
}

fn is_borrowed<T: ToOwned + ?Sized>(value: &Cow<'_, T>) -> bool {
    matches!(value, Cow::Borrowed(_))
}
