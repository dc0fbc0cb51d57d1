//! The uniform adapter over heterogeneous target object representations.
//!
//! Path resolution and condition evaluation never inspect a backing store
//! directly. They walk [`TargetNode`], which switches once per operation on
//! the representation and delegates to the per-representation adapters in
//! [`crate::value`], [`crate::markup`] and [`crate::dynamic`].

use crate::dynamic::{self, DynamicObject, PropertyView};
use crate::markup::{Element, MarkupNode};
use crate::value::{Scalar, Value, wrap_index};

/// A borrowed view of a target object in any supported representation.
#[derive(Debug, Clone)]
pub enum TargetNode<'a> {
    /// A native map/sequence/scalar tree.
    Tree(&'a Value),
    /// A parsed JSON token tree.
    Json(&'a serde_json::Value),
    /// A markup (XML-like) tree view.
    Markup(MarkupNode<'a>),
    /// A dynamic object resolved through reflection-like lookup.
    Dynamic(&'a dyn DynamicObject),
    /// A run of dynamic objects read from a list-valued property.
    Objects(Vec<&'a dyn DynamicObject>),
}

impl<'a> From<&'a Value> for TargetNode<'a> {
    fn from(value: &'a Value) -> Self {
        TargetNode::Tree(value)
    }
}

impl<'a> From<&'a serde_json::Value> for TargetNode<'a> {
    fn from(value: &'a serde_json::Value) -> Self {
        TargetNode::Json(value)
    }
}

impl<'a> From<&'a Element> for TargetNode<'a> {
    fn from(element: &'a Element) -> Self {
        TargetNode::Markup(MarkupNode::Element(element))
    }
}

impl<'a> From<&'a dyn DynamicObject> for TargetNode<'a> {
    fn from(object: &'a dyn DynamicObject) -> Self {
        TargetNode::Dynamic(object)
    }
}

impl<'a> From<PropertyView<'a>> for TargetNode<'a> {
    fn from(view: PropertyView<'a>) -> Self {
        match view {
            PropertyView::Object(o) => TargetNode::Dynamic(o),
            PropertyView::Objects(items) => TargetNode::Objects(items),
            PropertyView::Value(v) => TargetNode::Tree(v),
        }
    }
}

impl<'a> TargetNode<'a> {
    /// Member access by name. When `case_sensitive` is false, lookup falls
    /// back to a case-insensitive scan after an exact miss.
    pub fn member(&self, name: &str, case_sensitive: bool) -> Option<TargetNode<'a>> {
        match self {
            TargetNode::Tree(value) => {
                let v = if case_sensitive {
                    value.get(name)
                } else {
                    value.get_insensitive(name)
                };
                v.map(TargetNode::Tree)
            }
            TargetNode::Json(value) => json_member(value, name, case_sensitive),
            TargetNode::Markup(node) => node.member(name, case_sensitive).map(TargetNode::Markup),
            TargetNode::Dynamic(object) => {
                dynamic::lookup(*object, name, case_sensitive).map(TargetNode::from)
            }
            TargetNode::Objects(_) => None,
        }
    }

    /// Index access. Negative indices count from the end of the sequence.
    pub fn index(&self, index: i64) -> Option<TargetNode<'a>> {
        match self {
            TargetNode::Tree(Value::Sequence(items)) => {
                wrap_index(items.len(), index).map(|i| TargetNode::Tree(&items[i]))
            }
            TargetNode::Json(serde_json::Value::Array(items)) => {
                wrap_index(items.len(), index).map(|i| TargetNode::Json(&items[i]))
            }
            TargetNode::Markup(MarkupNode::Elements(items)) => {
                wrap_index(items.len(), index).map(|i| TargetNode::Markup(MarkupNode::Element(items[i])))
            }
            TargetNode::Objects(items) => {
                wrap_index(items.len(), index).map(|i| TargetNode::Dynamic(items[i]))
            }
            _ => None,
        }
    }

    /// The elements of a sequence-like node, or `None` when the node is not
    /// a sequence.
    pub fn elements(&self) -> Option<Vec<TargetNode<'a>>> {
        match self {
            TargetNode::Tree(Value::Sequence(items)) => {
                Some(items.iter().map(TargetNode::Tree).collect())
            }
            TargetNode::Json(serde_json::Value::Array(items)) => {
                Some(items.iter().map(TargetNode::Json).collect())
            }
            TargetNode::Markup(MarkupNode::Elements(items)) => Some(
                items
                    .iter()
                    .map(|e| TargetNode::Markup(MarkupNode::Element(e)))
                    .collect(),
            ),
            TargetNode::Objects(items) => {
                Some(items.iter().map(|o| TargetNode::Dynamic(*o)).collect())
            }
            _ => None,
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(
            self,
            TargetNode::Tree(Value::Sequence(_))
                | TargetNode::Json(serde_json::Value::Array(_))
                | TargetNode::Markup(MarkupNode::Elements(_))
                | TargetNode::Objects(_)
        )
    }

    /// Enumerate the immediate constituents of this node: sequence elements
    /// for sequences, member values for map-like nodes, nothing for scalars.
    /// Wildcard expansion and descendant search are built on this.
    pub fn values(&self) -> Vec<TargetNode<'a>> {
        if let Some(items) = self.elements() {
            return items;
        }
        match self {
            TargetNode::Tree(Value::Map(entries)) => {
                entries.iter().map(|(_, v)| TargetNode::Tree(v)).collect()
            }
            TargetNode::Json(serde_json::Value::Object(entries)) => {
                entries.values().map(TargetNode::Json).collect()
            }
            TargetNode::Markup(MarkupNode::Element(element)) => element
                .children()
                .iter()
                .map(|c| TargetNode::Markup(MarkupNode::Element(c)))
                .collect(),
            TargetNode::Dynamic(object) => object
                .property_names()
                .into_iter()
                .filter_map(|name| object.property(name))
                .map(TargetNode::from)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// A borrowed scalar view, or `None` for structured nodes.
    pub fn scalar(&self) -> Option<Scalar<'a>> {
        match self {
            TargetNode::Tree(value) => value.scalar(),
            TargetNode::Json(value) => json_scalar(value),
            TargetNode::Markup(node) => node.scalar(),
            TargetNode::Dynamic(_) | TargetNode::Objects(_) => None,
        }
    }

    /// Deep-copy the node into the generic value model.
    pub fn to_value(&self) -> Value {
        match self {
            TargetNode::Tree(value) => (*value).clone(),
            TargetNode::Json(value) => Value::from_json(value),
            TargetNode::Markup(node) => node.to_value(),
            TargetNode::Dynamic(object) => dynamic_to_value(*object),
            TargetNode::Objects(items) => {
                Value::Sequence(items.iter().map(|o| dynamic_to_value(*o)).collect())
            }
        }
    }

    /// Truthiness used by existence filters: null and empty values are
    /// false, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self.scalar() {
            Some(Scalar::Null) => false,
            Some(Scalar::Bool(b)) => b,
            Some(Scalar::Int(i)) => i != 0,
            Some(Scalar::Float(f)) => f != 0.0,
            Some(Scalar::String(s)) => !s.is_empty(),
            None => match self.elements() {
                Some(items) => !items.is_empty(),
                None => true,
            },
        }
    }
}

fn json_member<'a>(
    value: &'a serde_json::Value,
    name: &str,
    case_sensitive: bool,
) -> Option<TargetNode<'a>> {
    let entries = value.as_object()?;
    if let Some(v) = entries.get(name) {
        return Some(TargetNode::Json(v));
    }
    if case_sensitive {
        return None;
    }
    entries
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| TargetNode::Json(v))
}

fn json_scalar(value: &serde_json::Value) -> Option<Scalar<'_>> {
    match value {
        serde_json::Value::Null => Some(Scalar::Null),
        serde_json::Value::Bool(b) => Some(Scalar::Bool(*b)),
        serde_json::Value::Number(n) => Some(match n.as_i64() {
            Some(i) => Scalar::Int(i),
            None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
        }),
        serde_json::Value::String(s) => Some(Scalar::String(s)),
        _ => None,
    }
}

fn dynamic_to_value(object: &dyn DynamicObject) -> Value {
    let entries = object
        .property_names()
        .into_iter()
        .filter_map(|name| {
            object
                .property(name)
                .map(|view| (name.to_string(), TargetNode::from(view).to_value()))
        })
        .collect();
    Value::Map(entries)
}
