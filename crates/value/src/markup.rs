//! A minimal markup (XML-like) element tree and its node view.
//!
//! Member access over markup maps a name to an attribute first, then to
//! named child elements; sequence iteration maps to repeated child
//! elements with the same name.

use crate::value::{Scalar, Value};

/// One element in a markup tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: Option<String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn attribute(&self, name: &str, case_sensitive: bool) -> Option<&str> {
        let exact = self
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str());
        if exact.is_some() || case_sensitive {
            return exact;
        }
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn children_named(&self, name: &str, case_sensitive: bool) -> Vec<&Element> {
        let exact: Vec<&Element> = self.children.iter().filter(|c| c.name == name).collect();
        if !exact.is_empty() || case_sensitive {
            return exact;
        }
        self.children
            .iter()
            .filter(|c| c.name.eq_ignore_ascii_case(name))
            .collect()
    }

    /// True when the element carries only text, in which case it reads as a
    /// scalar rather than a map-like node.
    pub fn is_text_only(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }
}

/// A borrowed view into a markup tree: a single element, a run of repeated
/// sibling elements, or an attribute value.
#[derive(Debug, Clone)]
pub enum MarkupNode<'a> {
    Element(&'a Element),
    Elements(Vec<&'a Element>),
    Attribute(&'a str),
}

impl<'a> MarkupNode<'a> {
    pub fn member(&self, name: &str, case_sensitive: bool) -> Option<MarkupNode<'a>> {
        let MarkupNode::Element(element) = self else {
            return None;
        };
        if let Some(value) = element.attribute(name, case_sensitive) {
            return Some(MarkupNode::Attribute(value));
        }
        let matched = element.children_named(name, case_sensitive);
        match matched.len() {
            0 => None,
            1 => Some(MarkupNode::Element(matched[0])),
            _ => Some(MarkupNode::Elements(matched)),
        }
    }

    pub fn scalar(&self) -> Option<Scalar<'a>> {
        match self {
            MarkupNode::Attribute(value) => Some(Scalar::String(value)),
            MarkupNode::Element(element) if element.is_text_only() => {
                Some(Scalar::String(element.text().unwrap_or("")))
            }
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            MarkupNode::Attribute(value) => Value::String((*value).to_string()),
            MarkupNode::Elements(elements) => {
                Value::Sequence(elements.iter().map(|e| element_to_value(e)).collect())
            }
            MarkupNode::Element(element) => element_to_value(element),
        }
    }
}

fn element_to_value(element: &Element) -> Value {
    if element.is_text_only() {
        return Value::String(element.text().unwrap_or("").to_string());
    }
    let mut entries: Vec<(String, Value)> = element
        .attributes
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    for child in &element.children {
        let value = element_to_value(child);
        match entries.iter_mut().find(|(k, _)| *k == child.name) {
            // Repeated child elements collapse into a sequence entry.
            Some((_, Value::Sequence(items))) => items.push(value),
            Some(entry) => {
                let first = std::mem::replace(&mut entry.1, Value::Null);
                entry.1 = Value::Sequence(vec![first, value]);
            }
            None => entries.push((child.name.clone(), value)),
        }
    }
    Value::Map(entries)
}
