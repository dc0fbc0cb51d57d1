//! The compiled expression tree.
//!
//! Compilation resolves each document key once: keywords become typed
//! nodes, field paths are parsed into [`PathExpression`]s, and every other
//! key lands in the node's [`PropertyBag`]. Evaluation works on this tree
//! only and never revisits the source document.

use crate::registry::{ConditionKind, OperatorKind};
use verdict_opath::PathExpression;
use verdict_value::Value;

#[derive(Debug, Clone)]
pub enum Expression {
    Operator(OperatorExpr),
    Condition(ConditionExpr),
}

impl Expression {
    /// The keyword this node was compiled from.
    pub fn keyword(&self) -> &'static str {
        match self {
            Expression::Operator(op) => op.kind.keyword(),
            Expression::Condition(cond) => cond.kind.keyword(),
        }
    }

    pub fn children(&self) -> &[Expression] {
        match self {
            Expression::Operator(op) => &op.children,
            Expression::Condition(_) => &[],
        }
    }
}

/// A logical combinator node.
#[derive(Debug, Clone)]
pub struct OperatorExpr {
    pub kind: OperatorKind,
    pub children: Vec<Expression>,
    pub properties: PropertyBag,
    /// Bound field: the operator evaluates its body per element of this
    /// field instead of once against the whole object.
    pub field: Option<FieldSource>,
    pub subselector: Option<Box<Expression>>,
}

/// A leaf predicate node.
#[derive(Debug, Clone)]
pub struct ConditionExpr {
    pub kind: ConditionKind,
    pub properties: PropertyBag,
    pub operand: Option<OperandSource>,
    pub subselector: Option<Box<Expression>>,
}

/// Where a condition reads its operand from.
#[derive(Debug, Clone)]
pub enum OperandSource {
    Field(FieldSource),
    /// The node's `value` property, usually a function call.
    Value,
    /// The target's declared type.
    Type,
    /// The target's name.
    Name,
}

/// A compiled field reference. Bare names stay direct member lookups; any
/// other shape goes through the path engine.
#[derive(Debug, Clone)]
pub enum FieldSource {
    Member(String),
    Path(PathExpression),
}

impl FieldSource {
    pub fn path(&self) -> &str {
        match self {
            FieldSource::Member(name) => name,
            FieldSource::Path(expr) => expr.path(),
        }
    }
}

/// A property value: either a literal carried over from the document or a
/// function call evaluated against the target at evaluation time.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    Literal(Value),
    Function(FunctionCall),
}

/// A compiled value-producing function call.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<(String, FunctionArg)>,
}

impl FunctionCall {
    pub fn arg(&self, name: &str) -> Option<&FunctionArg> {
        self.args.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }
}

#[derive(Debug, Clone)]
pub enum FunctionArg {
    Literal(Value),
    Call(Box<FunctionCall>),
    List(Vec<FunctionArg>),
}

/// An insertion-ordered key/value store for node properties.
///
/// Assigning an existing key overwrites in place; [`add_unique`] keeps the
/// first value and silently drops later ones.
///
/// [`add_unique`]: PropertyBag::add_unique
#[derive(Debug, Clone, Default)]
pub struct PropertyBag {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing any existing value while keeping its position.
    pub fn insert(&mut self, key: &str, value: PropertyValue) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// Set `key` only if it is not already present.
    pub fn add_unique(&mut self, key: &str, value: PropertyValue) {
        if !self.contains_key(key) {
            self.entries.push((key.to_string(), value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// The literal value for `key`, ignoring function-valued properties.
    pub fn get_literal(&self, key: &str) -> Option<&Value> {
        match self.get(key)? {
            PropertyValue::Literal(v) => Some(v),
            PropertyValue::Function(_) => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_literal(key)?.as_bool()
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_literal(key)?.as_i64()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get_literal(key)?.as_str()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(i: i64) -> PropertyValue {
        PropertyValue::Literal(Value::Int(i))
    }

    fn as_int(bag: &PropertyBag, key: &str) -> Option<i64> {
        bag.get_literal(key).and_then(Value::as_i64)
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut bag = PropertyBag::new();
        bag.insert("a", lit(1));
        bag.insert("b", lit(2));
        bag.insert("a", lit(3));
        assert_eq!(as_int(&bag, "a"), Some(3));
        assert_eq!(bag.len(), 2);
        let keys: Vec<&str> = bag.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_add_unique_keeps_first_value() {
        let mut bag = PropertyBag::new();
        bag.add_unique("a", lit(1));
        bag.add_unique("a", lit(2));
        assert_eq!(as_int(&bag, "a"), Some(1));
        assert_eq!(bag.len(), 1);
    }
}
