//! The generic document tree used for rule definitions and native target objects.

use std::fmt;

/// A generic, already-parsed document tree.
///
/// Rule definitions arrive as this shape from an external YAML/JSON reader,
/// and native target objects can be expressed with it directly. Maps keep
/// the order keys were first seen so that compiled expression trees are
/// deterministic with respect to their source document.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Look up a map entry by exact key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Look up a map entry, falling back to a case-insensitive scan when no
    /// exact match exists.
    pub fn get_insensitive(&self, key: &str) -> Option<&Value> {
        self.get(key).or_else(|| match self {
            Value::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v),
            _ => None,
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// A borrowed scalar view, or `None` for maps and sequences.
    pub fn scalar(&self) -> Option<Scalar<'_>> {
        match self {
            Value::Null => Some(Scalar::Null),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Int(i) => Some(Scalar::Int(*i)),
            Value::Float(f) => Some(Scalar::Float(*f)),
            Value::String(s) => Some(Scalar::String(s)),
            Value::Sequence(_) | Value::Map(_) => None,
        }
    }

    /// A short name for the shape of this value, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Map(_) => "map",
        }
    }

    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from_json(json)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(&json)
    }
}

impl fmt::Display for Value {
    /// Renders scalars plainly and collections in a compact JSON-like form,
    /// for use in reason messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A borrowed scalar, the unit of comparison for path filters and condition
/// predicates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(&'a str),
}

impl<'a> Scalar<'a> {
    /// Typed equality: strings never equal numbers or booleans, but integer
    /// and float scalars compare numerically. Path filters depend on the
    /// string/number distinction staying strict.
    pub fn eq_typed(&self, other: &Scalar<'_>, case_sensitive: bool) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a == b,
            (Scalar::Int(a), Scalar::Float(b)) | (Scalar::Float(b), Scalar::Int(a)) => {
                *a as f64 == *b
            }
            (Scalar::String(a), Scalar::String(b)) => {
                if case_sensitive {
                    a == b
                } else {
                    a.eq_ignore_ascii_case(b)
                }
            }
            _ => false,
        }
    }

    /// Numeric ordering between number scalars. Strings and booleans do not
    /// participate.
    pub fn compare_numeric(&self, other: &Scalar<'_>) -> Option<std::cmp::Ordering> {
        let a = self.as_f64()?;
        let b = other.as_f64()?;
        a.partial_cmp(&b)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Int(i) => Value::Int(*i),
            Scalar::Float(f) => Value::Float(*f),
            Scalar::String(s) => Value::String((*s).to_string()),
        }
    }
}

/// Resolve a possibly negative index against a length, counting from the end
/// for negative values. Out-of-range indices return `None`.
pub fn wrap_index(len: usize, index: i64) -> Option<usize> {
    if index >= 0 {
        let i = index as usize;
        (i < len).then_some(i)
    } else {
        let back = index.unsigned_abs() as usize;
        (back <= len).then(|| len - back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_preserves_number_kinds() {
        let v = Value::from_json(&json!({ "a": 1, "b": 1.5, "c": "1" }));
        assert_eq!(v.get("a"), Some(&Value::Int(1)));
        assert_eq!(v.get("b"), Some(&Value::Float(1.5)));
        assert_eq!(v.get("c"), Some(&Value::String("1".to_string())));
    }

    #[test]
    fn test_scalar_typed_equality_keeps_strings_and_numbers_apart() {
        assert!(!Scalar::String("1").eq_typed(&Scalar::Int(1), true));
        assert!(Scalar::Int(1).eq_typed(&Scalar::Float(1.0), true));
        assert!(Scalar::String("A").eq_typed(&Scalar::String("a"), false));
        assert!(!Scalar::String("A").eq_typed(&Scalar::String("a"), true));
    }

    #[test]
    fn test_wrap_index() {
        assert_eq!(wrap_index(3, 0), Some(0));
        assert_eq!(wrap_index(3, -1), Some(2));
        assert_eq!(wrap_index(3, -3), Some(0));
        assert_eq!(wrap_index(2, -3), None);
        assert_eq!(wrap_index(2, 2), None);
    }

    #[test]
    fn test_case_insensitive_lookup_prefers_exact_match() {
        let v = Value::Map(vec![
            ("Name".to_string(), Value::Int(1)),
            ("name".to_string(), Value::Int(2)),
        ]);
        assert_eq!(v.get_insensitive("name"), Some(&Value::Int(2)));
        assert_eq!(v.get_insensitive("NAME"), Some(&Value::Int(1)));
    }
}
