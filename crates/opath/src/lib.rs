//! A JSONPath-inspired object path expression language.
//!
//! Paths are compiled once into an immutable [`PathExpression`] and then
//! evaluated any number of times against target objects through the
//! uniform [`TargetNode`] adapter. Evaluation is all-or-nothing: if any
//! segment fails to resolve, the whole expression yields "not found".

pub mod ast;
pub mod error;
mod parser;
mod resolver;

pub use ast::{FilterExpr, FilterOp, Segment};
pub use error::PathError;
pub use parser::is_bare_name;

use verdict_value::{TargetNode, Value};

/// A compiled, reusable object path expression.
#[derive(Debug, Clone)]
pub struct PathExpression {
    path: String,
    segments: Vec<Segment>,
    is_array: bool,
}

impl PathExpression {
    /// Compile the expression from the specified path.
    pub fn create(path: &str) -> Result<Self, PathError> {
        let segments = parser::parse_path(path)?;
        let is_array = segments.iter().any(Segment::forces_array);
        Ok(Self {
            path: path.to_string(),
            segments,
            is_array,
        })
    }

    /// The original path string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// True when evaluation always yields a collection (the path contains a
    /// wildcard, slice, filter, union or descendant segment).
    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// Resolve the path and return the selected nodes, or `None` when the
    /// path does not exist within the object.
    pub fn get<'a>(
        &self,
        root: &TargetNode<'a>,
        case_sensitive: bool,
    ) -> Option<Vec<TargetNode<'a>>> {
        let result = resolver::resolve(&self.segments, root, case_sensitive);
        log::trace!(
            "path '{}' resolved: {}",
            self.path,
            result.as_ref().map_or(0, Vec::len)
        );
        result
    }

    /// Resolve the path into an owned value: a sequence when [`is_array`]
    /// holds, otherwise the single selected value.
    ///
    /// [`is_array`]: PathExpression::is_array
    pub fn evaluate(&self, root: &TargetNode<'_>, case_sensitive: bool) -> Option<Value> {
        let items = self.get(root, case_sensitive)?;
        if self.is_array {
            Some(Value::Sequence(items.iter().map(TargetNode::to_value).collect()))
        } else {
            items.first().map(TargetNode::to_value)
        }
    }
}

/// Convenience helper: compile and evaluate a path in one step.
pub fn select(path: &str, root: &TargetNode<'_>, case_sensitive: bool) -> Result<Option<Value>, PathError> {
    Ok(PathExpression::create(path)?.evaluate(root, case_sensitive))
}
