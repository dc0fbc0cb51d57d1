//! Defines the compiled segment AST for object path expressions.

use verdict_value::Value;

/// One step of a compiled path expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// `$` — rebind to the evaluation root.
    Root,
    /// `@` — the current node (used inside filter operands).
    Current,
    /// `.name`, `['name']` or `+name`. `case_override` flips the
    /// resolver-wide case-sensitivity flag for this one member.
    Member { name: String, case_override: bool },
    /// `[0]` or `[-1]`; negative indices count from the end.
    Index(i64),
    /// `[*]` or `.*` — expand to all elements or member values.
    Wildcard,
    /// `[start:stop:step]` with Python-style defaults.
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },
    /// `[?(...)]` — keep elements for which the predicate holds.
    Filter(FilterExpr),
    /// `..name` — depth-first search collecting the first match per branch.
    Descendant(String),
    /// `[0,2]` — union of indices.
    UnionIndex(Vec<i64>),
    /// `['a','b']` — union of quoted members.
    UnionMember(Vec<String>),
}

impl Segment {
    /// Segments that force the whole expression to yield a collection.
    pub fn forces_array(&self) -> bool {
        matches!(
            self,
            Segment::Wildcard
                | Segment::Slice { .. }
                | Segment::Filter(_)
                | Segment::Descendant(_)
                | Segment::UnionIndex(_)
                | Segment::UnionMember(_)
        )
    }
}

/// A filter predicate applied to candidate elements.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Any branch may hold.
    Or(Vec<FilterExpr>),
    /// Every branch must hold.
    And(Vec<FilterExpr>),
    Not(Box<FilterExpr>),
    /// Compare the resolved operand against a literal. Comparison is
    /// soft-typed: scalars of different primitive types are never equal.
    Compare {
        path: Vec<Segment>,
        op: FilterOp,
        value: Value,
    },
    /// `?(@.path)` — the operand resolves and is truthy.
    Exists(Vec<Segment>),
}

/// Comparison operators available inside filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    /// `~=` — regular expression match.
    Match,
}
