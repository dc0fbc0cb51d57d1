//! The keyword table that drives compilation.
//!
//! A rule document is a plain map; which keys act as operators, conditions,
//! subselectors or function markers is decided here rather than hard-coded
//! in the builder, so the set can be extended in one place.

use std::collections::HashMap;

/// Logical combinators that hold child expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    If,
    Not,
    AllOf,
    AnyOf,
}

impl OperatorKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            OperatorKind::If => "if",
            OperatorKind::Not => "not",
            OperatorKind::AllOf => "allOf",
            OperatorKind::AnyOf => "anyOf",
        }
    }
}

/// Leaf predicates applied to a resolved operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    Exists,
    Equals,
    NotEquals,
    HasDefault,
    HasValue,
    Match,
    NotMatch,
    In,
    NotIn,
    Less,
    LessOrEquals,
    Greater,
    GreaterOrEquals,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
    Contains,
    NotContains,
    Count,
    NotCount,
    SetOf,
    Subset,
    IsString,
    IsArray,
    IsBoolean,
    IsInteger,
    IsNumeric,
    IsLower,
    IsUpper,
    Like,
    NotLike,
    Version,
}

impl ConditionKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ConditionKind::Exists => "exists",
            ConditionKind::Equals => "equals",
            ConditionKind::NotEquals => "notEquals",
            ConditionKind::HasDefault => "hasDefault",
            ConditionKind::HasValue => "hasValue",
            ConditionKind::Match => "match",
            ConditionKind::NotMatch => "notMatch",
            ConditionKind::In => "in",
            ConditionKind::NotIn => "notIn",
            ConditionKind::Less => "less",
            ConditionKind::LessOrEquals => "lessOrEquals",
            ConditionKind::Greater => "greater",
            ConditionKind::GreaterOrEquals => "greaterOrEquals",
            ConditionKind::StartsWith => "startsWith",
            ConditionKind::NotStartsWith => "notStartsWith",
            ConditionKind::EndsWith => "endsWith",
            ConditionKind::NotEndsWith => "notEndsWith",
            ConditionKind::Contains => "contains",
            ConditionKind::NotContains => "notContains",
            ConditionKind::Count => "count",
            ConditionKind::NotCount => "notCount",
            ConditionKind::SetOf => "setOf",
            ConditionKind::Subset => "subset",
            ConditionKind::IsString => "isString",
            ConditionKind::IsArray => "isArray",
            ConditionKind::IsBoolean => "isBoolean",
            ConditionKind::IsInteger => "isInteger",
            ConditionKind::IsNumeric => "isNumeric",
            ConditionKind::IsLower => "isLower",
            ConditionKind::IsUpper => "isUpper",
            ConditionKind::Like => "like",
            ConditionKind::NotLike => "notLike",
            ConditionKind::Version => "version",
        }
    }

    /// Negated predicates pass when the operand field does not exist.
    pub fn passes_on_missing_field(&self) -> bool {
        matches!(
            self,
            ConditionKind::NotEquals
                | ConditionKind::NotMatch
                | ConditionKind::NotIn
                | ConditionKind::NotStartsWith
                | ConditionKind::NotEndsWith
                | ConditionKind::NotContains
                | ConditionKind::NotLike
        )
    }
}

/// What a map key means to the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    Operator(OperatorKind),
    Condition(ConditionKind),
    /// The `where` key: a nested expression that filters which operand
    /// elements the enclosing node applies to.
    Subselector,
    /// The `$` key: marks a map as a function call producing a value.
    Function,
}

/// Maps document keys to their compiler meaning.
#[derive(Debug, Clone)]
pub struct KeywordRegistry {
    entries: HashMap<&'static str, KeywordKind>,
}

const OPERATORS: &[OperatorKind] = &[
    OperatorKind::If,
    OperatorKind::Not,
    OperatorKind::AllOf,
    OperatorKind::AnyOf,
];

const CONDITIONS: &[ConditionKind] = &[
    ConditionKind::Exists,
    ConditionKind::Equals,
    ConditionKind::NotEquals,
    ConditionKind::HasDefault,
    ConditionKind::HasValue,
    ConditionKind::Match,
    ConditionKind::NotMatch,
    ConditionKind::In,
    ConditionKind::NotIn,
    ConditionKind::Less,
    ConditionKind::LessOrEquals,
    ConditionKind::Greater,
    ConditionKind::GreaterOrEquals,
    ConditionKind::StartsWith,
    ConditionKind::NotStartsWith,
    ConditionKind::EndsWith,
    ConditionKind::NotEndsWith,
    ConditionKind::Contains,
    ConditionKind::NotContains,
    ConditionKind::Count,
    ConditionKind::NotCount,
    ConditionKind::SetOf,
    ConditionKind::Subset,
    ConditionKind::IsString,
    ConditionKind::IsArray,
    ConditionKind::IsBoolean,
    ConditionKind::IsInteger,
    ConditionKind::IsNumeric,
    ConditionKind::IsLower,
    ConditionKind::IsUpper,
    ConditionKind::Like,
    ConditionKind::NotLike,
    ConditionKind::Version,
];

impl KeywordRegistry {
    /// The built-in keyword set.
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        for op in OPERATORS {
            entries.insert(op.keyword(), KeywordKind::Operator(*op));
        }
        for cond in CONDITIONS {
            entries.insert(cond.keyword(), KeywordKind::Condition(*cond));
        }
        entries.insert("where", KeywordKind::Subselector);
        entries.insert("$", KeywordKind::Function);
        Self { entries }
    }

    pub fn lookup(&self, keyword: &str) -> Option<KeywordKind> {
        self.entries.get(keyword).copied()
    }

    pub fn is_function_marker(&self, keyword: &str) -> bool {
        matches!(self.lookup(keyword), Some(KeywordKind::Function))
    }
}

impl Default for KeywordRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keywords_resolve() {
        let registry = KeywordRegistry::builtin();
        assert_eq!(
            registry.lookup("allOf"),
            Some(KeywordKind::Operator(OperatorKind::AllOf))
        );
        assert_eq!(
            registry.lookup("equals"),
            Some(KeywordKind::Condition(ConditionKind::Equals))
        );
        assert_eq!(registry.lookup("where"), Some(KeywordKind::Subselector));
        assert_eq!(registry.lookup("$"), Some(KeywordKind::Function));
        assert_eq!(registry.lookup("field"), None);
    }

    #[test]
    fn test_keyword_case_matters() {
        let registry = KeywordRegistry::builtin();
        assert_eq!(registry.lookup("AllOf"), None);
        assert_eq!(registry.lookup("notequals"), None);
    }

    #[test]
    fn test_negated_conditions_pass_on_missing_field() {
        assert!(ConditionKind::NotEquals.passes_on_missing_field());
        assert!(ConditionKind::NotIn.passes_on_missing_field());
        assert!(!ConditionKind::Equals.passes_on_missing_field());
        assert!(!ConditionKind::Exists.passes_on_missing_field());
    }
}
