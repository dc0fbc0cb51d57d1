//! Condition predicates.
//!
//! Each predicate receives the resolved operand (or `None` when the field
//! is missing) and the node's property bag. Failures record a reason
//! against the operand path; malformed expected values fail the condition
//! rather than raising.

use crate::ast::{ConditionExpr, PropertyValue};
use crate::context::ExpressionContext;
use crate::functions;
use crate::helpers;
use crate::registry::ConditionKind;
use verdict_value::{TargetNode, Value};

pub(crate) fn check(
    cond: &ConditionExpr,
    operand_path: &str,
    value: Option<&Value>,
    ctx: &mut ExpressionContext<'_>,
    target: &TargetNode<'_>,
) -> Option<bool> {
    let case_sensitive = cond.properties.get_bool("caseSensitive").unwrap_or(false);
    let convert = cond.properties.get_bool("convert").unwrap_or(false);
    let keyword = cond.kind.keyword();

    // Existence-flavored predicates look at presence itself.
    match cond.kind {
        ConditionKind::Exists => {
            let Some(expected) = expected_bool(cond, keyword, ctx, target) else {
                return invalid(ctx, operand_path, keyword);
            };
            let pass = expected == value.is_some();
            if !pass {
                let text = if expected {
                    format!("The field '{operand_path}' does not exist.")
                } else {
                    format!("The field '{operand_path}' exists.")
                };
                ctx.reason(operand_path, text);
            }
            return Some(pass);
        }
        ConditionKind::HasValue => {
            let Some(expected) = expected_bool(cond, keyword, ctx, target) else {
                return invalid(ctx, operand_path, keyword);
            };
            let pass = expected != helpers::null_or_empty(value);
            if !pass {
                let text = if expected {
                    format!("The field '{operand_path}' has no value.")
                } else {
                    format!("The field '{operand_path}' has a value.")
                };
                ctx.reason(operand_path, text);
            }
            return Some(pass);
        }
        ConditionKind::HasDefault => {
            // An absent field is treated as holding its default.
            let Some(actual) = value else {
                return Some(true);
            };
            let Some(expected) = expected_value(cond, keyword, ctx, target) else {
                return invalid(ctx, operand_path, keyword);
            };
            let pass = helpers::equal(&expected, actual, case_sensitive, false, convert);
            if !pass {
                ctx.reason(
                    operand_path,
                    format!("The field '{operand_path}' is set to '{actual}'."),
                );
            }
            return Some(pass);
        }
        _ => {}
    }

    let Some(actual) = value else {
        if cond.kind.passes_on_missing_field() {
            return Some(true);
        }
        ctx.reason(
            operand_path,
            format!("The field '{operand_path}' does not exist."),
        );
        return Some(false);
    };

    let pass = match cond.kind {
        ConditionKind::Equals | ConditionKind::NotEquals => {
            let Some(expected) = expected_value(cond, keyword, ctx, target) else {
                return invalid(ctx, operand_path, keyword);
            };
            let equal = helpers::equal(&expected, actual, case_sensitive, false, convert);
            equal == (cond.kind == ConditionKind::Equals)
        }
        ConditionKind::Match | ConditionKind::NotMatch => {
            let Some(pattern) = expected_string(cond, keyword, ctx, target) else {
                return invalid(ctx, operand_path, keyword);
            };
            let matched = helpers::to_string_value(actual, convert)
                .is_some_and(|s| helpers::regex_match(&pattern, &s, case_sensitive));
            matched == (cond.kind == ConditionKind::Match)
        }
        ConditionKind::In | ConditionKind::NotIn => {
            let Some(set) = expected_value(cond, keyword, ctx, target) else {
                return invalid(ctx, operand_path, keyword);
            };
            helpers::in_set(actual, &set, case_sensitive) == (cond.kind == ConditionKind::In)
        }
        ConditionKind::Less
        | ConditionKind::LessOrEquals
        | ConditionKind::Greater
        | ConditionKind::GreaterOrEquals => {
            let Some(bound) = expected_value(cond, keyword, ctx, target) else {
                return invalid(ctx, operand_path, keyword);
            };
            let Some(ordering) = helpers::compare(actual, &bound, convert) else {
                return invalid(ctx, operand_path, keyword);
            };
            match cond.kind {
                ConditionKind::Less => ordering.is_lt(),
                ConditionKind::LessOrEquals => ordering.is_le(),
                ConditionKind::Greater => ordering.is_gt(),
                _ => ordering.is_ge(),
            }
        }
        ConditionKind::StartsWith | ConditionKind::NotStartsWith => {
            match string_check(cond, keyword, actual, ctx, target, case_sensitive, convert, helpers::str_starts_with) {
                Some(matched) => matched == (cond.kind == ConditionKind::StartsWith),
                None => return invalid(ctx, operand_path, keyword),
            }
        }
        ConditionKind::EndsWith | ConditionKind::NotEndsWith => {
            match string_check(cond, keyword, actual, ctx, target, case_sensitive, convert, helpers::str_ends_with) {
                Some(matched) => matched == (cond.kind == ConditionKind::EndsWith),
                None => return invalid(ctx, operand_path, keyword),
            }
        }
        ConditionKind::Contains | ConditionKind::NotContains => {
            match string_check(cond, keyword, actual, ctx, target, case_sensitive, convert, helpers::str_contains) {
                Some(matched) => matched == (cond.kind == ConditionKind::Contains),
                None => return invalid(ctx, operand_path, keyword),
            }
        }
        ConditionKind::Like | ConditionKind::NotLike => {
            let like = string_check(cond, keyword, actual, ctx, target, case_sensitive, convert, |a, p, cs| {
                helpers::like_match(p, a, cs)
            });
            match like {
                Some(matched) => matched == (cond.kind == ConditionKind::Like),
                None => return invalid(ctx, operand_path, keyword),
            }
        }
        ConditionKind::Count | ConditionKind::NotCount => {
            let Some(expected) = expected_i64(cond, keyword, ctx, target) else {
                return invalid(ctx, operand_path, keyword);
            };
            let Some(items) = actual.as_sequence() else {
                return invalid(ctx, operand_path, keyword);
            };
            (items.len() as i64 == expected) == (cond.kind == ConditionKind::Count)
        }
        ConditionKind::SetOf | ConditionKind::Subset => {
            let Some(expected) = expected_value(cond, keyword, ctx, target) else {
                return invalid(ctx, operand_path, keyword);
            };
            let (Some(expected), Some(items)) = (expected.as_sequence(), actual.as_sequence())
            else {
                return invalid(ctx, operand_path, keyword);
            };
            let unique = cond.properties.get_bool("unique").unwrap_or(false);
            let counts_ok = expected.iter().all(|e| {
                let n = helpers::count_of(items, e, case_sensitive);
                if cond.kind == ConditionKind::Subset && unique {
                    n == 1
                } else {
                    n >= 1
                }
            });
            // setOf is an exact unordered match, subset allows extras.
            counts_ok && (cond.kind != ConditionKind::SetOf || items.len() == expected.len())
        }
        ConditionKind::IsString
        | ConditionKind::IsArray
        | ConditionKind::IsBoolean
        | ConditionKind::IsInteger
        | ConditionKind::IsNumeric
        | ConditionKind::IsLower
        | ConditionKind::IsUpper => {
            let is = match cond.kind {
                ConditionKind::IsString => matches!(actual, Value::String(_)),
                ConditionKind::IsArray => matches!(actual, Value::Sequence(_)),
                ConditionKind::IsBoolean => {
                    matches!(actual, Value::Bool(_))
                        || (convert && helpers::to_bool(actual, true).is_some())
                }
                ConditionKind::IsInteger => {
                    matches!(actual, Value::Int(_))
                        || (convert && helpers::to_i64(actual, true).is_some())
                }
                ConditionKind::IsNumeric => {
                    matches!(actual, Value::Int(_) | Value::Float(_))
                        || (convert && helpers::to_f64(actual, true).is_some())
                }
                ConditionKind::IsLower => actual.as_str().is_some_and(helpers::is_lower),
                _ => actual.as_str().is_some_and(helpers::is_upper),
            };
            match expected_bool(cond, keyword, ctx, target) {
                Some(expected) => is == expected,
                None => return invalid(ctx, operand_path, keyword),
            }
        }
        ConditionKind::Version => {
            let Some(constraint) = expected_value(cond, keyword, ctx, target) else {
                return invalid(ctx, operand_path, keyword);
            };
            let include_prerelease = cond
                .properties
                .get_bool("includePrerelease")
                .unwrap_or(false);
            actual
                .as_str()
                .is_some_and(|v| helpers::version_match(v, &constraint, include_prerelease))
        }
        // Handled above.
        ConditionKind::Exists | ConditionKind::HasValue | ConditionKind::HasDefault => {
            return Some(false);
        }
    };

    if !pass {
        ctx.reason(
            operand_path,
            format!("The field '{operand_path}' is set to '{actual}'."),
        );
    }
    Some(pass)
}

/// Resolve the expected value for `key`, evaluating function-valued
/// properties against the current target.
fn expected_value(
    cond: &ConditionExpr,
    key: &str,
    ctx: &ExpressionContext<'_>,
    target: &TargetNode<'_>,
) -> Option<Value> {
    match cond.properties.get(key)? {
        PropertyValue::Literal(v) => Some(v.clone()),
        PropertyValue::Function(call) => functions::invoke(call, ctx, target),
    }
}

fn expected_bool(
    cond: &ConditionExpr,
    key: &str,
    ctx: &ExpressionContext<'_>,
    target: &TargetNode<'_>,
) -> Option<bool> {
    helpers::to_bool(&expected_value(cond, key, ctx, target)?, true)
}

fn expected_i64(
    cond: &ConditionExpr,
    key: &str,
    ctx: &ExpressionContext<'_>,
    target: &TargetNode<'_>,
) -> Option<i64> {
    helpers::to_i64(&expected_value(cond, key, ctx, target)?, true)
}

fn expected_string(
    cond: &ConditionExpr,
    key: &str,
    ctx: &ExpressionContext<'_>,
    target: &TargetNode<'_>,
) -> Option<String> {
    helpers::to_string_value(&expected_value(cond, key, ctx, target)?, true)
}

/// A malformed or unresolvable expected value fails the condition.
fn invalid(ctx: &mut ExpressionContext<'_>, operand_path: &str, keyword: &str) -> Option<bool> {
    ctx.reason(
        operand_path,
        format!("The '{keyword}' comparison has an invalid value for field '{operand_path}'."),
    );
    Some(false)
}

/// True when the actual string matches any of the expected strings under
/// `matcher`. The expected value may be a single string or a list.
#[allow(clippy::too_many_arguments)]
fn string_check(
    cond: &ConditionExpr,
    keyword: &str,
    actual: &Value,
    ctx: &ExpressionContext<'_>,
    target: &TargetNode<'_>,
    case_sensitive: bool,
    convert: bool,
    matcher: fn(&str, &str, bool) -> bool,
) -> Option<bool> {
    let expected = expected_value(cond, keyword, ctx, target)?;
    let Some(actual) = helpers::to_string_value(actual, convert) else {
        return Some(false);
    };
    let matched = match &expected {
        Value::Sequence(items) => items
            .iter()
            .filter_map(Value::as_str)
            .any(|p| matcher(&actual, p, case_sensitive)),
        _ => expected
            .as_str()
            .is_some_and(|p| matcher(&actual, p, case_sensitive)),
    };
    Some(matched)
}
