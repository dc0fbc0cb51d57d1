//! Comparison and conversion helpers shared by condition predicates.
//!
//! Condition equality is looser than path-filter equality: the `convert`
//! modifier allows scalars to be coerced toward the other side's type, and
//! string comparison is case-insensitive unless `caseSensitive` is set.

use regex::RegexBuilder;
use semver::{Version, VersionReq};
use std::cmp::Ordering;
use verdict_value::Value;

/// String view of a scalar. Numbers and booleans render only when `convert`
/// is set.
pub(crate) fn to_string_value(value: &Value, convert: bool) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Int(_) | Value::Float(_) | Value::Bool(_) if convert => Some(value.to_string()),
        _ => None,
    }
}

pub(crate) fn to_f64(value: &Value, convert: bool) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::String(s) if convert => s.trim().parse().ok(),
        Value::Bool(b) if convert => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

pub(crate) fn to_i64(value: &Value, convert: bool) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
        Value::String(s) if convert => s.trim().parse().ok(),
        Value::Bool(b) if convert => Some(i64::from(*b)),
        _ => None,
    }
}

pub(crate) fn to_bool(value: &Value, convert: bool) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if convert => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Value::Int(i) if convert => Some(*i != 0),
        _ => None,
    }
}

pub(crate) fn str_eq(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.eq_ignore_ascii_case(b)
    }
}

/// Loose equality between an expected value and an actual value.
///
/// Same-typed scalars compare directly (numbers across int/float). When the
/// types differ, `convert_actual` coerces the actual value toward the
/// expected type and `convert_expected` the other way around. Sequences
/// compare element-wise in order.
pub(crate) fn equal(
    expected: &Value,
    actual: &Value,
    case_sensitive: bool,
    convert_expected: bool,
    convert_actual: bool,
) -> bool {
    match (expected, actual) {
        (Value::Sequence(e), Value::Sequence(a)) => {
            e.len() == a.len()
                && e.iter()
                    .zip(a)
                    .all(|(x, y)| equal(x, y, case_sensitive, convert_expected, convert_actual))
        }
        // Maps compare entry-wise; key lookup follows the case flag.
        (Value::Map(e), Value::Map(a)) => {
            e.len() == a.len()
                && e.iter().all(|(key, ev)| {
                    let av = if case_sensitive {
                        actual.get(key)
                    } else {
                        actual.get_insensitive(key)
                    };
                    av.is_some_and(|av| {
                        equal(ev, av, case_sensitive, convert_expected, convert_actual)
                    })
                })
        }
        (Value::Null, _) => actual.is_null(),
        (Value::String(e), Value::String(a)) => str_eq(e, a, case_sensitive),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            expected.as_f64() == actual.as_f64()
        }
        (Value::Bool(e), Value::Bool(a)) => e == a,
        (Value::String(e), _) => {
            to_string_value(actual, convert_actual).is_some_and(|a| str_eq(e, &a, case_sensitive))
        }
        (Value::Int(_) | Value::Float(_), _) => matches!(
            (expected.as_f64(), to_f64(actual, convert_actual)),
            (Some(e), Some(a)) if e == a
        ),
        (Value::Bool(e), _) => to_bool(actual, convert_actual) == Some(*e),
        (_, Value::String(a)) if convert_expected => {
            to_string_value(expected, true).is_some_and(|e| str_eq(&e, a, case_sensitive))
        }
        _ => false,
    }
}

/// Ordering of an actual value against an expected numeric bound. Strings
/// parse as numbers under `convert`, otherwise their character count is
/// compared; sequences compare by element count.
pub(crate) fn compare(actual: &Value, expected: &Value, convert: bool) -> Option<Ordering> {
    let bound = to_f64(expected, true)?;
    let measure = match actual {
        Value::Int(_) | Value::Float(_) => actual.as_f64()?,
        Value::String(s) => match to_f64(actual, convert) {
            Some(n) => n,
            None => s.chars().count() as f64,
        },
        Value::Sequence(items) => items.len() as f64,
        _ => return None,
    };
    measure.partial_cmp(&bound)
}

/// True when `expected` equals `actual` or, for sequence-valued fields, any
/// of its elements.
pub(crate) fn any_value(actual: &Value, expected: &Value, case_sensitive: bool) -> bool {
    match actual.as_sequence() {
        Some(items) => items
            .iter()
            .any(|item| equal(expected, item, case_sensitive, false, false)),
        None => equal(expected, actual, case_sensitive, false, false),
    }
}

/// Membership of `actual` in a set of candidate values.
pub(crate) fn in_set(actual: &Value, set: &Value, case_sensitive: bool) -> bool {
    match set.as_sequence() {
        Some(items) => items
            .iter()
            .any(|expected| any_value(actual, expected, case_sensitive)),
        None => any_value(actual, set, case_sensitive),
    }
}

/// How many elements of `items` equal `expected`.
pub(crate) fn count_of(items: &[Value], expected: &Value, case_sensitive: bool) -> usize {
    items
        .iter()
        .filter(|item| equal(expected, item, case_sensitive, false, false))
        .count()
}

/// Missing, null and empty values all count as "no value".
pub(crate) fn null_or_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Sequence(items)) => items.is_empty(),
        Some(Value::Map(entries)) => entries.is_empty(),
        Some(_) => false,
    }
}

pub(crate) fn regex_match(pattern: &str, actual: &str, case_sensitive: bool) -> bool {
    RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
        .map(|re| re.is_match(actual))
        .unwrap_or(false)
}

/// Wildcard match: `*` spans any run of characters, `?` one character.
pub(crate) fn like_match(pattern: &str, actual: &str, case_sensitive: bool) -> bool {
    let translated = regex::escape(pattern).replace("\\*", ".*").replace("\\?", ".");
    regex_match(&format!("^{translated}$"), actual, case_sensitive)
}

pub(crate) fn str_starts_with(actual: &str, prefix: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        actual.starts_with(prefix)
    } else {
        actual
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    }
}

pub(crate) fn str_ends_with(actual: &str, suffix: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        actual.ends_with(suffix)
    } else {
        actual
            .len()
            .checked_sub(suffix.len())
            .and_then(|at| actual.get(at..))
            .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
    }
}

pub(crate) fn str_contains(actual: &str, needle: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        actual.contains(needle)
    } else {
        actual
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
    }
}

/// Match a version string against a semver requirement. A boolean `true`
/// constraint accepts any parseable version. Pre-release versions only
/// match when `include_prerelease` is set or the requirement itself names
/// a pre-release.
pub(crate) fn version_match(actual: &str, constraint: &Value, include_prerelease: bool) -> bool {
    let Ok(version) = Version::parse(actual.trim()) else {
        return false;
    };
    match constraint {
        Value::Bool(true) => true,
        Value::String(req) => {
            let Ok(req) = VersionReq::parse(req) else {
                return false;
            };
            if req.matches(&version) {
                return true;
            }
            if include_prerelease && !version.pre.is_empty() {
                let mut stable = version.clone();
                stable.pre = semver::Prerelease::EMPTY;
                return req.matches(&stable);
            }
            false
        }
        _ => false,
    }
}

pub(crate) fn is_lower(s: &str) -> bool {
    s.chars().all(|c| !c.is_alphabetic() || c.is_lowercase())
}

pub(crate) fn is_upper(s: &str) -> bool {
    s.chars().all(|c| !c.is_alphabetic() || c.is_uppercase())
}
