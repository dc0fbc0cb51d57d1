//! Consumer wrappers around a compiled expression: suppression groups and
//! selectors.

use crate::ast::Expression;
use crate::context::{ExpressionContext, MatchResult};
use crate::eval;
use chrono::{DateTime, Utc};
use verdict_value::TargetNode;

/// Identity of a target object being matched.
#[derive(Debug, Clone, Default)]
pub struct TargetInfo<'a> {
    pub object_type: Option<&'a str>,
    pub object_name: Option<&'a str>,
    pub rule: Option<&'a str>,
}

/// A suppression group: targets matching the expression are suppressed for
/// the named rules until the group expires.
#[derive(Debug, Clone)]
pub struct SuppressionMatcher {
    id: String,
    rules: Vec<String>,
    types: Vec<String>,
    expires_on: Option<DateTime<Utc>>,
    expression: Expression,
}

impl SuppressionMatcher {
    pub fn new(id: impl Into<String>, expression: Expression) -> Self {
        Self {
            id: id.into(),
            rules: Vec::new(),
            types: Vec::new(),
            expires_on: None,
            expression,
        }
    }

    /// Restrict the group to these rules. Empty means any rule.
    pub fn with_rules(mut self, rules: Vec<String>) -> Self {
        self.rules = rules;
        self
    }

    /// Restrict the group to these target types. Empty means any type.
    pub fn with_types(mut self, types: Vec<String>) -> Self {
        self.types = types;
        self
    }

    pub fn with_expiry(mut self, expires_on: DateTime<Utc>) -> Self {
        self.expires_on = Some(expires_on);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_on.is_some_and(|at| at <= now)
    }

    /// Whether this group suppresses `target`. An expired group never
    /// matches and never evaluates its expression.
    pub fn suppresses(&self, target: &TargetNode<'_>, info: &TargetInfo<'_>) -> bool {
        self.suppresses_at(target, info, Utc::now())
    }

    pub fn suppresses_at(
        &self,
        target: &TargetNode<'_>,
        info: &TargetInfo<'_>,
        now: DateTime<Utc>,
    ) -> bool {
        if self.is_expired(now) {
            log::debug!("suppression group '{}' has expired", self.id);
            return false;
        }
        if !name_applies(&self.rules, info.rule) || !name_applies(&self.types, info.object_type) {
            return false;
        }
        evaluate_for(&self.expression, target, info).passed()
    }
}

/// A named, reusable predicate over target objects.
#[derive(Debug, Clone)]
pub struct SelectorMatcher {
    name: String,
    expression: Expression,
}

impl SelectorMatcher {
    pub fn new(name: impl Into<String>, expression: Expression) -> Self {
        Self {
            name: name.into(),
            expression,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the selector matches `target`. Indeterminate verdicts count
    /// as no match.
    pub fn matches(&self, target: &TargetNode<'_>, info: &TargetInfo<'_>) -> bool {
        self.match_result(target, info).passed()
    }

    /// The full verdict with reasons, for diagnostics.
    pub fn match_result(&self, target: &TargetNode<'_>, info: &TargetInfo<'_>) -> MatchResult {
        evaluate_for(&self.expression, target, info)
    }
}

/// Case-insensitive membership check; an empty list applies to everything.
fn name_applies(names: &[String], candidate: Option<&str>) -> bool {
    if names.is_empty() {
        return true;
    }
    candidate.is_some_and(|c| names.iter().any(|n| n.eq_ignore_ascii_case(c)))
}

fn evaluate_for(
    expression: &Expression,
    target: &TargetNode<'_>,
    info: &TargetInfo<'_>,
) -> MatchResult {
    let mut ctx = ExpressionContext::new(target.clone());
    if let Some(t) = info.object_type {
        ctx = ctx.with_object_type(t);
    }
    if let Some(n) = info.object_name {
        ctx = ctx.with_object_name(n);
    }
    if let Some(r) = info.rule {
        ctx = ctx.with_rule(r);
    }
    eval::evaluate_with_reasons(expression, &mut ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::compile;
    use crate::registry::KeywordRegistry;
    use chrono::TimeZone;
    use serde_json::json;
    use verdict_value::Value;

    fn compile_rule(rule: serde_json::Value) -> Expression {
        compile(&Value::from_json(&rule), &KeywordRegistry::builtin()).unwrap()
    }

    #[test]
    fn test_expired_group_never_matches() {
        let target = Value::from_json(&json!({ "env": "test" }));
        let matcher = SuppressionMatcher::new(
            "ignore-test-env",
            compile_rule(json!({ "field": "env", "equals": "test" })),
        )
        .with_expiry(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let node = TargetNode::Tree(&target);
        let info = TargetInfo::default();
        let before = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert!(matcher.suppresses_at(&node, &info, before));
        assert!(!matcher.suppresses_at(&node, &info, after));
    }

    #[test]
    fn test_rule_and_type_filters() {
        let target = Value::from_json(&json!({ "env": "test" }));
        let matcher = SuppressionMatcher::new(
            "scoped",
            compile_rule(json!({ "field": "env", "equals": "test" })),
        )
        .with_rules(vec!["Std.MinReplicas".to_string()])
        .with_types(vec!["Service".to_string()]);
        let node = TargetNode::Tree(&target);
        let matching = TargetInfo {
            object_type: Some("service"),
            object_name: None,
            rule: Some("std.minreplicas"),
        };
        let wrong_rule = TargetInfo {
            object_type: Some("Service"),
            object_name: None,
            rule: Some("Std.Other"),
        };
        assert!(matcher.suppresses(&node, &matching));
        assert!(!matcher.suppresses(&node, &wrong_rule));
    }

    #[test]
    fn test_selector_indeterminate_is_no_match() {
        let target = Value::from_json(&json!({ "containers": [{ "kind": "init" }] }));
        let selector = SelectorMatcher::new(
            "has-app-containers",
            compile_rule(json!({
                "field": "containers",
                "where": { "field": "kind", "equals": "app" },
                "exists": true
            })),
        );
        let node = TargetNode::Tree(&target);
        let result = selector.match_result(&node, &TargetInfo::default());
        assert_eq!(result.value, None);
        assert!(!selector.matches(&node, &TargetInfo::default()));
    }

    #[test]
    fn test_selector_reports_reasons() {
        let target = Value::from_json(&json!({ "replicas": 1 }));
        let selector = SelectorMatcher::new(
            "enough-replicas",
            compile_rule(json!({ "field": "replicas", "greaterOrEquals": 2 })),
        );
        let node = TargetNode::Tree(&target);
        let result = selector.match_result(&node, &TargetInfo::default());
        assert_eq!(result.value, Some(false));
        assert_eq!(result.reasons.len(), 1);
        assert_eq!(result.reasons[0].operand(), "replicas");
    }
}
