//! Expression tree evaluation.
//!
//! Verdicts are three-valued: `Some(true)`, `Some(false)`, or `None` for
//! indeterminate. `allOf` short-circuits on the first false child and is
//! indeterminate when any remaining child is; `anyOf` short-circuits on
//! the first true child and is indeterminate when any child is while none
//! is true. Runtime problems never raise, they fold into a failing or
//! indeterminate verdict.

use crate::ast::{
    ConditionExpr, Expression, FieldSource, OperandSource, OperatorExpr, PropertyBag,
    PropertyValue,
};
use crate::conditions;
use crate::context::{ExpressionContext, MatchResult};
use crate::functions;
use crate::registry::OperatorKind;
use verdict_value::{TargetNode, Value};

/// Evaluate `expr` against the context's bound target.
pub fn evaluate(expr: &Expression, ctx: &mut ExpressionContext<'_>) -> Option<bool> {
    let target = ctx.target();
    eval_expression(expr, ctx, &target)
}

/// Evaluate and collect the verdict together with all recorded reasons.
pub fn evaluate_with_reasons(expr: &Expression, ctx: &mut ExpressionContext<'_>) -> MatchResult {
    let value = evaluate(expr, ctx);
    MatchResult {
        value,
        reasons: ctx.take_reasons(),
    }
}

fn eval_expression<'a>(
    expr: &Expression,
    ctx: &mut ExpressionContext<'a>,
    target: &TargetNode<'a>,
) -> Option<bool> {
    match expr {
        Expression::Operator(op) => eval_operator(op, ctx, target),
        Expression::Condition(cond) => eval_condition(cond, ctx, target),
    }
}

fn eval_operator<'a>(
    op: &OperatorExpr,
    ctx: &mut ExpressionContext<'a>,
    target: &TargetNode<'a>,
) -> Option<bool> {
    match &op.field {
        Some(field) => eval_operator_per_element(op, field, ctx, target),
        None => eval_operator_once(op, ctx, target),
    }
}

fn eval_operator_once<'a>(
    op: &OperatorExpr,
    ctx: &mut ExpressionContext<'a>,
    target: &TargetNode<'a>,
) -> Option<bool> {
    match op.kind {
        // An if with no body holds vacuously.
        OperatorKind::If => match op.children.first() {
            Some(child) => eval_expression(child, ctx, target),
            None => Some(true),
        },
        OperatorKind::Not => match op.children.first() {
            Some(child) => eval_expression(child, ctx, target).map(|b| !b),
            None => Some(false),
        },
        OperatorKind::AllOf => {
            let mut indeterminate = false;
            for child in &op.children {
                match eval_expression(child, ctx, target) {
                    Some(false) => return Some(false),
                    None => indeterminate = true,
                    Some(true) => {}
                }
            }
            if indeterminate { None } else { Some(true) }
        }
        OperatorKind::AnyOf => {
            let mut indeterminate = false;
            for child in &op.children {
                match eval_expression(child, ctx, target) {
                    Some(true) => return Some(true),
                    None => indeterminate = true,
                    Some(false) => {}
                }
            }
            if indeterminate { None } else { Some(false) }
        }
    }
}

/// An operator bound to a field runs its body once per field element,
/// optionally filtered by the subselector and checked against a quantifier.
fn eval_operator_per_element<'a>(
    op: &OperatorExpr,
    field: &FieldSource,
    ctx: &mut ExpressionContext<'a>,
    target: &TargetNode<'a>,
) -> Option<bool> {
    let quantifier = Quantifier::from_properties(&op.properties);
    let mut pass: i64 = 0;
    if let Some(items) = field_elements(field, target) {
        for item in items {
            if let Some(sub) = &op.subselector {
                // An indeterminate subselector keeps the element.
                if !eval_expression(sub, ctx, &item).unwrap_or(true) {
                    continue;
                }
            }
            if eval_operator_once(op, ctx, &item).unwrap_or(false) {
                pass += 1;
            } else if quantifier.is_none() {
                return Some(false);
            }
        }
    }
    match quantifier {
        None => Some(true),
        Some(q) => {
            let ok = q.holds(pass);
            if !ok {
                ctx.reason(
                    field.path(),
                    format!(
                        "The number of matching elements in '{}' was {pass}.",
                        field.path()
                    ),
                );
            }
            Some(ok)
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Quantifier {
    Count(i64),
    Less(i64),
    LessOrEquals(i64),
    Greater(i64),
    GreaterOrEquals(i64),
}

impl Quantifier {
    fn from_properties(properties: &PropertyBag) -> Option<Self> {
        if let Some(n) = properties.get_i64("count") {
            return Some(Quantifier::Count(n));
        }
        if let Some(n) = properties.get_i64("less") {
            return Some(Quantifier::Less(n));
        }
        // Both spellings of the bound properties are accepted.
        if let Some(n) = properties
            .get_i64("lessOrEquals")
            .or_else(|| properties.get_i64("lessOrEqual"))
        {
            return Some(Quantifier::LessOrEquals(n));
        }
        if let Some(n) = properties.get_i64("greater") {
            return Some(Quantifier::Greater(n));
        }
        if let Some(n) = properties
            .get_i64("greaterOrEquals")
            .or_else(|| properties.get_i64("greaterOrEqual"))
        {
            return Some(Quantifier::GreaterOrEquals(n));
        }
        None
    }

    fn holds(&self, pass: i64) -> bool {
        match self {
            Quantifier::Count(n) => pass == *n,
            Quantifier::Less(n) => pass < *n,
            Quantifier::LessOrEquals(n) => pass <= *n,
            Quantifier::Greater(n) => pass > *n,
            Quantifier::GreaterOrEquals(n) => pass >= *n,
        }
    }
}

/// Resolve a field to the elements an operator or subselector iterates: a
/// sequence-valued field yields its elements, anything else a single node.
fn field_elements<'a>(
    field: &FieldSource,
    target: &TargetNode<'a>,
) -> Option<Vec<TargetNode<'a>>> {
    match field {
        FieldSource::Member(name) => {
            let node = target.member(name, false)?;
            Some(node.elements().unwrap_or_else(|| vec![node]))
        }
        FieldSource::Path(expr) => {
            let nodes = expr.get(target, false)?;
            if let [single] = nodes.as_slice()
                && let Some(items) = single.elements()
            {
                return Some(items);
            }
            Some(nodes)
        }
    }
}

fn eval_condition<'a>(
    cond: &ConditionExpr,
    ctx: &mut ExpressionContext<'a>,
    target: &TargetNode<'a>,
) -> Option<bool> {
    match &cond.operand {
        Some(OperandSource::Field(field)) => {
            if let Some(sub) = &cond.subselector {
                return eval_condition_filtered(cond, field, sub, ctx, target);
            }
            let (path, value) = resolve_field_value(field, target);
            conditions::check(cond, &path, value.as_ref(), ctx, target)
        }
        Some(OperandSource::Value) => {
            let value = match cond.properties.get("value") {
                Some(PropertyValue::Literal(v)) => Some(v.clone()),
                Some(PropertyValue::Function(call)) => functions::invoke(call, ctx, target),
                None => None,
            };
            conditions::check(cond, "value", value.as_ref(), ctx, target)
        }
        Some(OperandSource::Type) => {
            let value = ctx.object_type().map(|t| Value::String(t.to_string()));
            conditions::check(cond, "type", value.as_ref(), ctx, target)
        }
        Some(OperandSource::Name) => {
            let value = ctx.object_name().map(|n| Value::String(n.to_string()));
            conditions::check(cond, "name", value.as_ref(), ctx, target)
        }
        // Without an operand the predicate applies to the whole object.
        None => {
            let value = target.to_value();
            conditions::check(cond, "$", Some(&value), ctx, target)
        }
    }
}

/// A condition with a subselector is existential: it holds as soon as any
/// element surviving the subselector satisfies the predicate. The verdict
/// is indeterminate when the subselector filters every element out.
fn eval_condition_filtered<'a>(
    cond: &ConditionExpr,
    field: &FieldSource,
    sub: &Expression,
    ctx: &mut ExpressionContext<'a>,
    target: &TargetNode<'a>,
) -> Option<bool> {
    let Some(items) = field_elements(field, target) else {
        return conditions::check(cond, field.path(), None, ctx, target);
    };
    let mut survived = false;
    let mut passed = false;
    for item in items {
        if !eval_expression(sub, ctx, &item).unwrap_or(true) {
            continue;
        }
        survived = true;
        let value = item.to_value();
        if conditions::check(cond, field.path(), Some(&value), ctx, target)? {
            passed = true;
            break;
        }
    }
    if survived { Some(passed) } else { None }
}

fn resolve_field_value(field: &FieldSource, target: &TargetNode<'_>) -> (String, Option<Value>) {
    match field {
        FieldSource::Member(name) => (
            name.clone(),
            target.member(name, false).map(|node| node.to_value()),
        ),
        FieldSource::Path(expr) => (expr.path().to_string(), expr.evaluate(target, false)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::compile;
    use crate::registry::KeywordRegistry;
    use serde_json::json;

    fn run(rule: serde_json::Value, target: serde_json::Value) -> Option<bool> {
        let expr = compile(&Value::from_json(&rule), &KeywordRegistry::builtin()).unwrap();
        let target = Value::from_json(&target);
        let mut ctx = ExpressionContext::new(&target);
        evaluate(&expr, &mut ctx)
    }

    #[test]
    fn test_empty_document_is_true() {
        assert_eq!(run(json!({}), json!({ "a": 1 })), Some(true));
    }

    #[test]
    fn test_all_of_empty_is_true() {
        assert_eq!(run(json!({ "allOf": [] }), json!({})), Some(true));
    }

    #[test]
    fn test_any_of_empty_is_false() {
        assert_eq!(run(json!({ "anyOf": [] }), json!({})), Some(false));
    }

    #[test]
    fn test_all_of_short_circuits_on_false() {
        let rule = json!({ "allOf": [
            { "field": "a", "equals": 1 },
            { "field": "missing", "equals": 2 }
        ]});
        assert_eq!(run(rule, json!({ "a": 2 })), Some(false));
    }

    #[test]
    fn test_double_negation_round_trips() {
        let inner = json!({ "field": "a", "equals": 1 });
        let double = json!({ "not": { "not": inner.clone() } });
        for target in [json!({ "a": 1 }), json!({ "a": 2 })] {
            assert_eq!(run(double.clone(), target.clone()), run(inner.clone(), target));
        }
    }

    #[test]
    fn test_negated_condition_passes_on_missing_field() {
        assert_eq!(
            run(json!({ "field": "missing", "notEquals": 1 }), json!({})),
            Some(true)
        );
        assert_eq!(
            run(json!({ "field": "missing", "equals": 1 }), json!({})),
            Some(false)
        );
    }

    #[test]
    fn test_quantifier_counts_matching_elements() {
        let rule = json!({
            "field": "containers",
            "greaterOrEquals": 2,
            "allOf": [{ "field": "image", "exists": true }]
        });
        let target = json!({ "containers": [
            { "image": "a" }, { "image": "b" }, { "name": "c" }
        ]});
        assert_eq!(run(rule.clone(), target), Some(true));
        let too_few = json!({ "containers": [{ "image": "a" }, { "name": "c" }] });
        assert_eq!(run(rule, too_few), Some(false));
    }

    #[test]
    fn test_field_operator_without_quantifier_requires_all() {
        let rule = json!({
            "field": "containers",
            "allOf": [{ "field": "image", "exists": true }]
        });
        let ok = json!({ "containers": [{ "image": "a" }, { "image": "b" }] });
        let bad = json!({ "containers": [{ "image": "a" }, { "name": "c" }] });
        assert_eq!(run(rule.clone(), ok), Some(true));
        assert_eq!(run(rule, bad), Some(false));
    }

    #[test]
    fn test_missing_field_operator_without_quantifier_is_vacuous() {
        let rule = json!({
            "field": "containers",
            "allOf": [{ "field": "image", "exists": true }]
        });
        assert_eq!(run(rule, json!({})), Some(true));
    }

    #[test]
    fn test_subselector_filters_elements() {
        let rule = json!({
            "field": "containers",
            "where": { "field": "kind", "notEquals": "init" },
            "allOf": [{ "field": "image", "exists": true }]
        });
        let target = json!({ "containers": [
            { "kind": "init", "name": "setup" },
            { "kind": "app", "image": "api" }
        ]});
        assert_eq!(run(rule, target), Some(true));
    }

    #[test]
    fn test_condition_subselector_is_existential() {
        let rule = json!({
            "field": "items",
            "where": { "field": "v", "exists": true },
            "equals": { "v": 1 }
        });
        // One qualifying element satisfying the predicate is enough.
        assert_eq!(
            run(rule.clone(), json!({ "items": [{ "v": 1 }, { "v": 2 }] })),
            Some(true)
        );
        assert_eq!(
            run(rule, json!({ "items": [{ "v": 3 }, { "v": 2 }] })),
            Some(false)
        );
    }

    #[test]
    fn test_condition_subselector_with_no_survivors_is_indeterminate() {
        let rule = json!({
            "field": "containers",
            "where": { "field": "kind", "equals": "app" },
            "exists": true
        });
        assert_eq!(
            run(rule, json!({ "containers": [{ "kind": "init" }] })),
            None
        );
    }

    #[test]
    fn test_any_of_with_indeterminate_branch() {
        let rule = json!({ "anyOf": [
            {
                "field": "containers",
                "where": { "field": "kind", "equals": "app" },
                "exists": true
            },
            { "field": "missing", "equals": 1 }
        ]});
        // One branch indeterminate, the other false: indeterminate overall.
        assert_eq!(
            run(rule, json!({ "containers": [{ "kind": "init" }] })),
            None
        );
    }

    #[test]
    fn test_type_and_name_operands() {
        let rule = json!({ "allOf": [
            { "type": ".", "equals": "Service" },
            { "name": ".", "startsWith": "api-" }
        ]});
        let expr = compile(&Value::from_json(&rule), &KeywordRegistry::builtin()).unwrap();
        let target = Value::Map(Vec::new());
        let mut ctx = ExpressionContext::new(&target)
            .with_object_type("Service")
            .with_object_name("api-gateway");
        assert_eq!(evaluate(&expr, &mut ctx), Some(true));
    }

    #[test]
    fn test_failure_records_deduplicated_reasons() {
        let rule = json!({ "allOf": [
            { "anyOf": [
                { "field": "replicas", "greaterOrEquals": 2 },
                { "field": "replicas", "greaterOrEquals": 3 }
            ]},
            { "field": "replicas", "greaterOrEquals": 2 }
        ]});
        let expr = compile(&Value::from_json(&rule), &KeywordRegistry::builtin()).unwrap();
        let target = Value::from_json(&json!({ "replicas": 1 }));
        let mut ctx = ExpressionContext::new(&target);
        let result = evaluate_with_reasons(&expr, &mut ctx);
        assert_eq!(result.value, Some(false));
        // Both branches raise the same reason for the same operand once.
        assert_eq!(result.reasons.len(), 1);
        assert_eq!(result.reasons[0].operand(), "replicas");
    }

    #[test]
    fn test_function_value_in_condition() {
        let rule = json!({
            "field": "name",
            "equals": { "$": { "concat": [{ "path": "prefix" }, { "string": "-api" }] } }
        });
        let target = json!({ "prefix": "team", "name": "team-api" });
        assert_eq!(run(rule, target), Some(true));
    }

    #[test]
    fn test_value_operand_source() {
        let rule = json!({
            "value": { "$": { "path": "metadata.name" } },
            "startsWith": "api-"
        });
        assert_eq!(
            run(rule, json!({ "metadata": { "name": "api-gateway" } })),
            Some(true)
        );
    }

    #[test]
    fn test_eval_problems_fold_into_false() {
        // Comparing a map against a numeric bound cannot be ordered.
        let rule = json!({ "field": "spec", "greater": 1 });
        assert_eq!(run(rule, json!({ "spec": { "a": 1 } })), Some(false));
    }
}
