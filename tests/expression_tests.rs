//! End-to-end expression compilation and evaluation.

use serde_json::json;
use verdict::{
    Expression, ExpressionContext, OperatorKind, Value, compile_json, evaluate,
    evaluate_with_reasons,
};

fn run(rule: serde_json::Value, target: serde_json::Value) -> Option<bool> {
    let _ = env_logger::builder().is_test(true).try_init();
    let expr = compile_json(&rule).unwrap();
    let target = Value::from_json(&target);
    let mut ctx = ExpressionContext::new(&target);
    evaluate(&expr, &mut ctx)
}

#[test]
fn test_compiled_tree_mirrors_document_structure() {
    let rule = json!({ "allOf": [
        { "field": "a", "equals": 1 },
        { "anyOf": [
            { "field": "b", "exists": true },
            { "not": { "field": "c", "exists": true } }
        ]}
    ]});
    let expr = compile_json(&rule).unwrap();
    // The document compiles under an implicit `if` wrapper.
    let Expression::Operator(wrapper) = &expr else {
        panic!("expected operator root");
    };
    assert_eq!(wrapper.kind, OperatorKind::If);
    let Expression::Operator(all) = &wrapper.children[0] else {
        panic!("expected allOf");
    };
    assert_eq!(all.kind, OperatorKind::AllOf);
    assert_eq!(all.children.len(), 2);
    let Expression::Operator(any) = &all.children[1] else {
        panic!("expected anyOf");
    };
    assert_eq!(any.kind, OperatorKind::AnyOf);
    assert_eq!(any.children.len(), 2);
    assert!(matches!(&any.children[0], Expression::Condition(_)));
    let Expression::Operator(not) = &any.children[1] else {
        panic!("expected not");
    };
    assert_eq!(not.kind, OperatorKind::Not);
}

#[test]
fn test_evaluation_is_idempotent() {
    let rule = json!({ "anyOf": [
        { "field": "kind", "equals": "Service" },
        { "field": "kind", "equals": "Deployment" }
    ]});
    let expr = compile_json(&rule).unwrap();
    let target = Value::from_json(&json!({ "kind": "Service" }));
    let mut first = ExpressionContext::new(&target);
    let mut second = ExpressionContext::new(&target);
    assert_eq!(evaluate(&expr, &mut first), evaluate(&expr, &mut second));
    assert_eq!(evaluate(&expr, &mut first), Some(true));
}

#[test]
fn test_string_conditions() {
    let target = json!({ "name": "api-gateway-prod" });
    assert_eq!(run(json!({ "field": "name", "startsWith": "api-" }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "name", "endsWith": ["-dev", "-prod"] }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "name", "contains": "gateway" }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "name", "like": "api-*-prod" }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "name", "match": "^api-.*$" }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "name", "notContains": "internal" }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "name", "startsWith": "API-", "caseSensitive": true }), target), Some(false));
}

#[test]
fn test_numeric_conditions_and_convert() {
    let target = json!({ "replicas": 3, "limit": "10" });
    assert_eq!(run(json!({ "field": "replicas", "greater": 2 }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "replicas", "lessOrEquals": 3 }), target.clone()), Some(true));
    // Without convert a numeric string measures by character count.
    assert_eq!(run(json!({ "field": "limit", "greater": 5 }), target.clone()), Some(false));
    assert_eq!(run(json!({ "field": "limit", "greater": 5, "convert": true }), target), Some(true));
}

#[test]
fn test_set_conditions() {
    let target = json!({ "zones": ["a", "b", "b"] });
    assert_eq!(run(json!({ "field": "zones", "subset": ["a", "b"] }), target.clone()), Some(true));
    assert_eq!(
        run(json!({ "field": "zones", "subset": ["a", "b"], "unique": true }), target.clone()),
        Some(false)
    );
    assert_eq!(run(json!({ "field": "zones", "count": 3 }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "zones", "setOf": ["b", "a"] }), target), Some(false));
    assert_eq!(
        run(json!({ "field": "zones", "setOf": ["b", "a"] }), json!({ "zones": ["a", "b"] })),
        Some(true)
    );
}

#[test]
fn test_membership_conditions() {
    let target = json!({ "env": "prod" });
    assert_eq!(run(json!({ "field": "env", "in": ["dev", "prod"] }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "env", "notIn": ["dev", "test"] }), target), Some(true));
    assert_eq!(run(json!({ "field": "missing", "notIn": ["dev"] }), json!({})), Some(true));
}

#[test]
fn test_type_conditions() {
    let target = json!({ "s": "x", "n": 1.5, "i": 2, "b": true, "a": [] });
    assert_eq!(run(json!({ "field": "s", "isString": true }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "n", "isNumeric": true }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "n", "isInteger": true }), target.clone()), Some(false));
    assert_eq!(run(json!({ "field": "i", "isInteger": true }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "b", "isBoolean": true }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "a", "isArray": true }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "s", "isArray": false }), target), Some(true));
}

#[test]
fn test_casing_conditions() {
    let target = json!({ "lower": "abc-123", "upper": "ABC" });
    assert_eq!(run(json!({ "field": "lower", "isLower": true }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "upper", "isUpper": true }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "upper", "isLower": true }), target), Some(false));
}

#[test]
fn test_value_presence_conditions() {
    let target = json!({ "empty": "", "set": "x", "tags": [] });
    assert_eq!(run(json!({ "field": "set", "hasValue": true }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "empty", "hasValue": false }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "tags", "hasValue": false }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "missing", "hasValue": false }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "set", "exists": true }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "missing", "exists": false }), target), Some(true));
}

#[test]
fn test_has_default_treats_missing_as_default() {
    let rule = json!({ "field": "timeout", "hasDefault": 30 });
    assert_eq!(run(rule.clone(), json!({})), Some(true));
    assert_eq!(run(rule.clone(), json!({ "timeout": 30 })), Some(true));
    assert_eq!(run(rule, json!({ "timeout": 60 })), Some(false));
}

#[test]
fn test_version_constraints() {
    let target = json!({ "version": "1.4.2" });
    assert_eq!(run(json!({ "field": "version", "version": ">=1.2.0, <2.0.0" }), target.clone()), Some(true));
    assert_eq!(run(json!({ "field": "version", "version": "^2.0.0" }), target), Some(false));
    assert_eq!(
        run(
            json!({ "field": "version", "version": ">=1.0.0", "includePrerelease": true }),
            json!({ "version": "1.5.0-beta.1" })
        ),
        Some(true)
    );
}

#[test]
fn test_field_paths_resolve_through_path_engine() {
    let rule = json!({ "field": "$.spec.containers[0].image", "equals": "nginx" });
    assert_eq!(
        run(rule, json!({ "spec": { "containers": [{ "image": "nginx" }] } })),
        Some(true)
    );
}

#[test]
fn test_functions_compose_in_conditions() {
    let rule = json!({
        "field": "name",
        "equals": { "$": {
            "concat": [
                { "path": "team" },
                { "string": "-" },
                { "substring": { "path": "service" }, "length": 3 }
            ]
        }}
    });
    let target = json!({ "team": "core", "service": "gateway", "name": "core-gat" });
    assert_eq!(run(rule, target), Some(true));
}

#[test]
fn test_configuration_function() {
    let rule = json!({ "field": "replicas", "greaterOrEquals": { "$": { "configuration": "minReplicas" } } });
    let expr = compile_json(&rule).unwrap();
    let target = Value::from_json(&json!({ "replicas": 3 }));
    let mut ctx = ExpressionContext::new(&target).with_config_value("minReplicas", Value::Int(2));
    assert_eq!(evaluate(&expr, &mut ctx), Some(true));
    // Unset configuration makes the comparison invalid, which fails.
    let mut bare = ExpressionContext::new(&target);
    assert_eq!(evaluate(&expr, &mut bare), Some(false));
}

#[test]
fn test_failed_evaluation_reports_reasons() {
    let rule = json!({ "allOf": [
        { "field": "replicas", "greaterOrEquals": 2 },
        { "field": "owner", "exists": true }
    ]});
    let expr = compile_json(&rule).unwrap();
    let target = Value::from_json(&json!({ "replicas": 1 }));
    let mut ctx = ExpressionContext::new(&target);
    let result = evaluate_with_reasons(&expr, &mut ctx);
    assert_eq!(result.value, Some(false));
    assert!(!result.passed());
    assert_eq!(result.reasons.len(), 1);
    assert_eq!(result.reasons[0].operand(), "replicas");
}
