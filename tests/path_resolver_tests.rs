//! End-to-end object path resolution through the public API.

use serde_json::json;
use verdict::{PathExpression, TargetNode, Value, select};

fn eval(path: &str, data: &serde_json::Value) -> Option<Value> {
    select(path, &TargetNode::Json(data), false).unwrap()
}

#[test]
fn test_member_and_index_navigation() {
    let data = json!({
        "metadata": { "name": "api" },
        "spec": { "ports": [80, 443] }
    });
    assert_eq!(eval("$.metadata.name", &data), Some(Value::String("api".to_string())));
    assert_eq!(eval("spec.ports[0]", &data), Some(Value::Int(80)));
    assert_eq!(eval("spec.ports[-1]", &data), Some(Value::Int(443)));
    assert_eq!(eval("spec.ports[2]", &data), None);
}

#[test]
fn test_resolution_is_all_or_nothing() {
    let data = json!({ "a": { "b": 1 } });
    assert_eq!(eval("$.a.b", &data), Some(Value::Int(1)));
    // A miss on any segment is a miss for the whole path.
    assert_eq!(eval("$.a.b.c", &data), None);
    assert_eq!(eval("$.a.missing", &data), None);
}

#[test]
fn test_collection_segments_force_array_results() {
    let data = json!({ "items": [{ "id": 1 }] });
    let expr = PathExpression::create("$.items[*].id").unwrap();
    assert!(expr.is_array());
    // Even a single hit stays wrapped in a sequence.
    assert_eq!(
        expr.evaluate(&TargetNode::Json(&data), false),
        Some(Value::Sequence(vec![Value::Int(1)]))
    );

    let plain = PathExpression::create("$.items[0].id").unwrap();
    assert!(!plain.is_array());
    assert_eq!(plain.evaluate(&TargetNode::Json(&data), false), Some(Value::Int(1)));
}

#[test]
fn test_filters_compare_without_type_coercion() {
    let data = json!({ "items": [{ "id": 1 }, { "id": "1" }, { "id": 2 }] });
    assert_eq!(
        eval("$.items[?(@.id==1)].id", &data),
        Some(Value::Sequence(vec![Value::Int(1)]))
    );
    assert_eq!(
        eval("$.items[?(@.id=='1')].id", &data),
        Some(Value::Sequence(vec![Value::String("1".to_string())]))
    );
}

#[test]
fn test_filter_logical_operators() {
    let data = json!({ "items": [
        { "name": "web", "port": 80 },
        { "name": "api", "port": 8080 },
        { "name": "db", "port": 5432 }
    ]});
    assert_eq!(
        eval("$.items[?(@.port>=80 && @.port<=8080)].name", &data),
        Some(Value::Sequence(vec![
            Value::String("web".to_string()),
            Value::String("api".to_string())
        ]))
    );
    assert_eq!(
        eval("$.items[?(@.name=='db' || @.port==80)].port", &data),
        Some(Value::Sequence(vec![Value::Int(80), Value::Int(5432)]))
    );
    assert_eq!(eval("$.items[?(@.name=='cache')]", &data), None);
}

#[test]
fn test_slices_never_miss() {
    let data = json!([1, 2, 3, 4]);
    assert_eq!(
        eval("$[1:3]", &data),
        Some(Value::Sequence(vec![Value::Int(2), Value::Int(3)]))
    );
    // Out-of-range and contradictory slices yield empty sequences.
    assert_eq!(eval("$[10:20]", &data), Some(Value::Sequence(Vec::new())));
    assert_eq!(eval("$[:1:-1]", &data), Some(Value::Sequence(Vec::new())));
}

#[test]
fn test_tree_and_json_representations_agree() {
    let json = json!({ "spec": { "items": [{ "id": "a" }, { "id": "b" }] } });
    let tree = Value::from_json(&json);
    let expr = PathExpression::create("$.spec.items[*].id").unwrap();
    assert_eq!(
        expr.evaluate(&TargetNode::Json(&json), false),
        expr.evaluate(&TargetNode::Tree(&tree), false)
    );
}
