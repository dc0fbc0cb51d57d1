//! Verdict: a declarative condition expression engine.
//!
//! Rules are plain data documents (maps of operators, conditions and
//! properties) compiled once into a typed expression tree and evaluated
//! against target objects in any supported representation: a generic
//! value tree, parsed JSON, a markup tree, or dynamic objects resolved
//! through property lookup.
//!
//! ```
//! use verdict::{compile_json, ExpressionContext, evaluate};
//! use serde_json::json;
//!
//! let rule = json!({ "field": "spec.replicas", "greaterOrEquals": 2 });
//! let expr = compile_json(&rule).unwrap();
//!
//! let target = json!({ "spec": { "replicas": 3 } });
//! let mut ctx = ExpressionContext::new(&target);
//! assert_eq!(evaluate(&expr, &mut ctx), Some(true));
//! ```

pub use verdict_expr::{
    CompileError, ConditionKind, Expression, ExpressionContext, KeywordRegistry, MatchResult,
    OperatorKind, Reason, SelectorMatcher, SuppressionMatcher, TargetInfo, compile, compile_with,
    evaluate, evaluate_with_reasons,
};
pub use verdict_opath::{PathError, PathExpression, select};
pub use verdict_value::{DynamicObject, Element, PropertyView, TargetNode, Value};

/// Compile a rule document given as parsed JSON.
pub fn compile_json(document: &serde_json::Value) -> Result<Expression, CompileError> {
    compile(&Value::from_json(document))
}
