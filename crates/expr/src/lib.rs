//! A declarative condition expression engine.
//!
//! Rule documents are plain maps compiled once into a typed [`Expression`]
//! tree by [`compile`], then evaluated any number of times against target
//! objects. Verdicts are three-valued (`Some(true)`, `Some(false)`, `None`
//! for indeterminate) and failing conditions record human-readable
//! [`Reason`]s. Field references resolve through the object path engine,
//! so conditions work uniformly over every supported target
//! representation.

pub mod ast;
mod builder;
mod conditions;
mod context;
mod error;
mod eval;
mod functions;
mod helpers;
pub mod matcher;
pub mod registry;

pub use ast::{Expression, FieldSource, FunctionArg, FunctionCall, PropertyBag, PropertyValue};
pub use context::{ExpressionContext, MatchResult, Reason};
pub use error::CompileError;
pub use eval::{evaluate, evaluate_with_reasons};
pub use matcher::{SelectorMatcher, SuppressionMatcher, TargetInfo};
pub use registry::{ConditionKind, KeywordKind, KeywordRegistry, OperatorKind};

use verdict_value::Value;

/// Compile a rule document with the built-in keyword set.
pub fn compile(document: &Value) -> Result<Expression, CompileError> {
    builder::compile(document, &KeywordRegistry::builtin())
}

/// Compile a rule document against a caller-provided keyword registry.
pub fn compile_with(
    document: &Value,
    registry: &KeywordRegistry,
) -> Result<Expression, CompileError> {
    builder::compile(document, registry)
}
