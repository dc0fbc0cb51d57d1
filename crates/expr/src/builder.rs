//! Compiles a parsed rule document into an [`Expression`] tree.
//!
//! The first operator or condition keyword in a map decides the node kind.
//! Every other key becomes a node property, except `where`, which compiles
//! into a subselector expression, and maps whose single key is the function
//! marker, which compile into function calls.

use crate::ast::{
    ConditionExpr, Expression, FieldSource, FunctionArg, FunctionCall, OperandSource,
    OperatorExpr, PropertyBag, PropertyValue,
};
use crate::error::CompileError;
use crate::functions;
use crate::registry::{ConditionKind, KeywordKind, KeywordRegistry, OperatorKind};
use verdict_opath::{PathExpression, is_bare_name};
use verdict_value::Value;

/// Compile a rule document. The document compiles into an implicit `if`
/// wrapper, so an empty map is a valid, vacuously true expression.
pub fn compile(document: &Value, registry: &KeywordRegistry) -> Result<Expression, CompileError> {
    let Value::Map(entries) = document else {
        return Err(CompileError::NotAMap {
            path: "$".to_string(),
            found: document.kind_name(),
        });
    };
    let children = if entries.is_empty() {
        Vec::new()
    } else {
        vec![build_expression(document, registry, "$")?]
    };
    Ok(Expression::Operator(OperatorExpr {
        kind: OperatorKind::If,
        children,
        properties: PropertyBag::new(),
        field: None,
        subselector: None,
    }))
}

enum Head<'a> {
    Operator(OperatorKind, &'a str, &'a Value),
    Condition(ConditionKind),
}

fn build_expression(
    document: &Value,
    registry: &KeywordRegistry,
    path: &str,
) -> Result<Expression, CompileError> {
    let Value::Map(entries) = document else {
        return Err(CompileError::NotAMap {
            path: path.to_string(),
            found: document.kind_name(),
        });
    };

    let mut head: Option<Head<'_>> = None;
    let mut properties = PropertyBag::new();
    let mut subselector = None;

    for (key, value) in entries {
        match registry.lookup(key) {
            Some(KeywordKind::Operator(kind)) if head.is_none() => {
                head = Some(Head::Operator(kind, key, value));
            }
            Some(KeywordKind::Condition(kind)) if head.is_none() => {
                head = Some(Head::Condition(kind));
                let compiled = build_property(value, registry, &child_path(path, key))?;
                properties.insert(key, compiled);
            }
            Some(KeywordKind::Subselector) => {
                if !matches!(value, Value::Map(_)) {
                    return Err(CompileError::MalformedSubselector {
                        path: child_path(path, key),
                    });
                }
                let compiled = build_expression(value, registry, &child_path(path, key))?;
                subselector = Some(Box::new(compiled));
            }
            // Later keywords and unrecognized keys are plain properties.
            _ => {
                let compiled = build_property(value, registry, &child_path(path, key))?;
                properties.insert(key, compiled);
            }
        }
    }

    match head {
        Some(Head::Operator(kind, keyword, body)) => {
            let children = build_children(body, registry, &child_path(path, keyword), keyword)?;
            let field = compile_field(&properties, path)?;
            Ok(Expression::Operator(OperatorExpr {
                kind,
                children,
                properties,
                field,
                subselector,
            }))
        }
        Some(Head::Condition(kind)) => {
            let operand = compile_operand(&properties, path)?;
            Ok(Expression::Condition(ConditionExpr {
                kind,
                properties,
                operand,
                subselector,
            }))
        }
        None => Err(CompileError::MissingKeyword {
            path: path.to_string(),
        }),
    }
}

/// An operator body is a single object or an array of objects.
fn build_children(
    body: &Value,
    registry: &KeywordRegistry,
    path: &str,
    keyword: &str,
) -> Result<Vec<Expression>, CompileError> {
    match body {
        Value::Map(_) => Ok(vec![build_expression(body, registry, path)?]),
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| build_expression(item, registry, &format!("{path}[{i}]")))
            .collect(),
        _ => Err(CompileError::MalformedOperator {
            keyword: keyword.to_string(),
            path: path.to_string(),
        }),
    }
}

fn compile_operand(
    properties: &PropertyBag,
    path: &str,
) -> Result<Option<OperandSource>, CompileError> {
    if let Some(field) = compile_field(properties, path)? {
        return Ok(Some(OperandSource::Field(field)));
    }
    if properties.contains_key("value") {
        return Ok(Some(OperandSource::Value));
    }
    if properties.get_str("type") == Some(".") {
        return Ok(Some(OperandSource::Type));
    }
    if properties.get_str("name") == Some(".") {
        return Ok(Some(OperandSource::Name));
    }
    Ok(None)
}

/// Compile the `field` property. Bare names stay direct member lookups,
/// anything else compiles through the path engine.
fn compile_field(
    properties: &PropertyBag,
    path: &str,
) -> Result<Option<FieldSource>, CompileError> {
    let Some(field) = properties.get_str("field") else {
        return Ok(None);
    };
    if is_bare_name(field) {
        return Ok(Some(FieldSource::Member(field.to_string())));
    }
    match PathExpression::create(field) {
        Ok(expr) => Ok(Some(FieldSource::Path(expr))),
        Err(source) => Err(CompileError::FieldPath {
            path: child_path(path, "field"),
            source,
        }),
    }
}

/// Compile a property value. A map whose single key is the function marker
/// becomes a function call; everything else is carried as a literal.
fn build_property(
    value: &Value,
    registry: &KeywordRegistry,
    path: &str,
) -> Result<PropertyValue, CompileError> {
    if let Value::Map(entries) = value
        && let [(key, body)] = entries.as_slice()
        && registry.is_function_marker(key)
        && body.is_map()
    {
        let mut builder = FunctionBuilder::default();
        let call = build_function(body, registry, &mut builder, &child_path(path, key))?;
        return Ok(PropertyValue::Function(call));
    }
    Ok(PropertyValue::Literal(value.clone()))
}

/// Builds nested function calls with an explicit frame stack, one frame per
/// call being assembled.
#[derive(Default)]
struct FunctionBuilder {
    stack: Vec<Vec<(String, FunctionArg)>>,
}

impl FunctionBuilder {
    fn push(&mut self) {
        self.stack.push(Vec::new());
    }

    fn add(&mut self, key: &str, arg: FunctionArg) {
        if let Some(frame) = self.stack.last_mut() {
            frame.push((key.to_string(), arg));
        }
    }

    /// Close the current frame. One of the collected keys must name a known
    /// function; that key becomes the call and the rest stay as arguments.
    fn pop(&mut self, path: &str) -> Result<FunctionCall, CompileError> {
        let args = self.stack.pop().unwrap_or_default();
        let name = args
            .iter()
            .map(|(k, _)| k)
            .find(|k| functions::is_function(k))
            .cloned()
            .ok_or_else(|| CompileError::UnknownFunction {
                path: path.to_string(),
            })?;
        Ok(FunctionCall { name, args })
    }
}

fn build_function(
    value: &Value,
    registry: &KeywordRegistry,
    builder: &mut FunctionBuilder,
    path: &str,
) -> Result<FunctionCall, CompileError> {
    let Value::Map(entries) = value else {
        return Err(CompileError::MalformedFunction {
            path: path.to_string(),
        });
    };
    builder.push();
    for (key, value) in entries {
        let arg = build_argument(value, registry, builder, &child_path(path, key))?;
        builder.add(key, arg);
    }
    builder.pop(path)
}

fn build_argument(
    value: &Value,
    registry: &KeywordRegistry,
    builder: &mut FunctionBuilder,
    path: &str,
) -> Result<FunctionArg, CompileError> {
    match value {
        // A map argument is a nested call.
        Value::Map(_) => Ok(FunctionArg::Call(Box::new(build_function(
            value, registry, builder, path,
        )?))),
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| build_argument(item, registry, builder, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(FunctionArg::List),
        _ => Ok(FunctionArg::Literal(value.clone())),
    }
}

fn child_path(path: &str, key: &str) -> String {
    format!("{path}.{key}")
}
