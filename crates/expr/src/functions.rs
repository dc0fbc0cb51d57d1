//! Value-producing functions usable wherever a condition expects a value.
//!
//! A function call never raises: an unconvertible input or a path that
//! does not resolve yields `None`, which the enclosing condition treats
//! as a missing value.

use crate::ast::{FunctionArg, FunctionCall};
use crate::context::ExpressionContext;
use crate::helpers::{to_bool, to_i64, to_string_value};
use verdict_opath::PathExpression;
use verdict_value::{TargetNode, Value};

const FUNCTIONS: &[&str] = &[
    "boolean",
    "string",
    "integer",
    "concat",
    "substring",
    "replace",
    "trim",
    "first",
    "last",
    "split",
    "padLeft",
    "padRight",
    "path",
    "configuration",
];

pub(crate) fn is_function(name: &str) -> bool {
    FUNCTIONS.contains(&name)
}

pub(crate) fn invoke(
    call: &FunctionCall,
    ctx: &ExpressionContext<'_>,
    target: &TargetNode<'_>,
) -> Option<Value> {
    let input = eval_arg(call.arg(&call.name)?, ctx, target)?;
    match call.name.as_str() {
        "boolean" => to_bool(&input, true).map(Value::Bool),
        "string" => to_string_value(&input, true).map(Value::String),
        "integer" => to_i64(&input, true).map(Value::Int),
        "concat" => concat(&input),
        "substring" => {
            let s = input.as_str()?;
            let length = arg_i64(call, "length", ctx, target)?;
            let length = usize::try_from(length).ok()?;
            Some(Value::String(s.chars().take(length).collect()))
        }
        "replace" => {
            let s = input.as_str()?;
            let old = arg_string(call, "oldString", ctx, target)?;
            let new = arg_string(call, "newString", ctx, target)?;
            Some(Value::String(s.replace(&old, &new)))
        }
        "trim" => input.as_str().map(|s| Value::String(s.trim().to_string())),
        "first" => match &input {
            Value::Sequence(items) => items.first().cloned(),
            Value::String(s) => s.chars().next().map(|c| Value::String(c.to_string())),
            _ => None,
        },
        "last" => match &input {
            Value::Sequence(items) => items.last().cloned(),
            Value::String(s) => s.chars().last().map(|c| Value::String(c.to_string())),
            _ => None,
        },
        "split" => {
            let s = input.as_str()?;
            let delimiter = arg_string(call, "delimiter", ctx, target)?;
            Some(Value::Sequence(
                s.split(delimiter.as_str())
                    .map(|part| Value::String(part.to_string()))
                    .collect(),
            ))
        }
        "padLeft" => pad(call, &input, ctx, target, true),
        "padRight" => pad(call, &input, ctx, target, false),
        "path" => {
            let path = input.as_str()?;
            let expr = PathExpression::create(path).ok()?;
            expr.evaluate(target, false)
        }
        "configuration" => {
            let key = input.as_str()?;
            ctx.config_value(key).cloned()
        }
        _ => None,
    }
}

fn eval_arg(
    arg: &FunctionArg,
    ctx: &ExpressionContext<'_>,
    target: &TargetNode<'_>,
) -> Option<Value> {
    match arg {
        FunctionArg::Literal(value) => Some(value.clone()),
        FunctionArg::Call(call) => invoke(call, ctx, target),
        FunctionArg::List(items) => items
            .iter()
            .map(|item| eval_arg(item, ctx, target))
            .collect::<Option<Vec<_>>>()
            .map(Value::Sequence),
    }
}

/// Look up a named argument, tolerating a different key casing.
fn named_arg<'c>(call: &'c FunctionCall, name: &str) -> Option<&'c FunctionArg> {
    call.arg(name).or_else(|| {
        call.args
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

fn arg_string(
    call: &FunctionCall,
    name: &str,
    ctx: &ExpressionContext<'_>,
    target: &TargetNode<'_>,
) -> Option<String> {
    let value = eval_arg(named_arg(call, name)?, ctx, target)?;
    to_string_value(&value, true)
}

fn arg_i64(
    call: &FunctionCall,
    name: &str,
    ctx: &ExpressionContext<'_>,
    target: &TargetNode<'_>,
) -> Option<i64> {
    let value = eval_arg(named_arg(call, name)?, ctx, target)?;
    to_i64(&value, true)
}

fn concat(input: &Value) -> Option<Value> {
    let items = input.as_sequence()?;
    let mut out = String::new();
    for item in items {
        out.push_str(&to_string_value(item, true)?);
    }
    Some(Value::String(out))
}

fn pad(
    call: &FunctionCall,
    input: &Value,
    ctx: &ExpressionContext<'_>,
    target: &TargetNode<'_>,
    left: bool,
) -> Option<Value> {
    let s = input.as_str()?;
    let total = usize::try_from(arg_i64(call, "totalLength", ctx, target)?).ok()?;
    let padding = arg_string(call, "paddingCharacter", ctx, target)
        .and_then(|p| p.chars().next())
        .unwrap_or(' ');
    let current = s.chars().count();
    if current >= total {
        return Some(Value::String(s.to_string()));
    }
    let fill: String = std::iter::repeat_n(padding, total - current).collect();
    Some(Value::String(if left {
        format!("{fill}{s}")
    } else {
        format!("{s}{fill}")
    }))
}
