//! Per-evaluation state: the bound target, its identity metadata, the
//! configuration map, and the reasons collected while evaluating.

use verdict_value::{TargetNode, Value};

/// A human-readable explanation for a failing condition, tied to the
/// operand path it was raised for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reason {
    operand: String,
    text: String,
}

impl Reason {
    pub fn operand(&self) -> &str {
        &self.operand
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.operand, self.text)
    }
}

/// The outcome of a full evaluation: the three-valued verdict plus the
/// reasons gathered along the way.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub value: Option<bool>,
    pub reasons: Vec<Reason>,
}

impl MatchResult {
    /// Collapse the three-valued verdict into pass/fail. Indeterminate
    /// counts as a fail.
    pub fn passed(&self) -> bool {
        self.value == Some(true)
    }
}

/// Evaluation state for a single target object.
#[derive(Debug)]
pub struct ExpressionContext<'a> {
    target: TargetNode<'a>,
    object_type: Option<String>,
    object_name: Option<String>,
    rule: Option<String>,
    configuration: Vec<(String, Value)>,
    reasons: Vec<Reason>,
}

impl<'a> ExpressionContext<'a> {
    pub fn new(target: impl Into<TargetNode<'a>>) -> Self {
        Self {
            target: target.into(),
            object_type: None,
            object_name: None,
            rule: None,
            configuration: Vec::new(),
            reasons: Vec::new(),
        }
    }

    pub fn with_object_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = Some(object_type.into());
        self
    }

    pub fn with_object_name(mut self, object_name: impl Into<String>) -> Self {
        self.object_name = Some(object_name.into());
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    pub fn with_config_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.configuration.push((key.into(), value));
        self
    }

    pub fn target(&self) -> TargetNode<'a> {
        self.target.clone()
    }

    pub fn object_type(&self) -> Option<&str> {
        self.object_type.as_deref()
    }

    pub fn object_name(&self) -> Option<&str> {
        self.object_name.as_deref()
    }

    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }

    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.configuration
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Record a reason. Duplicate (operand, text) pairs are kept once.
    pub fn reason(&mut self, operand: &str, text: impl Into<String>) {
        let text = text.into();
        if self
            .reasons
            .iter()
            .any(|r| r.operand == operand && r.text == text)
        {
            return;
        }
        log::debug!("reason [{operand}]: {text}");
        self.reasons.push(Reason {
            operand: operand.to_string(),
            text,
        });
    }

    pub fn reasons(&self) -> &[Reason] {
        &self.reasons
    }

    pub fn take_reasons(&mut self) -> Vec<Reason> {
        std::mem::take(&mut self.reasons)
    }
}
