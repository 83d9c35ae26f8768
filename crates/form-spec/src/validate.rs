use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{FieldSchema, FormSchema, ValidationRule, ValidationRuleKind};
use crate::store::FieldValueStore;
use crate::visibility::resolve_visibility;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

/// Result of one renderer-side validation sweep over the visible fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_required: Vec<String>,
}

/// Evaluates the declarative rules of every currently visible field. Hidden
/// fields are skipped entirely, so a conditional branch the user never saw
/// cannot block them.
pub fn validate(schema: &FormSchema, store: &FieldValueStore) -> ValidationOutcome {
    let visibility = resolve_visibility(schema, store);

    let mut errors = Vec::new();
    let mut missing_required = Vec::new();

    for field in &schema.fields {
        if !visibility.get(&field.name).copied().unwrap_or(true) {
            continue;
        }
        let value = store.get(&field.name);
        for rule in &field.validations {
            if rule.kind == ValidationRuleKind::Required {
                if is_blank(value) {
                    missing_required.push(field.name.clone());
                    errors.push(rule_error(field, rule, "is required", "required"));
                }
                continue;
            }
            // Non-required rules only apply once something was entered.
            if is_blank(value) {
                continue;
            }
            if let Some(value) = value
                && let Some(error) = check_rule(field, rule, value)
            {
                errors.push(error);
            }
        }
    }

    ValidationOutcome {
        valid: errors.is_empty() && missing_required.is_empty(),
        errors,
        missing_required,
    }
}

/// Validation restricted to the fields of one step bucket. Predicates may
/// point at fields on other steps; they are still looked up in the full
/// store, only the rule sweep is scoped.
pub fn validate_step(schema: &FormSchema, store: &FieldValueStore, step: usize) -> ValidationOutcome {
    let scoped = FormSchema {
        fields: schema
            .fields
            .iter()
            .filter(|field| field.step() == step)
            .cloned()
            .collect(),
        ..schema.clone()
    };
    validate(&scoped, store)
}

fn check_rule(field: &FieldSchema, rule: &ValidationRule, value: &Value) -> Option<FieldError> {
    match rule.kind {
        ValidationRuleKind::Min => {
            if let Some(limit) = rule_number(rule)
                && let Some(number) = numeric(value)
                && number < limit
            {
                return Some(rule_error(field, rule, "value below minimum", "min"));
            }
        }
        ValidationRuleKind::Max => {
            if let Some(limit) = rule_number(rule)
                && let Some(number) = numeric(value)
                && number > limit
            {
                return Some(rule_error(field, rule, "value above maximum", "max"));
            }
        }
        ValidationRuleKind::MinLength => {
            if let Some(limit) = rule_number(rule)
                && let Some(text) = value.as_str()
                && (text.chars().count() as f64) < limit
            {
                return Some(rule_error(field, rule, "too short", "min_length"));
            }
        }
        ValidationRuleKind::MaxLength => {
            if let Some(limit) = rule_number(rule)
                && let Some(text) = value.as_str()
                && (text.chars().count() as f64) > limit
            {
                return Some(rule_error(field, rule, "too long", "max_length"));
            }
        }
        ValidationRuleKind::Pattern => {
            if let Some(Value::String(pattern)) = &rule.value
                && let Ok(regex) = Regex::new(pattern)
                && let Some(text) = value.as_str()
                && !regex.is_match(text)
            {
                return Some(rule_error(field, rule, "does not match pattern", "pattern"));
            }
        }
        ValidationRuleKind::Email => {
            if let Ok(regex) = Regex::new(EMAIL_PATTERN)
                && let Some(text) = value.as_str()
                && !regex.is_match(text)
            {
                return Some(rule_error(field, rule, "is not a valid email", "email"));
            }
        }
        // Required is handled by the sweep; unknown rule kinds are ignored.
        ValidationRuleKind::Required | ValidationRuleKind::Unknown => {}
    }
    None
}

fn rule_error(field: &FieldSchema, rule: &ValidationRule, fallback: &str, code: &str) -> FieldError {
    let message = if rule.message.is_empty() {
        format!("{} {}", field.label, fallback)
    } else {
        rule.message.clone()
    };
    FieldError { field: field.name.clone(), code: code.to_string(), message }
}

fn rule_number(rule: &ValidationRule) -> Option<f64> {
    match &rule.value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}
