use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::visibility::Condition;

/// Input control kind. The parser may emit kinds this core does not know;
/// those render as plain text inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Email,
    Phone,
    Number,
    Date,
    Select,
    Radio,
    Checkbox,
    Textarea,
    #[serde(other)]
    Unknown,
}

/// Declarative rule kind; unknown kinds are ignored by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ValidationRuleKind {
    Required,
    Min,
    Max,
    MinLength,
    MaxLength,
    Pattern,
    Email,
    #[serde(other)]
    Unknown,
}

/// One declarative validation attached to a field. Evaluated by the renderer
/// layer, never by the store or the quote engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: ValidationRuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default)]
    pub message: String,
}

/// One field of a parsed form schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub id: String,
    /// Unique across the schema; the store key every component addresses.
    pub name: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<ValidationRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Condition>,
    /// Step bucket; unset means step 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wizard_step: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl FieldSchema {
    /// Minimal field used by builders and tests.
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            label: label.into(),
            field_type,
            validations: Vec::new(),
            conditional: None,
            wizard_step: None,
            options: None,
            placeholder: None,
        }
    }

    pub fn step(&self) -> usize {
        self.wizard_step.unwrap_or(0)
    }

    pub fn is_required(&self) -> bool {
        self.validations
            .iter()
            .any(|rule| rule.kind == ValidationRuleKind::Required)
    }
}
