use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema::field::FieldSchema;

/// Overall layout hint from the parser. The step plan applies either way;
/// a single-page form simply yields one field bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub enum FormLayout {
    #[default]
    Wizard,
    SinglePage,
    #[serde(other)]
    Unknown,
}

/// Top-level parsed form definition. Immutable per session; the host replaces
/// it wholesale on regeneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<FieldSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_url: Option<String>,
    #[serde(default)]
    pub layout: FormLayout,
}

/// Kind of a planned step; the trailing review step carries no fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Fields,
    Review,
}

/// One planned wizard step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WizardStepSpec {
    pub index: usize,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_names: Vec<String>,
    pub kind: StepKind,
}

/// Ordered step list derived from the schema: one bucket per `wizardStep`
/// value from 0 to the maximum (empty buckets kept so indices stay stable),
/// plus a final review step the renderer interprets specially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepPlan {
    pub steps: Vec<WizardStepSpec>,
}

impl StepPlan {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn get(&self, index: usize) -> Option<&WizardStepSpec> {
        self.steps.get(index)
    }

    pub fn titles(&self) -> Vec<String> {
        self.steps.iter().map(|step| step.title.clone()).collect()
    }
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Fields of one step bucket, in schema order.
    pub fn fields_for_step(&self, step: usize) -> Vec<&FieldSchema> {
        self.fields.iter().filter(|field| field.step() == step).collect()
    }

    pub fn step_plan(&self) -> StepPlan {
        let last_bucket = self.fields.iter().map(FieldSchema::step).max().unwrap_or(0);
        let mut steps = Vec::with_capacity(last_bucket + 2);
        for index in 0..=last_bucket {
            steps.push(WizardStepSpec {
                index,
                title: format!("Step {}", index + 1),
                field_names: self
                    .fields
                    .iter()
                    .filter(|field| field.step() == index)
                    .map(|field| field.name.clone())
                    .collect(),
                kind: StepKind::Fields,
            });
        }
        steps.push(WizardStepSpec {
            index: last_bucket + 1,
            title: "Review".to_string(),
            field_names: Vec::new(),
            kind: StepKind::Review,
        });
        StepPlan { steps }
    }

    /// Derived wizard length: field buckets plus the review step.
    pub fn step_count(&self) -> usize {
        self.step_plan().step_count()
    }
}
