pub mod field;
pub mod form;

pub use field::{FieldSchema, FieldType, ValidationRule, ValidationRuleKind};
pub use form::{FormLayout, FormSchema, StepKind, StepPlan, WizardStepSpec};
