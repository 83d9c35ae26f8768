#![allow(missing_docs)]

pub mod frontend;
pub mod presentation;
pub mod pricing;
pub mod render;
pub mod schema;
pub mod snapshot;
pub mod store;
pub mod theme;
pub mod travellers;
pub mod validate;
pub mod visibility;
pub mod wizard;

pub use frontend::{DefaultFormFrontend, FormFrontend};
pub use presentation::{
    BorderRadius, InputSize, LabelPosition, LabelTreatment, PresentationConfig, ResolvedStyle,
    Spacing, StepIndicator, StepperType, resolve_style, step_indicator,
};
pub use pricing::{
    PriceQuote, PricingTables, QuoteInput, add_on_price, plan_base_price, quote,
    quote_with_tables, regional_multiplier, round_currency, trip_duration_days,
};
pub use render::{RenderField, StepPayload, SummaryRow, build_step_payload, render_html,
    render_json_ui, render_text};
pub use schema::{
    FieldSchema, FieldType, FormLayout, FormSchema, StepKind, StepPlan, ValidationRule,
    ValidationRuleKind, WizardStepSpec,
};
pub use snapshot::{QuoteSnapshot, SnapshotMeta};
pub use store::{FieldValueStore, SubscriptionId};
pub use theme::{TemplateFlavor, ThemeError, ThemeRegistry, ThemeSpec};
pub use travellers::{
    MAX_TRAVELLERS, MIN_TRAVELLERS, RecordId, TravellerRecord, TravellerRoster, TravellerUiState,
    desired_count, sync,
};
pub use validate::{FieldError, ValidationOutcome, validate, validate_step};
pub use visibility::{Condition, VisibilityMap, is_visible, resolve_visibility,
    visible_fields_for_step};
pub use wizard::{WizardController, WizardState};
