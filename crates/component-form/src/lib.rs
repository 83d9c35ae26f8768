//! String-in/string-out embedding surface for host pages. Every function takes
//! the component config plus the host-held state as JSON strings and returns a
//! JSON envelope with a `status` field, so hosts never need the core types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use form_spec::store::{FIELD_ADD_ONS, FIELD_NUM_TRAVELLERS, KEY_TRAVELLERS};
use form_spec::{
    DefaultFormFrontend, FieldValueStore, FormFrontend, FormSchema, PresentationConfig,
    QuoteInput, ThemeError, ThemeRegistry, ThemeSpec, TravellerRoster, WizardController,
    WizardState, build_step_payload, quote, resolve_visibility, validate,
};

/// Demo schema served when the host config names none.
const DEFAULT_SCHEMA: &str = include_str!("../../form-spec/tests/fixtures/travel_form.json");

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to parse form schema: {0}")]
    SchemaParse(#[source] serde_json::Error),
    #[error("failed to parse presentation config: {0}")]
    PresentationParse(#[source] serde_json::Error),
    #[error("failed to parse themes: {0}")]
    ThemesParse(#[source] serde_json::Error),
    #[error("failed to parse form data: {0}")]
    FormDataParse(#[source] serde_json::Error),
    #[error("failed to parse wizard state: {0}")]
    StateParse(#[source] serde_json::Error),
    #[error("failed to parse field value: {0}")]
    ValueParse(#[source] serde_json::Error),
    #[error("theme registration failed: {0}")]
    Theme(#[from] ThemeError),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ComponentConfig {
    form_schema_json: Option<String>,
    presentation_json: Option<String>,
    template_id: Option<String>,
    themes_json: Option<String>,
}

/// Everything one call derives from the config string: the schema in force,
/// the presentation knobs, and the template registry.
struct Host {
    schema: FormSchema,
    presentation: PresentationConfig,
    registry: ThemeRegistry,
    template_id: Option<String>,
}

impl Host {
    fn load(config_json: &str) -> Result<Self, ComponentError> {
        let config = if config_json.trim().is_empty() {
            ComponentConfig::default()
        } else {
            serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)?
        };

        let schema_json = config.form_schema_json.as_deref().unwrap_or(DEFAULT_SCHEMA);
        let schema: FormSchema =
            serde_json::from_str(schema_json).map_err(ComponentError::SchemaParse)?;

        let presentation = match config.presentation_json.as_deref() {
            Some(text) if !text.trim().is_empty() => {
                serde_json::from_str(text).map_err(ComponentError::PresentationParse)?
            }
            _ => PresentationConfig::default(),
        };

        let mut registry = ThemeRegistry::builtin();
        if let Some(themes_json) = config.themes_json.as_deref()
            && !themes_json.trim().is_empty()
        {
            let themes: Vec<ThemeSpec> =
                serde_json::from_str(themes_json).map_err(ComponentError::ThemesParse)?;
            for theme in themes {
                registry = registry.with_theme(theme)?;
            }
        }

        Ok(Self { schema, presentation, registry, template_id: config.template_id })
    }

    /// Unregistered template ids resolve as if no template were active.
    fn template(&self) -> Option<&ThemeSpec> {
        self.template_id.as_deref().and_then(|id| self.registry.get(id))
    }
}

fn parse_form_data(form_data_json: &str) -> Result<Value, ComponentError> {
    if form_data_json.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(form_data_json).map_err(ComponentError::FormDataParse)
}

fn parse_state(state_json: &str, step_count: usize) -> Result<WizardState, ComponentError> {
    if state_json.trim().is_empty() {
        return Ok(WizardState::new(step_count));
    }
    serde_json::from_str(state_json).map_err(ComponentError::StateParse)
}

fn store_and_roster(form_data: &Value) -> (FieldValueStore, TravellerRoster) {
    let store = FieldValueStore::from_object(form_data);
    let roster = TravellerRoster::from_value(store.get(KEY_TRAVELLERS));
    (store, roster)
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(mut value) => {
            if let Value::Object(map) = &mut value {
                map.insert("status".to_string(), json!("ok"));
            }
            serde_json::to_string(&value).unwrap_or_else(|error| {
                json!({"status": "error", "message": format!("json encode: {error}")}).to_string()
            })
        }
        Err(err) => json!({"status": "error", "message": err.to_string()}).to_string(),
    }
}

/// Schema in force plus the derived step plan.
pub fn describe(config_json: &str) -> String {
    respond(Host::load(config_json).and_then(|host| {
        let plan = host.schema.step_plan();
        let schema = serde_json::to_value(&host.schema).map_err(ComponentError::JsonEncode)?;
        Ok(json!({
            "schema": schema,
            "stepPlan": plan,
            "stepCount": plan.step_count(),
        }))
    }))
}

/// Form data for a fresh mount: one blank traveller, a count of one, and no
/// add-ons selected.
pub fn init_form_data(config_json: &str) -> String {
    respond(Host::load(config_json).map(|_| {
        let mut store = FieldValueStore::new();
        store.set(FIELD_NUM_TRAVELLERS, json!("1"));
        store.set(FIELD_ADD_ONS, json!([]));
        store.set(KEY_TRAVELLERS, TravellerRoster::new().to_value());
        json!({ "formData": store.snapshot() })
    }))
}

/// One field-change event: writes the value, re-syncs the traveller roster
/// against the count field, and returns the refreshed form data, quote, and
/// visibility map.
pub fn set_field(config_json: &str, form_data_json: &str, field: &str, value_json: &str) -> String {
    respond(Host::load(config_json).and_then(|host| {
        let form_data = parse_form_data(form_data_json)?;
        let value: Value = serde_json::from_str(value_json).map_err(ComponentError::ValueParse)?;

        let mut store = FieldValueStore::from_object(&form_data);
        store.set(field, value);
        let mut roster = TravellerRoster::from_value(store.get(KEY_TRAVELLERS));

        // Sync whenever a count is present, so form data that predates the
        // latest count edit heals on the next change.
        let changed_travellers = match store.get(FIELD_NUM_TRAVELLERS).cloned() {
            Some(raw) => roster.sync_raw(&raw),
            None => false,
        };
        store.set(KEY_TRAVELLERS, roster.to_value());

        let visibility = resolve_visibility(&host.schema, &store);
        let price = quote(&QuoteInput::from_store(&store));
        Ok(json!({
            "formData": store.snapshot(),
            "quote": price,
            "visibility": visibility,
            "changedTravellers": changed_travellers,
        }))
    }))
}

/// Per-record edit; every other record is untouched. Unknown field names and
/// out-of-range indices report `applied: false` instead of erroring.
pub fn set_traveller_field(
    config_json: &str,
    form_data_json: &str,
    index: usize,
    field: &str,
    value_json: &str,
) -> String {
    respond(Host::load(config_json).and_then(|_| {
        let form_data = parse_form_data(form_data_json)?;
        let value: Value = serde_json::from_str(value_json).map_err(ComponentError::ValueParse)?;

        let (mut store, mut roster) = store_and_roster(&form_data);
        let applied = roster.set_record_field(index, field, &value);
        store.set(KEY_TRAVELLERS, roster.to_value());

        let price = quote(&QuoteInput::from_store(&store));
        Ok(json!({
            "formData": store.snapshot(),
            "quote": price,
            "applied": applied,
        }))
    }))
}

/// Quote for the given form data, recomputed from scratch.
pub fn get_quote(config_json: &str, form_data_json: &str) -> String {
    respond(Host::load(config_json).and_then(|_| {
        let form_data = parse_form_data(form_data_json)?;
        let store = FieldValueStore::from_object(&form_data);
        Ok(json!({ "quote": quote(&QuoteInput::from_store(&store)) }))
    }))
}

/// Full-form validation sweep over the currently visible fields.
pub fn validate_form(config_json: &str, form_data_json: &str) -> String {
    respond(Host::load(config_json).and_then(|host| {
        let form_data = parse_form_data(form_data_json)?;
        let store = FieldValueStore::from_object(&form_data);
        Ok(json!({ "validation": validate(&host.schema, &store) }))
    }))
}

fn wizard_op(
    config_json: &str,
    state_json: &str,
    op: impl FnOnce(&mut WizardController) -> bool,
) -> String {
    respond(Host::load(config_json).and_then(|host| {
        let step_count = host.schema.step_count();
        let state = parse_state(state_json, step_count)?;
        let mut wizard = WizardController::from_state(state);
        // The schema in force decides the step count; stale state re-clamps.
        let reclamped = wizard.set_step_count(step_count);
        let moved = op(&mut wizard);
        Ok(json!({
            "state": wizard.state(),
            "changed": reclamped || moved,
        }))
    }))
}

pub fn next_step(config_json: &str, state_json: &str) -> String {
    wizard_op(config_json, state_json, |wizard| wizard.next())
}

pub fn previous_step(config_json: &str, state_json: &str) -> String {
    wizard_op(config_json, state_json, |wizard| wizard.previous())
}

pub fn jump_to_step(config_json: &str, state_json: &str, step: i64) -> String {
    wizard_op(config_json, state_json, move |wizard| wizard.jump_to(step))
}

pub fn reset_wizard(config_json: &str, state_json: &str) -> String {
    wizard_op(config_json, state_json, |wizard| wizard.reset())
}

fn step_payload(
    config_json: &str,
    state_json: &str,
    form_data_json: &str,
) -> Result<form_spec::StepPayload, ComponentError> {
    let host = Host::load(config_json)?;
    let step_count = host.schema.step_count();
    let state = parse_state(state_json, step_count)?;
    let form_data = parse_form_data(form_data_json)?;

    let (store, mut roster) = store_and_roster(&form_data);
    // The rendered view always keeps the roster in lockstep with the count.
    if let Some(raw) = store.get(FIELD_NUM_TRAVELLERS).cloned() {
        roster.sync_raw(&raw);
    }

    Ok(build_step_payload(
        &host.schema,
        &store,
        &roster,
        WizardState { current_step: state.current_step, step_count },
        &host.presentation,
        host.template(),
    ))
}

/// Structured JSON UI tree for the current step.
pub fn render_json_ui(config_json: &str, state_json: &str, form_data_json: &str) -> String {
    respond(
        step_payload(config_json, state_json, form_data_json)
            .map(|payload| json!({ "ui": DefaultFormFrontend.render_json_ui(&payload) })),
    )
}

/// Plain-text rendering of the same step payload.
pub fn render_text(config_json: &str, state_json: &str, form_data_json: &str) -> String {
    respond(
        step_payload(config_json, state_json, form_data_json)
            .map(|payload| json!({ "text": DefaultFormFrontend.render_text_ui(&payload) })),
    )
}

/// Inline-styled HTML fragment of the same step payload.
pub fn render_html(config_json: &str, state_json: &str, form_data_json: &str) -> String {
    respond(
        step_payload(config_json, state_json, form_data_json)
            .map(|payload| json!({ "html": DefaultFormFrontend.render_html_ui(&payload) })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(response: &str) -> Value {
        serde_json::from_str(response).expect("valid json")
    }

    #[test]
    fn describe_exposes_demo_schema_and_plan() {
        let parsed = parse(&describe(""));
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["schema"]["title"], "Travel Insurance Quote");
        assert_eq!(parsed["stepCount"], 5);
        assert_eq!(parsed["stepPlan"]["steps"][4]["kind"], "review");
    }

    #[test]
    fn init_form_data_seeds_count_add_ons_and_roster() {
        let parsed = parse(&init_form_data(""));
        assert_eq!(parsed["formData"]["numTravellers"], "1");
        assert_eq!(parsed["formData"]["addOns"], json!([]));
        let travellers = parsed["formData"]["travellers"].as_array().expect("travellers");
        assert_eq!(travellers.len(), 1);
        assert_eq!(travellers[0]["hasMedicalConditions"], "no");
    }

    #[test]
    fn set_field_recomputes_quote_and_visibility() {
        let parsed = parse(&set_field("", "{}", "paymentMethod", "\"card\""));
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["formData"]["paymentMethod"], "card");
        assert_eq!(parsed["visibility"]["cardNumber"], true);
        assert_eq!(parsed["visibility"]["paypalEmail"], false);
        assert_eq!(parsed["quote"]["total"], 118);
        assert_eq!(parsed["changedTravellers"], false);
    }

    #[test]
    fn count_change_grows_the_roster() {
        let init = parse(&init_form_data(""));
        let form_data = init["formData"].to_string();

        let grown = parse(&set_field("", &form_data, "numTravellers", "\"3\""));
        assert_eq!(grown["changedTravellers"], true);
        assert_eq!(grown["formData"]["travellers"].as_array().unwrap().len(), 3);

        // Re-applying the same count is the no-op that prevents feedback loops.
        let again = parse(&set_field(
            "",
            &grown["formData"].to_string(),
            "numTravellers",
            "\"3\"",
        ));
        assert_eq!(again["changedTravellers"], false);
    }

    #[test]
    fn traveller_edits_stay_inside_one_record() {
        let grown = parse(&set_field("", "{}", "numTravellers", "\"2\""));
        let form_data = grown["formData"].to_string();

        let parsed = parse(&set_traveller_field("", &form_data, 0, "fullName", "\"Ada\""));
        assert_eq!(parsed["applied"], true);
        assert_eq!(parsed["formData"]["travellers"][0]["fullName"], "Ada");
        assert_eq!(parsed["formData"]["travellers"][1]["fullName"], "");

        let out_of_range = parse(&set_traveller_field("", &form_data, 9, "fullName", "\"Zed\""));
        assert_eq!(out_of_range["applied"], false);
        let bad_field = parse(&set_traveller_field("", &form_data, 0, "shoeSize", "\"44\""));
        assert_eq!(bad_field["applied"], false);
    }

    #[test]
    fn quote_follows_the_documented_example() {
        let form_data = json!({
            "startDate": "2025-06-01",
            "endDate": "2025-06-08",
            "destination": "US",
            "plan": "premium",
            "addOns": ["adventure"],
            "numTravellers": "2"
        });
        let parsed = parse(&get_quote("", &form_data.to_string()));
        assert_eq!(parsed["quote"]["basePremium"], 450);
        assert_eq!(parsed["quote"]["tax"], 92);
        assert_eq!(parsed["quote"]["total"], 602);
    }

    #[test]
    fn validate_form_reports_missing_fields() {
        let parsed = parse(&validate_form("", "{}"));
        assert_eq!(parsed["validation"]["valid"], false);
        let missing = parsed["validation"]["missingRequired"]
            .as_array()
            .expect("missing list");
        assert!(missing.iter().any(|v| v == "startDate"));
        assert!(!missing.iter().any(|v| v == "cardNumber"));
    }

    #[test]
    fn wizard_ops_move_and_clamp() {
        let first = parse(&next_step("", ""));
        assert_eq!(first["state"]["currentStep"], 1);
        assert_eq!(first["changed"], true);

        let state = first["state"].to_string();
        let back = parse(&previous_step("", &state));
        assert_eq!(back["state"]["currentStep"], 0);

        let jumped = parse(&jump_to_step("", &state, 99));
        assert_eq!(jumped["state"]["currentStep"], 4);

        let reset = parse(&reset_wizard("", &jumped["state"].to_string()));
        assert_eq!(reset["state"]["currentStep"], 0);
        assert_eq!(reset["changed"], true);
    }

    #[test]
    fn stale_state_reclamps_against_the_schema() {
        let stale = json!({"currentStep": 9, "stepCount": 9});
        let parsed = parse(&next_step("", &stale.to_string()));
        // The demo schema plans five steps; 9 clamps to 4 and next stays put.
        assert_eq!(parsed["state"]["currentStep"], 4);
        assert_eq!(parsed["state"]["stepCount"], 5);
        assert_eq!(parsed["changed"], true);
    }

    #[test]
    fn renderers_share_the_same_envelope() {
        let text = parse(&render_text("", "", "{}"));
        assert_eq!(text["status"], "ok");
        assert!(text["text"].as_str().unwrap().contains("Step 1/5"));

        let ui = parse(&render_json_ui("", "", "{}"));
        assert_eq!(ui["ui"]["formTitle"], "Travel Insurance Quote");
        assert_eq!(ui["ui"]["stepper"]["type"], "dots");

        let html = parse(&render_html("", "", "{}"));
        assert!(html["html"].as_str().unwrap().contains("qf-card"));
    }

    #[test]
    fn presentation_config_reaches_the_render() {
        let config = json!({
            "presentationJson": json!({
                "borderRadius": "pill",
                "stepperType": "progress",
                "themeColors": ["#101010"]
            })
            .to_string(),
            "templateId": "creative"
        });
        let parsed = parse(&render_json_ui(&config.to_string(), "", "{}"));
        assert_eq!(parsed["ui"]["style"]["inputRadius"], "9999px");
        assert_eq!(parsed["ui"]["style"]["sectionPadding"], "24px 16px");
        assert_eq!(parsed["ui"]["stepper"]["type"], "progress");
        assert_eq!(parsed["ui"]["customProperties"]["--qf-primary"], "#101010");
    }

    #[test]
    fn custom_themes_extend_the_registry() {
        let config = json!({
            "themesJson": json!([
                {"id": "brand", "label": "Brand", "flavor": "creative", "colors": ["#0a0a0a", "#fafafa"]}
            ])
            .to_string(),
            "templateId": "brand"
        });
        let parsed = parse(&render_json_ui(&config.to_string(), "", "{}"));
        assert_eq!(parsed["ui"]["style"]["primary"], "#0a0a0a");
        assert_eq!(parsed["ui"]["style"]["sectionPadding"], "24px 16px");

        let clash = json!({
            "themesJson": json!([{"id": "modern", "label": "Again"}]).to_string()
        });
        let failed = parse(&describe(&clash.to_string()));
        assert_eq!(failed["status"], "error");
        assert!(failed["message"].as_str().unwrap().contains("already registered"));
    }

    #[test]
    fn unknown_template_ids_fall_back_to_the_ambient_style() {
        let config = json!({ "templateId": "does-not-exist" });
        let parsed = parse(&render_json_ui(&config.to_string(), "", "{}"));
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["ui"]["style"]["primary"], "#4f46e5");
    }

    #[test]
    fn malformed_inputs_produce_error_envelopes() {
        let bad_config = parse(&describe("not json"));
        assert_eq!(bad_config["status"], "error");

        let bad_value = parse(&set_field("", "{}", "plan", "not json"));
        assert_eq!(bad_value["status"], "error");

        let bad_state = parse(&next_step("", "not json"));
        assert_eq!(bad_state["status"], "error");

        let bad_data = parse(&get_quote("", "not json"));
        assert_eq!(bad_data["status"], "error");
    }
}
