mod wizard;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use component_form::{
    get_quote, init_form_data, next_step, previous_step, render_html, render_json_ui, render_text,
    set_field, set_traveller_field, validate_form,
};
use form_spec::store::{FIELD_NUM_TRAVELLERS, KEY_TRAVELLERS};
use form_spec::{Condition, FieldType, PriceQuote, QuoteSnapshot, RecordId, SnapshotMeta,
    TravellerRecord};
use serde_json::{Map, Value, json};
use wizard::{FieldParseError, FieldView, StepView, Verbosity, WizardPresenter};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Schema-driven quote form shell",
    long_about = "Runs interactive quote wizards, one-shot quotes, validation sweeps, and step renders backed by the form component"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderFormat {
    Text,
    Json,
    Html,
}

#[derive(Subcommand)]
enum Command {
    /// Step through a form schema interactively and export the final snapshot.
    Wizard {
        /// Path to the form schema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Optional JSON file with initial form data.
        #[arg(long, value_name = "DATA")]
        data: Option<PathBuf>,
        #[command(flatten)]
        presentation: PresentationArgs,
        /// Also print the final snapshot as pretty JSON.
        #[arg(long)]
        data_json: bool,
        /// Show verbose output (descriptions, step fields, parse expectations).
        #[arg(long, alias = "debug")]
        verbose: bool,
    },
    /// Price a form data file and print the breakdown.
    Quote {
        /// Path to the form schema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Path to the form data JSON file.
        #[arg(long, value_name = "DATA")]
        data: PathBuf,
    },
    /// Validate a form data file against the schema's rules.
    Validate {
        /// Path to the form schema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Path to the form data JSON file.
        #[arg(long, value_name = "DATA")]
        data: PathBuf,
    },
    /// Render the first step of the form without prompting.
    Render {
        /// Path to the form schema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Optional JSON file with form data to render against.
        #[arg(long, value_name = "DATA")]
        data: Option<PathBuf>,
        /// Output format for the rendered step.
        #[arg(long, value_enum, default_value_t = RenderFormat::Text)]
        format: RenderFormat,
        #[command(flatten)]
        presentation: PresentationArgs,
    },
}

/// Presentation knobs shared by `wizard` and `render`; each flag maps onto one
/// axis of the component's presentation config.
#[derive(Args, Clone, Default)]
struct PresentationArgs {
    /// Corner rounding for cards, inputs, and buttons.
    #[arg(long, value_enum)]
    radius: Option<RadiusArg>,
    /// Vertical rhythm between fields and sections.
    #[arg(long, value_enum)]
    spacing: Option<SpacingArg>,
    /// Step indicator variant.
    #[arg(long, value_enum)]
    stepper: Option<StepperArg>,
    /// Label placement relative to the input.
    #[arg(long, value_enum)]
    labels: Option<LabelsArg>,
    /// Control sizing.
    #[arg(long, value_enum)]
    size: Option<SizeArg>,
    /// Palette override; pass twice for primary then accent.
    #[arg(long = "theme-color", value_name = "HEX")]
    theme_colors: Vec<String>,
    /// Theme template to resolve styles against.
    #[arg(long, value_name = "ID")]
    template: Option<String>,
    /// JSON file with additional theme definitions.
    #[arg(long, value_name = "FILE")]
    themes: Option<PathBuf>,
}

impl PresentationArgs {
    /// Serializes only the axes that were set; the component fills defaults.
    fn presentation_json(&self) -> Option<String> {
        let mut config = Map::new();
        if let Some(radius) = self.radius {
            config.insert("borderRadius".into(), json!(radius.wire()));
        }
        if let Some(spacing) = self.spacing {
            config.insert("spacing".into(), json!(spacing.wire()));
        }
        if let Some(stepper) = self.stepper {
            config.insert("stepperType".into(), json!(stepper.wire()));
        }
        if let Some(labels) = self.labels {
            config.insert("labelPosition".into(), json!(labels.wire()));
        }
        if let Some(size) = self.size {
            config.insert("inputSize".into(), json!(size.wire()));
        }
        if !self.theme_colors.is_empty() {
            config.insert("themeColors".into(), json!(self.theme_colors));
        }
        if config.is_empty() {
            None
        } else {
            Some(Value::Object(config).to_string())
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RadiusArg {
    Sharp,
    Rounded,
    Pill,
}

impl RadiusArg {
    fn wire(self) -> &'static str {
        match self {
            RadiusArg::Sharp => "sharp",
            RadiusArg::Rounded => "rounded",
            RadiusArg::Pill => "pill",
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SpacingArg {
    Compact,
    Comfortable,
    Spacious,
}

impl SpacingArg {
    fn wire(self) -> &'static str {
        match self {
            SpacingArg::Compact => "compact",
            SpacingArg::Comfortable => "comfortable",
            SpacingArg::Spacious => "spacious",
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum StepperArg {
    Dots,
    Numbers,
    Progress,
    Breadcrumb,
}

impl StepperArg {
    fn wire(self) -> &'static str {
        match self {
            StepperArg::Dots => "dots",
            StepperArg::Numbers => "numbers",
            StepperArg::Progress => "progress",
            StepperArg::Breadcrumb => "breadcrumb",
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LabelsArg {
    Top,
    Left,
    Inline,
}

impl LabelsArg {
    fn wire(self) -> &'static str {
        match self {
            LabelsArg::Top => "top",
            LabelsArg::Left => "left",
            LabelsArg::Inline => "inline",
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SizeArg {
    Sm,
    Md,
    Lg,
}

impl SizeArg {
    fn wire(self) -> &'static str {
        match self {
            SizeArg::Sm => "sm",
            SizeArg::Md => "md",
            SizeArg::Lg => "lg",
        }
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Wizard {
            schema,
            data,
            presentation,
            data_json,
            verbose,
        } => run_wizard(schema, data, presentation, data_json, verbose),
        Command::Quote { schema, data } => run_quote(schema, data),
        Command::Validate { schema, data } => run_validate(schema, data),
        Command::Render {
            schema,
            data,
            format,
            presentation,
        } => run_render(schema, data, format, presentation),
    }
}

fn build_config(schema_json: &str, presentation: &PresentationArgs) -> CliResult<String> {
    let mut config = Map::new();
    config.insert("formSchemaJson".into(), Value::String(schema_json.to_string()));
    if let Some(presentation_json) = presentation.presentation_json() {
        config.insert("presentationJson".into(), Value::String(presentation_json));
    }
    if let Some(template) = &presentation.template {
        config.insert("templateId".into(), Value::String(template.clone()));
    }
    if let Some(path) = &presentation.themes {
        config.insert("themesJson".into(), Value::String(fs::read_to_string(path)?));
    }
    Ok(Value::Object(config).to_string())
}

fn parse_component_response(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if value["status"] == "error" {
        let message = value["message"]
            .as_str()
            .unwrap_or("component call failed")
            .to_string();
        return Err(message.into());
    }
    Ok(value)
}

fn component_field(response: &str, key: &str) -> CliResult<Value> {
    let value = parse_component_response(response)?;
    value
        .get(key)
        .cloned()
        .ok_or_else(|| format!("component response missing '{}'", key).into())
}

fn run_quote(schema_path: PathBuf, data_path: PathBuf) -> CliResult<()> {
    let config_json = build_config(&fs::read_to_string(&schema_path)?, &PresentationArgs::default())?;
    let form_data = fs::read_to_string(&data_path)?;
    let quote_value = component_field(&get_quote(&config_json, &form_data), "quote")?;
    let quote: PriceQuote = serde_json::from_value(quote_value)?;
    print_quote_breakdown(&quote);
    Ok(())
}

fn print_quote_breakdown(quote: &PriceQuote) {
    println!("Trip duration: {} days", quote.trip_duration_days);
    println!("Regional multiplier: x{}", quote.regional_multiplier);
    println!("Plan base price: ${} per traveller week", quote.plan_base_price);
    println!("{:<14} ${}", "Base premium", quote.base_premium);
    println!("{:<14} ${}", "Add-ons", quote.add_ons_premium);
    println!("{:<14} ${}", "Subtotal", quote.subtotal);
    println!("{:<14} ${}", "Tax (18%)", quote.tax);
    println!("{:<14} ${}", "Total", quote.total);
}

fn run_validate(schema_path: PathBuf, data_path: PathBuf) -> CliResult<()> {
    let config_json = build_config(&fs::read_to_string(&schema_path)?, &PresentationArgs::default())?;
    let form_data = fs::read_to_string(&data_path)?;
    let validation = component_field(&validate_form(&config_json, &form_data), "validation")?;
    let valid = validation["valid"].as_bool().unwrap_or(false);
    println!("Validation result: {}", if valid { "valid" } else { "invalid" });
    print_findings(&validation);
    if valid { Ok(()) } else { Err("validation failed".into()) }
}

fn print_findings(validation: &Value) {
    if let Some(errors) = validation["errors"].as_array()
        && !errors.is_empty()
    {
        println!("Errors:");
        for error in errors {
            println!(
                "  {} - {}",
                error["field"].as_str().unwrap_or("<unknown>"),
                error["message"].as_str().unwrap_or("validation failed")
            );
        }
    }
    if let Some(missing) = validation["missingRequired"].as_array()
        && !missing.is_empty()
    {
        println!(
            "Missing required fields: {}",
            missing
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
}

fn run_render(
    schema_path: PathBuf,
    data_path: Option<PathBuf>,
    format: RenderFormat,
    presentation: PresentationArgs,
) -> CliResult<()> {
    let config_json = build_config(&fs::read_to_string(&schema_path)?, &presentation)?;
    let form_data = match data_path {
        Some(path) => fs::read_to_string(path)?,
        None => String::new(),
    };
    match format {
        RenderFormat::Text => {
            let text = component_field(&render_text(&config_json, "", &form_data), "text")?;
            println!("{}", text.as_str().unwrap_or_default());
        }
        RenderFormat::Json => {
            let ui = component_field(&render_json_ui(&config_json, "", &form_data), "ui")?;
            println!("{}", serde_json::to_string_pretty(&ui)?);
        }
        RenderFormat::Html => {
            let html = component_field(&render_html(&config_json, "", &form_data), "html")?;
            println!("{}", html.as_str().unwrap_or_default());
        }
    }
    Ok(())
}

enum StepOutcome {
    Next,
    Back,
    Finish,
    Quit,
}

fn nav_command(input: &str) -> Option<StepOutcome> {
    match input.to_lowercase().as_str() {
        "n" | "next" => Some(StepOutcome::Next),
        "b" | "back" => Some(StepOutcome::Back),
        "q" | "quit" | "exit" => Some(StepOutcome::Quit),
        _ => None,
    }
}

fn run_wizard(
    schema_path: PathBuf,
    data_path: Option<PathBuf>,
    presentation: PresentationArgs,
    data_json: bool,
    verbose: bool,
) -> CliResult<()> {
    let schema_str = fs::read_to_string(&schema_path)?;
    let config_json = build_config(&schema_str, &presentation)?;

    let mut form_data = match data_path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            // Fail on malformed host data up front, not at the first edit.
            let parsed: Value = serde_json::from_str(&contents)?;
            parsed.to_string()
        }
        None => component_field(&init_form_data(&config_json), "formData")?.to_string(),
    };

    let mut state_json = String::new();
    let mut presenter = WizardPresenter::new(Verbosity::from_verbose(verbose), data_json);
    let mut conditions: BTreeMap<RecordId, Vec<String>> = BTreeMap::new();

    loop {
        let view = current_view(&config_json, &state_json, &form_data)?;
        presenter.show_header(&view);
        presenter.show_step(&view);
        presenter.show_quote(&view.quote);

        let form_title = view.form_title.clone();
        let outcome = if view.review {
            presenter.show_summary(&view);
            presenter.show_conditions(&view, &conditions);
            review_prompt(&config_json, &form_data, &presenter)?
        } else {
            field_step(
                &config_json,
                &mut form_data,
                &state_json,
                view,
                &mut conditions,
                &presenter,
            )?
        };

        match outcome {
            StepOutcome::Next => {
                state_json = moved_state(&next_step(&config_json, &state_json))?;
            }
            StepOutcome::Back => {
                state_json = moved_state(&previous_step(&config_json, &state_json))?;
            }
            StepOutcome::Finish => {
                let quote_value = component_field(&get_quote(&config_json, &form_data), "quote")?;
                let quote: PriceQuote = serde_json::from_value(quote_value)?;
                let mut snapshot =
                    QuoteSnapshot::new(form_title, serde_json::from_str(&form_data)?, quote);
                if presentation.template.is_some() {
                    snapshot.meta = Some(SnapshotMeta {
                        created_at: None,
                        template_id: presentation.template.clone(),
                    });
                }
                presenter.show_completion(&snapshot);
                break;
            }
            StepOutcome::Quit => return Err("wizard aborted".into()),
        }
    }

    Ok(())
}

fn current_view(config_json: &str, state_json: &str, form_data: &str) -> CliResult<StepView> {
    let ui = component_field(&render_json_ui(config_json, state_json, form_data), "ui")?;
    StepView::from_json(&ui).map_err(|err| format!("wizard UI error: {}", err).into())
}

fn moved_state(response: &str) -> CliResult<String> {
    Ok(component_field(response, "state")?.to_string())
}

fn field_step(
    config_json: &str,
    form_data: &mut String,
    state_json: &str,
    mut view: StepView,
    conditions: &mut BTreeMap<RecordId, Vec<String>>,
    presenter: &WizardPresenter,
) -> CliResult<StepOutcome> {
    let mut prompted = BTreeSet::new();
    loop {
        if let Some(outcome) =
            prompt_fields(config_json, form_data, &view, &mut prompted, conditions, presenter)?
        {
            return Ok(outcome);
        }
        // A field edit may unveil conditional fields on this same step;
        // re-render and prompt those before offering navigation.
        let refreshed = current_view(config_json, state_json, form_data)?;
        let unveiled = refreshed
            .visible_fields()
            .any(|field| !prompted.contains(&field.name));
        view = refreshed;
        if !unveiled {
            break;
        }
    }

    loop {
        presenter.show_nav(false);
        let input = read_line()?;
        match nav_command(input.trim()) {
            Some(outcome) => return Ok(outcome),
            None => println!("Enter n, b, or q."),
        }
    }
}

fn prompt_fields(
    config_json: &str,
    form_data: &mut String,
    view: &StepView,
    prompted: &mut BTreeSet<String>,
    conditions: &mut BTreeMap<RecordId, Vec<String>>,
    presenter: &WizardPresenter,
) -> CliResult<Option<StepOutcome>> {
    for field in view.visible_fields() {
        if !prompted.insert(field.name.clone()) {
            continue;
        }
        loop {
            presenter.show_field_prompt(field);
            let input = read_line()?;
            let trimmed = input.trim();
            if trimmed.is_empty() {
                break; // keep the current value
            }
            if let Some(outcome) = nav_command(trimmed) {
                return Ok(Some(outcome));
            }
            match parse_field_input(field, trimmed) {
                Ok(value) => {
                    apply_field(config_json, form_data, &field.name, &value, presenter)?;
                    if field.name == FIELD_NUM_TRAVELLERS {
                        prompt_travellers(config_json, form_data, conditions, presenter)?;
                    }
                    break;
                }
                Err(err) => presenter.show_parse_error(&err),
            }
        }
    }
    Ok(None)
}

fn apply_field(
    config_json: &str,
    form_data: &mut String,
    name: &str,
    value: &Value,
    presenter: &WizardPresenter,
) -> CliResult<()> {
    let response =
        parse_component_response(&set_field(config_json, form_data, name, &value.to_string()))?;
    *form_data = response["formData"].to_string();
    let quote: PriceQuote = serde_json::from_value(response["quote"].clone())?;
    presenter.show_quote(&quote);
    Ok(())
}

const TRAVELLER_PROMPTS: &[(&str, &str)] = &[
    ("fullName", "Full name"),
    ("age", "Age"),
    ("passportNumber", "Passport number"),
    ("hasMedicalConditions", "Medical conditions? (yes/no)"),
];

fn prompt_travellers(
    config_json: &str,
    form_data: &mut String,
    conditions: &mut BTreeMap<RecordId, Vec<String>>,
    presenter: &WizardPresenter,
) -> CliResult<()> {
    let medical_gate = Condition {
        field: "hasMedicalConditions".to_string(),
        value: json!("yes"),
    };

    let total = roster_records(form_data)?.len();
    for index in 0..total {
        presenter.show_traveller_header(index + 1, total);
        for (name, label) in TRAVELLER_PROMPTS {
            loop {
                let current = roster_records(form_data)?
                    .get(index)
                    .and_then(|record| record.field(name))
                    .and_then(|value| value.as_str().map(str::to_string))
                    .unwrap_or_default();
                presenter.show_traveller_prompt(label, &current);
                let input = read_line()?;
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    break;
                }
                let value = if *name == "hasMedicalConditions" {
                    match parse_yes_no(trimmed) {
                        Ok(answer) => json!(answer),
                        Err(err) => {
                            presenter.show_parse_error(&err);
                            continue;
                        }
                    }
                } else {
                    json!(trimmed)
                };
                let response = parse_component_response(&set_traveller_field(
                    config_json,
                    form_data,
                    index,
                    name,
                    &value.to_string(),
                ))?;
                *form_data = response["formData"].to_string();
                break;
            }
        }

        let records = roster_records(form_data)?;
        if let Some(record) = records.get(index) {
            if medical_gate.matches(record.field("hasMedicalConditions").as_ref()) {
                presenter.show_traveller_prompt("Conditions (comma separated)", "");
                let raw = read_line()?;
                let list = split_csv(raw.trim());
                presenter.show_conditions_noted(list.len());
                conditions.insert(record.id, list);
            } else {
                conditions.remove(&record.id);
            }
        }
    }
    Ok(())
}

fn roster_records(form_data: &str) -> CliResult<Vec<TravellerRecord>> {
    let data: Value = serde_json::from_str(form_data)?;
    match data.get(KEY_TRAVELLERS) {
        Some(value) => Ok(serde_json::from_value(value.clone())?),
        None => Ok(Vec::new()),
    }
}

fn review_prompt(
    config_json: &str,
    form_data: &str,
    presenter: &WizardPresenter,
) -> CliResult<StepOutcome> {
    loop {
        presenter.show_nav(true);
        let input = read_line()?;
        match input.trim().to_lowercase().as_str() {
            "f" | "finish" => {
                let validation =
                    component_field(&validate_form(config_json, form_data), "validation")?;
                if validation["valid"].as_bool().unwrap_or(false) {
                    return Ok(StepOutcome::Finish);
                }
                print_findings(&validation);
            }
            "b" | "back" => return Ok(StepOutcome::Back),
            "q" | "quit" | "exit" => return Ok(StepOutcome::Quit),
            _ => println!("Enter f, b, or q."),
        }
    }
}

fn read_line() -> CliResult<String> {
    print!("> ");
    io::stdout().flush()?;
    let mut line = String::new();
    let bytes = io::stdin().read_line(&mut line)?;
    if bytes == 0 {
        return Err("input ended before the wizard finished".into());
    }
    Ok(line)
}

/// Coerces raw shell input into the JSON value a web control would emit:
/// checkboxes produce string arrays, everything else stays a string.
fn parse_field_input(field: &FieldView, raw: &str) -> Result<Value, FieldParseError> {
    match field.field_type {
        FieldType::Checkbox => {
            let picks = split_csv(raw);
            if field.options.is_empty() {
                return Ok(json!(picks));
            }
            let mut canonical = Vec::with_capacity(picks.len());
            for pick in picks {
                match field
                    .options
                    .iter()
                    .find(|option| option.eq_ignore_ascii_case(&pick))
                {
                    Some(option) => canonical.push(option.clone()),
                    None => {
                        return Err(FieldParseError::new(
                            format!("Choose from: {}.", field.options.join(", ")),
                            Some(format!("allowed values: {}", field.options.join(", "))),
                        ));
                    }
                }
            }
            Ok(json!(canonical))
        }
        FieldType::Select | FieldType::Radio => {
            if field.options.is_empty() {
                return Ok(json!(raw));
            }
            match field
                .options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(raw))
            {
                Some(option) => Ok(json!(option)),
                None => Err(FieldParseError::new(
                    format!("Choose one of: {}.", field.options.join(", ")),
                    Some(format!("allowed values: {}", field.options.join(", "))),
                )),
            }
        }
        FieldType::Number => {
            let parsed: f64 = raw.parse().map_err(|_| {
                FieldParseError::new("Please enter a number.", Some("expected number".to_string()))
            })?;
            if !parsed.is_finite() {
                return Err(FieldParseError::new(
                    "Please enter a finite number.",
                    Some("number must be finite".to_string()),
                ));
            }
            Ok(json!(raw))
        }
        FieldType::Date => {
            if looks_like_date(raw) {
                Ok(json!(raw))
            } else {
                Err(FieldParseError::new(
                    "Please use the YYYY-MM-DD format.",
                    Some("expected a date like 2025-06-01".to_string()),
                ))
            }
        }
        FieldType::Email => {
            let shaped = raw
                .split_once('@')
                .is_some_and(|(user, host)| !user.is_empty() && host.contains('.'));
            if shaped {
                Ok(json!(raw))
            } else {
                Err(FieldParseError::new(
                    "Please enter an email address.",
                    Some("expected name@example.com".to_string()),
                ))
            }
        }
        _ => Ok(json!(raw)),
    }
}

fn looks_like_date(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(idx, byte)| idx == 4 || idx == 7 || byte.is_ascii_digit())
}

fn parse_yes_no(raw: &str) -> Result<&'static str, FieldParseError> {
    match raw.to_lowercase().as_str() {
        "yes" | "y" | "true" => Ok("yes"),
        "no" | "n" | "false" => Ok("no"),
        _ => Err(FieldParseError::new(
            "Please answer yes or no.",
            Some("expected yes/no".to_string()),
        )),
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}
