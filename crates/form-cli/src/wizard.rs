use std::collections::BTreeMap;
use std::fmt::Write;

use form_spec::{FieldType, PriceQuote, QuoteSnapshot, RecordId, TravellerRecord};
use serde_json::Value;

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: prompts and the live quote only.
    Clean,
    /// Verbose output: descriptions, step field listings, parse expectations.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Printer for everything the wizard shows between prompts.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
    show_data_json: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity, show_data_json: bool) -> Self {
        Self {
            verbosity,
            header_printed: false,
            show_data_json,
        }
    }

    pub fn show_header(&mut self, view: &StepView) {
        if self.header_printed {
            return;
        }
        println!("Form: {}", view.form_title);
        if self.verbosity.is_verbose() && !view.form_description.is_empty() {
            println!("{}", view.form_description);
        }
        self.header_printed = true;
    }

    pub fn show_step(&self, view: &StepView) {
        println!();
        println!("{}", view.stepper.line());
        println!("Step {}/{}: {}", view.current + 1, view.count, view.step_title);
        if self.verbosity.is_verbose() && !view.review {
            self.print_step_fields(view);
        }
    }

    fn print_step_fields(&self, view: &StepView) {
        println!("Fields on this step:");
        for field in view.visible_fields() {
            let mut entry = format!(" - {} ({})", field.name, field.label);
            if field.required {
                entry.push_str(" [required]");
            }
            println!("{}", entry);
        }
    }

    pub fn show_summary(&self, view: &StepView) {
        for row in &view.summary {
            if row.emphasis {
                println!(" = {}: {}", row.label, row.value);
            } else {
                println!(" - {}: {}", row.label, row.value);
            }
        }
    }

    /// Traveller conditions live in the shell, keyed by record id, so they
    /// survive roster grow/shrink cycles the same way the record list does.
    pub fn show_conditions(&self, view: &StepView, conditions: &BTreeMap<RecordId, Vec<String>>) {
        for (id, list) in conditions {
            if list.is_empty() {
                continue;
            }
            let Some(record) = view.travellers.iter().find(|record| record.id == *id) else {
                continue;
            };
            let name = if record.full_name.is_empty() {
                format!("traveller {}", id)
            } else {
                record.full_name.clone()
            };
            println!(" - Conditions ({}): {}", name, list.join(", "));
        }
    }

    pub fn show_field_prompt(&self, field: &FieldView) {
        let mut line = field.label.clone();
        if field.required {
            line.push_str(" *");
        }
        if let Some(hint) = field.hint() {
            line.push(' ');
            line.push_str(&hint);
        }
        if let Some(current) = field.current_display() {
            line.push_str(&format!(" [{}]", current));
        }
        println!("{}", line);
        if self.verbosity.is_verbose()
            && let Some(placeholder) = &field.placeholder
        {
            println!("  e.g. {}", placeholder);
        }
    }

    pub fn show_traveller_header(&self, position: usize, total: usize) {
        println!("Traveller {}/{}", position, total);
    }

    pub fn show_traveller_prompt(&self, label: &str, current: &str) {
        if current.is_empty() {
            println!("  {}", label);
        } else {
            println!("  {} [{}]", label, current);
        }
    }

    pub fn show_conditions_noted(&self, count: usize) {
        println!("  noted {} condition(s)", count);
    }

    pub fn show_quote(&self, quote: &PriceQuote) {
        println!(
            "Quote: ${} total (base ${}, add-ons ${}, tax ${})",
            quote.total, quote.base_premium, quote.add_ons_premium, quote.tax
        );
    }

    pub fn show_nav(&self, review: bool) {
        if review {
            println!("[f]inish, [b]ack, [q]uit");
        } else {
            println!("[n]ext, [b]ack, [q]uit");
        }
    }

    pub fn show_parse_error(&self, error: &FieldParseError) {
        eprintln!("Invalid value: {}", error.user_message);
        if let Some(expected) = &error.expected {
            eprintln!("  Expected: {}", expected);
        }
    }

    pub fn show_completion(&self, snapshot: &QuoteSnapshot) {
        println!("Done ✅");
        match snapshot.to_cbor() {
            Ok(bytes) => {
                println!("Snapshot (CBOR hex): {}", encode_hex(&bytes));
            }
            Err(err) => {
                eprintln!("Failed to serialize the snapshot to CBOR: {}", err);
            }
        }
        if self.show_data_json {
            match snapshot.to_json_pretty() {
                Ok(pretty) => println!("{}", pretty),
                Err(err) => {
                    eprintln!("Failed to serialize the snapshot to JSON: {}", err);
                }
            }
        }
    }
}

/// View of one rendered step, parsed from the component's JSON UI payload.
pub struct StepView {
    pub form_title: String,
    pub form_description: String,
    pub current: usize,
    pub count: usize,
    pub step_title: String,
    pub review: bool,
    pub stepper: StepperView,
    pub fields: Vec<FieldView>,
    pub travellers: Vec<TravellerRecord>,
    pub quote: PriceQuote,
    pub summary: Vec<SummaryRowView>,
}

impl StepView {
    pub fn from_json(ui: &Value) -> Result<Self, String> {
        let form_title = ui
            .get("formTitle")
            .and_then(Value::as_str)
            .ok_or_else(|| "step payload missing formTitle".to_string())?
            .to_string();
        let form_description = ui
            .get("formDescription")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let step = ui
            .get("step")
            .and_then(Value::as_object)
            .ok_or_else(|| "step payload missing step".to_string())?;
        let current = step.get("current").and_then(Value::as_u64).unwrap_or(0) as usize;
        let count = step.get("count").and_then(Value::as_u64).unwrap_or(1) as usize;
        let step_title = step
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let review = step.get("kind").and_then(Value::as_str) == Some("review");
        let stepper = StepperView::from_json(ui.get("stepper").unwrap_or(&Value::Null));
        let fields = ui
            .get("fields")
            .and_then(Value::as_array)
            .ok_or_else(|| "step payload missing fields".to_string())?
            .iter()
            .map(FieldView::from_json)
            .collect::<Result<_, _>>()?;
        let travellers = match ui.get("travellers") {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|err| format!("bad traveller list: {}", err))?,
            None => Vec::new(),
        };
        let quote = serde_json::from_value(ui.get("quote").cloned().unwrap_or(Value::Null))
            .map_err(|err| format!("bad quote: {}", err))?;
        let summary = ui
            .get("summary")
            .and_then(Value::as_array)
            .map(|rows| rows.iter().map(SummaryRowView::from_json).collect())
            .unwrap_or_default();
        Ok(Self {
            form_title,
            form_description,
            current,
            count,
            step_title,
            review,
            stepper,
            fields,
            travellers,
            quote,
            summary,
        })
    }

    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldView> {
        self.fields.iter().filter(|field| field.visible)
    }
}

/// Step indicator mirrored from the JSON payload, so the shell shows the same
/// chrome a web host would.
pub enum StepperView {
    Dots { total: usize, active: usize },
    Numbers { total: usize, active: usize },
    Progress { percent: u8 },
    Breadcrumb { labels: Vec<String>, active: usize },
}

impl StepperView {
    fn from_json(value: &Value) -> Self {
        let total = value.get("total").and_then(Value::as_u64).unwrap_or(0) as usize;
        let active = value.get("active").and_then(Value::as_u64).unwrap_or(0) as usize;
        match value.get("type").and_then(Value::as_str) {
            Some("numbers") => StepperView::Numbers { total, active },
            Some("progress") => StepperView::Progress {
                percent: value
                    .get("percent")
                    .and_then(Value::as_u64)
                    .unwrap_or(0)
                    .min(100) as u8,
            },
            Some("breadcrumb") => StepperView::Breadcrumb {
                labels: value
                    .get("labels")
                    .and_then(Value::as_array)
                    .map(|labels| {
                        labels
                            .iter()
                            .filter_map(Value::as_str)
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
                active,
            },
            _ => StepperView::Dots { total, active },
        }
    }

    pub fn line(&self) -> String {
        match self {
            StepperView::Dots { total, active } => (0..*total)
                .map(|idx| if idx <= *active { "●" } else { "○" })
                .collect::<Vec<_>>()
                .join(" "),
            StepperView::Numbers { total, active } => (0..*total)
                .map(|idx| {
                    if idx == *active {
                        format!("[{}]", idx + 1)
                    } else {
                        format!("{}", idx + 1)
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
            StepperView::Progress { percent } => {
                let filled = (*percent as usize) / 10;
                let bar: String = (0..10).map(|idx| if idx < filled { '#' } else { '-' }).collect();
                format!("[{}] {}%", bar, percent)
            }
            StepperView::Breadcrumb { labels, active } => labels
                .iter()
                .enumerate()
                .map(|(idx, label)| {
                    if idx == *active {
                        format!("[{}]", label)
                    } else {
                        label.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" > "),
        }
    }
}

/// Minimal field view used to drive prompts.
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub visible: bool,
    pub value: Option<Value>,
    pub options: Vec<String>,
    pub placeholder: Option<String>,
}

impl FieldView {
    fn from_json(value: &Value) -> Result<Self, String> {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| "field missing name".to_string())?
            .to_string();
        let label = value
            .get("label")
            .and_then(Value::as_str)
            .ok_or_else(|| format!("field '{}' missing label", name))?
            .to_string();
        let field_type = value
            .get("type")
            .and_then(Value::as_str)
            .map(field_type_from_label)
            .unwrap_or(FieldType::Unknown);
        let required = value
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let visible = value
            .get("visible")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        let value_field = value.get("value").cloned();
        let options = value
            .get("options")
            .and_then(Value::as_array)
            .map(|options| {
                options
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let placeholder = value
            .get("placeholder")
            .and_then(Value::as_str)
            .map(|text| text.to_string());
        Ok(Self {
            name,
            label,
            field_type,
            required,
            visible,
            value: value_field,
            options,
            placeholder,
        })
    }

    pub fn hint(&self) -> Option<String> {
        match self.field_type {
            FieldType::Select | FieldType::Radio if !self.options.is_empty() => {
                Some(format!("({})", self.options.join("/")))
            }
            FieldType::Checkbox if !self.options.is_empty() => {
                Some(format!("(comma separated: {})", self.options.join("/")))
            }
            FieldType::Date => Some("(YYYY-MM-DD)".to_string()),
            FieldType::Number => Some("(number)".to_string()),
            FieldType::Email => Some("(email)".to_string()),
            _ => None,
        }
    }

    pub fn current_display(&self) -> Option<String> {
        let display = match self.value.as_ref()? {
            Value::String(text) => text.clone(),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            _ => return None,
        };
        if display.is_empty() { None } else { Some(display) }
    }
}

fn field_type_from_label(label: &str) -> FieldType {
    serde_json::from_value(Value::String(label.to_string())).unwrap_or(FieldType::Unknown)
}

/// One summary row of the review step.
pub struct SummaryRowView {
    pub label: String,
    pub value: String,
    pub emphasis: bool,
}

impl SummaryRowView {
    fn from_json(value: &Value) -> Self {
        Self {
            label: value
                .get("label")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            value: value
                .get("value")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            emphasis: value
                .get("emphasis")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

/// Error produced when parsing field input from the user.
#[derive(Debug)]
pub struct FieldParseError {
    pub user_message: String,
    pub expected: Option<String>,
}

impl FieldParseError {
    pub fn new(user_message: impl Into<String>, expected: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            expected,
        }
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut encoded, "{:02x}", byte).expect("writing to string cannot fail");
    }
    encoded
}
