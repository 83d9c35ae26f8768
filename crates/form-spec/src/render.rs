use serde_json::{Map, Value, json};

use crate::presentation::{
    LabelTreatment, PresentationConfig, ResolvedStyle, StepIndicator, resolve_style,
    step_indicator,
};
use crate::pricing::{PriceQuote, QuoteInput, quote};
use crate::schema::{FieldType, FormSchema, StepKind};
use crate::store::{
    FIELD_DESTINATION, FIELD_END_DATE, FIELD_PLAN, FIELD_SELECTED_PLAN, FIELD_START_DATE,
    FieldValueStore,
};
use crate::theme::ThemeSpec;
use crate::travellers::{TravellerRecord, TravellerRoster};
use crate::visibility::{Condition, is_visible, resolve_visibility};
use crate::wizard::WizardState;

/// Review rows shown only for the matching plan; filtered through the same
/// evaluator as conditional fields.
const PLAN_PERKS: &[(&str, &str)] = &[
    ("premium", "Premium assistance hotline included"),
    ("gold", "Gold concierge support included"),
];

/// One field of the current step as renderers see it.
#[derive(Debug, Clone)]
pub struct RenderField {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub visible: bool,
    pub value: Option<Value>,
    pub options: Option<Vec<String>>,
    pub placeholder: Option<String>,
}

/// One line of the review summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
    pub emphasis: bool,
}

/// Everything a renderer variant needs for one step. All output formats
/// consume this payload; none of them may look past it for visual values.
#[derive(Debug, Clone)]
pub struct StepPayload {
    pub form_title: String,
    pub form_description: String,
    pub state: WizardState,
    pub step_title: String,
    pub step_kind: StepKind,
    pub indicator: StepIndicator,
    pub style: ResolvedStyle,
    pub fields: Vec<RenderField>,
    pub travellers: Vec<TravellerRecord>,
    pub quote: PriceQuote,
    pub summary: Vec<SummaryRow>,
}

/// Builds the payload for the step the state points at. The quote is
/// recomputed from the store on every call; it is never carried over.
pub fn build_step_payload(
    schema: &FormSchema,
    store: &FieldValueStore,
    roster: &TravellerRoster,
    state: WizardState,
    config: &PresentationConfig,
    template: Option<&ThemeSpec>,
) -> StepPayload {
    let plan = schema.step_plan();
    let step_count = plan.step_count();
    let current = state.current_step.min(step_count - 1);
    let visibility = resolve_visibility(schema, store);

    let step_spec = plan.get(current);
    let step_title = step_spec.map(|s| s.title.clone()).unwrap_or_default();
    let step_kind = step_spec.map(|s| s.kind).unwrap_or(StepKind::Review);

    let fields = schema
        .fields_for_step(current)
        .into_iter()
        .map(|field| RenderField {
            name: field.name.clone(),
            label: field.label.clone(),
            field_type: field.field_type,
            required: field.is_required(),
            visible: visibility.get(&field.name).copied().unwrap_or(true),
            value: store.get(&field.name).cloned(),
            options: field.options.clone(),
            placeholder: field.placeholder.clone(),
        })
        .collect();

    let price = quote(&QuoteInput::from_store(store));
    let summary = match step_kind {
        StepKind::Review => build_summary(store, roster, &price),
        StepKind::Fields => Vec::new(),
    };

    StepPayload {
        form_title: schema.title.clone(),
        form_description: schema.description.clone(),
        state: WizardState { current_step: current, step_count },
        step_title,
        step_kind,
        indicator: step_indicator(config, &plan, current),
        style: resolve_style(config, template),
        fields,
        travellers: roster.records().to_vec(),
        quote: price,
        summary,
    }
}

fn build_summary(
    store: &FieldValueStore,
    roster: &TravellerRoster,
    price: &PriceQuote,
) -> Vec<SummaryRow> {
    let mut rows = Vec::new();

    let start = store.get_str(FIELD_START_DATE).unwrap_or("?");
    let end = store.get_str(FIELD_END_DATE).unwrap_or("?");
    rows.push(row(
        "Trip",
        format!("{start} to {end} ({} days)", price.trip_duration_days),
    ));
    rows.push(row(
        "Destination",
        format!(
            "{} (x{})",
            store.get_str(FIELD_DESTINATION).unwrap_or("unknown"),
            price.regional_multiplier
        ),
    ));
    rows.push(row(
        "Plan",
        format!(
            "{} (${} base)",
            effective_plan(store).unwrap_or_else(|| "standard".to_string()),
            price.plan_base_price
        ),
    ));

    let names: Vec<&str> = roster
        .records()
        .iter()
        .filter(|record| !record.is_blank() && !record.full_name.is_empty())
        .map(|record| record.full_name.as_str())
        .collect();
    let travellers = if names.is_empty() {
        roster.len().to_string()
    } else {
        format!("{} ({})", roster.len(), names.join(", "))
    };
    rows.push(row("Travellers", travellers));

    rows.push(row("Base premium", format!("${}", price.base_premium)));
    rows.push(row("Add-ons", format!("${}", price.add_ons_premium)));
    rows.push(row("Subtotal", format!("${}", price.subtotal)));
    rows.push(row("Tax (18%)", format!("${}", price.tax)));
    rows.push(SummaryRow {
        label: "Total".to_string(),
        value: format!("${}", price.total),
        emphasis: true,
    });

    // Plan perks go through the visibility evaluator like any conditional.
    let plan_field = if store.get(FIELD_SELECTED_PLAN).is_some() {
        FIELD_SELECTED_PLAN
    } else {
        FIELD_PLAN
    };
    for (plan_id, perk) in PLAN_PERKS {
        let condition = Condition { field: plan_field.to_string(), value: json!(plan_id) };
        if is_visible(Some(&condition), store) {
            rows.push(row("Included", (*perk).to_string()));
        }
    }

    rows
}

fn row(label: &str, value: String) -> SummaryRow {
    SummaryRow { label: label.to_string(), value, emphasis: false }
}

fn effective_plan(store: &FieldValueStore) -> Option<String> {
    store
        .get_str(FIELD_SELECTED_PLAN)
        .or_else(|| store.get_str(FIELD_PLAN))
        .map(str::to_string)
}

/// Render the payload as a structured JSON UI tree. Style primitives come
/// from the resolved style verbatim; custom properties appear only when the
/// configuration supplied theme colors.
pub fn render_json_ui(payload: &StepPayload) -> Value {
    let fields = payload
        .fields
        .iter()
        .map(|field| {
            let mut map = Map::new();
            map.insert("name".into(), Value::String(field.name.clone()));
            map.insert("label".into(), Value::String(field.label.clone()));
            map.insert(
                "type".into(),
                Value::String(field_type_label(field.field_type).to_string()),
            );
            map.insert("required".into(), Value::Bool(field.required));
            map.insert("visible".into(), Value::Bool(field.visible));
            if let Some(value) = &field.value {
                map.insert("value".into(), value.clone());
            }
            if let Some(options) = &field.options {
                map.insert(
                    "options".into(),
                    Value::Array(options.iter().cloned().map(Value::String).collect()),
                );
            }
            if let Some(placeholder) = &field.placeholder {
                map.insert("placeholder".into(), Value::String(placeholder.clone()));
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    let summary = payload
        .summary
        .iter()
        .map(|row| {
            json!({
                "label": row.label,
                "value": row.value,
                "emphasis": row.emphasis,
            })
        })
        .collect::<Vec<_>>();

    let mut root = Map::new();
    root.insert("formTitle".into(), Value::String(payload.form_title.clone()));
    root.insert(
        "formDescription".into(),
        Value::String(payload.form_description.clone()),
    );
    root.insert(
        "step".into(),
        json!({
            "current": payload.state.current_step,
            "count": payload.state.step_count,
            "title": payload.step_title,
            "kind": step_kind_label(payload.step_kind),
        }),
    );
    root.insert("stepper".into(), stepper_json(&payload.indicator, &payload.style));
    root.insert(
        "style".into(),
        serde_json::to_value(&payload.style).unwrap_or(Value::Null),
    );
    if payload.style.custom_palette {
        root.insert(
            "customProperties".into(),
            json!({
                "--qf-primary": payload.style.primary,
                "--qf-accent": payload.style.accent,
            }),
        );
    }
    root.insert("fields".into(), Value::Array(fields));
    root.insert(
        "travellers".into(),
        serde_json::to_value(&payload.travellers).unwrap_or(Value::Array(Vec::new())),
    );
    root.insert(
        "quote".into(),
        serde_json::to_value(payload.quote).unwrap_or(Value::Null),
    );
    root.insert("summary".into(), Value::Array(summary));
    Value::Object(root)
}

/// Each indicator variant has its own renderer; every one reads radius and
/// palette from the resolved style on its own.
fn stepper_json(indicator: &StepIndicator, style: &ResolvedStyle) -> Value {
    match indicator {
        StepIndicator::Dots { total, active } => dots_json(*total, *active, style),
        StepIndicator::Numbers { total, active } => numbers_json(*total, *active, style),
        StepIndicator::Progress { percent } => progress_json(*percent, style),
        StepIndicator::Breadcrumb { labels, active } => breadcrumb_json(labels, *active, style),
    }
}

fn dots_json(total: usize, active: usize, style: &ResolvedStyle) -> Value {
    json!({
        "type": "dots",
        "total": total,
        "active": active,
        "fillColor": style.primary,
        "radius": style.input_radius,
    })
}

fn numbers_json(total: usize, active: usize, style: &ResolvedStyle) -> Value {
    json!({
        "type": "numbers",
        "total": total,
        "active": active,
        "activeColor": style.primary,
        "radius": style.button_radius,
    })
}

fn progress_json(percent: u8, style: &ResolvedStyle) -> Value {
    json!({
        "type": "progress",
        "percent": percent,
        "barColor": style.primary,
        "trackRadius": style.input_radius,
    })
}

fn breadcrumb_json(labels: &[String], active: usize, style: &ResolvedStyle) -> Value {
    json!({
        "type": "breadcrumb",
        "labels": labels,
        "active": active,
        "activeColor": style.primary,
        "separatorColor": style.accent,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &StepPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {}", payload.form_title));
    lines.push(format!(
        "Step {}/{}: {}",
        payload.state.current_step + 1,
        payload.state.step_count,
        payload.step_title
    ));
    lines.push(stepper_text(&payload.indicator));

    if payload.step_kind == StepKind::Fields {
        lines.push("Fields:".to_string());
        for field in payload.fields.iter().filter(|field| field.visible) {
            let mut entry = format!(" - {} ({})", field.name, field.label);
            if field.required {
                entry.push_str(" [required]");
            }
            if let Some(value) = &field.value {
                entry.push_str(&format!(" = {}", value_display(value)));
            }
            lines.push(entry);
        }
    } else {
        lines.push("Summary:".to_string());
        for row in &payload.summary {
            if row.emphasis {
                lines.push(format!(" = {}: {}", row.label, row.value));
            } else {
                lines.push(format!(" - {}: {}", row.label, row.value));
            }
        }
    }

    lines.push(format!(
        "Quote: ${} total (base ${}, add-ons ${}, tax ${})",
        payload.quote.total,
        payload.quote.base_premium,
        payload.quote.add_ons_premium,
        payload.quote.tax
    ));
    lines.join("\n")
}

fn stepper_text(indicator: &StepIndicator) -> String {
    match indicator {
        StepIndicator::Dots { total, active } => dots_text(*total, *active),
        StepIndicator::Numbers { total, active } => numbers_text(*total, *active),
        StepIndicator::Progress { percent } => progress_text(*percent),
        StepIndicator::Breadcrumb { labels, active } => breadcrumb_text(labels, *active),
    }
}

fn dots_text(total: usize, active: usize) -> String {
    (0..total)
        .map(|idx| if idx <= active { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

fn numbers_text(total: usize, active: usize) -> String {
    (0..total)
        .map(|idx| {
            if idx == active {
                format!("[{}]", idx + 1)
            } else {
                format!("{}", idx + 1)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn progress_text(percent: u8) -> String {
    let filled = (percent as usize) / 10;
    let bar: String = (0..10).map(|idx| if idx < filled { '#' } else { '-' }).collect();
    format!("[{bar}] {percent}%")
}

fn breadcrumb_text(labels: &[String], active: usize) -> String {
    labels
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            if idx == active {
                format!("[{label}]")
            } else {
                label.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Render the payload as an HTML fragment with inline styles. This is the
/// consistency proof: radius, spacing, sizing, and palette all flow from the
/// same resolved style the other formats use.
pub fn render_html(payload: &StepPayload) -> String {
    let style = &payload.style;
    let mut custom_props = String::new();
    if style.custom_palette {
        custom_props = format!("--qf-primary:{};--qf-accent:{};", style.primary, style.accent);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "<section class=\"qf-card\" style=\"{}border-radius:{};padding:{}\">\n",
        custom_props, style.card_radius, style.section_padding
    ));
    out.push_str(&format!("<h2>{}</h2>\n", escape_html(&payload.form_title)));
    out.push_str(&format!(
        "<p class=\"qf-step\">Step {}/{}: {}</p>\n",
        payload.state.current_step + 1,
        payload.state.step_count,
        escape_html(&payload.step_title)
    ));
    out.push_str(&stepper_html(&payload.indicator, style));

    if payload.step_kind == StepKind::Fields {
        out.push_str(&format!("<form style=\"display:grid;gap:{}\">\n", style.gap));
        for field in payload.fields.iter().filter(|field| field.visible) {
            out.push_str(&field_html(field, style));
        }
        out.push_str("</form>\n");
    } else {
        out.push_str("<dl class=\"qf-summary\">\n");
        for row_item in &payload.summary {
            let tag = if row_item.emphasis { "strong" } else { "span" };
            out.push_str(&format!(
                "<dt>{}</dt><dd><{tag}>{}</{tag}></dd>\n",
                escape_html(&row_item.label),
                escape_html(&row_item.value)
            ));
        }
        out.push_str("</dl>\n");
    }

    out.push_str(&format!(
        "<aside class=\"qf-quote\" style=\"color:{}\">Total: ${}</aside>\n",
        style.primary, payload.quote.total
    ));
    out.push_str("</section>\n");
    out
}

fn stepper_html(indicator: &StepIndicator, style: &ResolvedStyle) -> String {
    match indicator {
        StepIndicator::Dots { total, active } => dots_html(*total, *active, style),
        StepIndicator::Numbers { total, active } => numbers_html(*total, *active, style),
        StepIndicator::Progress { percent } => progress_html(*percent, style),
        StepIndicator::Breadcrumb { labels, active } => breadcrumb_html(labels, *active, style),
    }
}

fn dots_html(total: usize, active: usize, style: &ResolvedStyle) -> String {
    let mut out = String::from("<nav class=\"qf-stepper-dots\">");
    for idx in 0..total {
        let fill = if idx <= active { style.primary.as_str() } else { "transparent" };
        out.push_str(&format!(
            "<i style=\"background:{};border-radius:{}\"></i>",
            fill, style.input_radius
        ));
    }
    out.push_str("</nav>\n");
    out
}

fn numbers_html(total: usize, active: usize, style: &ResolvedStyle) -> String {
    let mut out = String::from("<nav class=\"qf-stepper-numbers\">");
    for idx in 0..total {
        let background = if idx == active { style.primary.as_str() } else { "transparent" };
        out.push_str(&format!(
            "<b style=\"background:{};border-radius:{}\">{}</b>",
            background,
            style.button_radius,
            idx + 1
        ));
    }
    out.push_str("</nav>\n");
    out
}

fn progress_html(percent: u8, style: &ResolvedStyle) -> String {
    format!(
        "<nav class=\"qf-stepper-progress\"><div style=\"width:{}%;background:{};border-radius:{}\"></div></nav>\n",
        percent, style.primary, style.input_radius
    )
}

fn breadcrumb_html(labels: &[String], active: usize, style: &ResolvedStyle) -> String {
    let mut out = String::from("<nav class=\"qf-stepper-breadcrumb\">");
    for (idx, label) in labels.iter().enumerate() {
        if idx > 0 {
            out.push_str(&format!("<i style=\"color:{}\">&gt;</i>", style.accent));
        }
        let color = if idx == active { style.primary.as_str() } else { "inherit" };
        out.push_str(&format!("<a style=\"color:{}\">{}</a>", color, escape_html(label)));
    }
    out.push_str("</nav>\n");
    out
}

fn field_html(field: &RenderField, style: &ResolvedStyle) -> String {
    let control_style = format!(
        "height:{};padding:{};border-radius:{}",
        style.control_height, style.control_padding, style.input_radius
    );
    let value = field.value.as_ref().map(value_display).unwrap_or_default();
    let label = escape_html(&field.label);

    let control = match field.field_type {
        FieldType::Select => {
            let mut options = String::new();
            for option in field.options.iter().flatten() {
                let selected = if value == *option { " selected" } else { "" };
                options.push_str(&format!(
                    "<option{selected}>{}</option>",
                    escape_html(option)
                ));
            }
            format!(
                "<select name=\"{}\" style=\"{}\">{}</select>",
                escape_html(&field.name),
                control_style,
                options
            )
        }
        FieldType::Radio => {
            let mut group = String::new();
            for option in field.options.iter().flatten() {
                let checked = if value == *option { " checked" } else { "" };
                group.push_str(&format!(
                    "<label><input type=\"radio\" name=\"{}\" value=\"{}\"{checked}/>{}</label>",
                    escape_html(&field.name),
                    escape_html(option),
                    escape_html(option)
                ));
            }
            group
        }
        FieldType::Checkbox => {
            let checked = if field.value == Some(Value::Bool(true)) { " checked" } else { "" };
            format!(
                "<input type=\"checkbox\" name=\"{}\"{checked}/>",
                escape_html(&field.name)
            )
        }
        FieldType::Textarea => format!(
            "<textarea name=\"{}\" style=\"padding:{};border-radius:{}\">{}</textarea>",
            escape_html(&field.name),
            style.control_padding,
            style.input_radius,
            escape_html(&value)
        ),
        kind => {
            let input_type = match kind {
                FieldType::Email => "email",
                FieldType::Phone => "tel",
                FieldType::Number => "number",
                FieldType::Date => "date",
                _ => "text",
            };
            let placeholder = match style.label {
                LabelTreatment::Floating => field.label.as_str(),
                _ => field.placeholder.as_deref().unwrap_or(""),
            };
            format!(
                "<input type=\"{input_type}\" name=\"{}\" value=\"{}\" placeholder=\"{}\" style=\"{}\"/>",
                escape_html(&field.name),
                escape_html(&value),
                escape_html(placeholder),
                control_style
            )
        }
    };

    match style.label {
        LabelTreatment::Block => format!("<label>{label}<br/>{control}</label>\n"),
        LabelTreatment::Column => format!(
            "<label><span style=\"display:inline-block;width:{}\">{label}</span>{control}</label>\n",
            style.label_width.unwrap_or("140px")
        ),
        LabelTreatment::Floating => format!("<label>{control}</label>\n"),
    }
}

fn field_type_label(kind: FieldType) -> &'static str {
    match kind {
        FieldType::Text | FieldType::Unknown => "text",
        FieldType::Email => "email",
        FieldType::Phone => "phone",
        FieldType::Number => "number",
        FieldType::Date => "date",
        FieldType::Select => "select",
        FieldType::Radio => "radio",
        FieldType::Checkbox => "checkbox",
        FieldType::Textarea => "textarea",
    }
}

fn step_kind_label(kind: StepKind) -> &'static str {
    match kind {
        StepKind::Fields => "fields",
        StepKind::Review => "review",
    }
}

fn value_display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(num) => num.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_display)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
