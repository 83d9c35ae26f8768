use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema::StepPlan;
use crate::theme::{TemplateFlavor, ThemeSpec};

/// Ambient palette used when neither the config nor the active template
/// overrides it.
pub const DEFAULT_PRIMARY: &str = "#4f46e5";
pub const DEFAULT_ACCENT: &str = "#06b6d4";

/// Fixed section padding of the creative template; wins over the spacing
/// table regardless of the spacing setting.
pub const CREATIVE_SECTION_PADDING: &str = "24px 16px";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum BorderRadius {
    Sharp,
    #[default]
    Rounded,
    Pill,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    Compact,
    #[default]
    Comfortable,
    Spacious,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepperType {
    #[default]
    Dots,
    Numbers,
    Progress,
    Breadcrumb,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    #[default]
    Top,
    Left,
    Inline,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputSize {
    Sm,
    #[default]
    Md,
    Lg,
    #[serde(other)]
    Unknown,
}

/// Host-owned presentation knobs; immutable for a render pass. Unknown axis
/// values deserialize to the fallback variant and resolve to the documented
/// default, so a stale or hand-edited config never breaks a render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PresentationConfig {
    #[serde(default)]
    pub border_radius: BorderRadius,
    #[serde(default)]
    pub spacing: Spacing,
    #[serde(default)]
    pub stepper_type: StepperType,
    #[serde(default)]
    pub label_position: LabelPosition,
    #[serde(default)]
    pub input_size: InputSize,
    /// `None` keeps the ambient palette. An explicit empty list is preserved
    /// as such; downstream code branches on the first color being present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_colors: Option<Vec<String>>,
}

/// How a field label is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LabelTreatment {
    Block,
    Column,
    Floating,
}

/// Concrete style primitives. Every renderer reads these and only these;
/// no renderer may invent a visual value of its own.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    pub card_radius: &'static str,
    pub input_radius: &'static str,
    pub button_radius: &'static str,
    pub gap: &'static str,
    pub section_padding: &'static str,
    pub control_height: &'static str,
    pub control_padding: &'static str,
    pub label: LabelTreatment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_width: Option<&'static str>,
    pub primary: String,
    pub accent: String,
    /// True when `themeColors` supplied at least one color; renderers emit
    /// named custom properties only then.
    pub custom_palette: bool,
}

/// Resolves the whole configuration against the active template. Total: every
/// axis value, including the unknown fallback, lands on a defined output.
pub fn resolve_style(config: &PresentationConfig, template: Option<&ThemeSpec>) -> ResolvedStyle {
    let (card_radius, input_radius, button_radius) = radius_values(config.border_radius);
    let (gap, spacing_padding) = spacing_values(config.spacing);
    let section_padding = match template {
        Some(theme) if theme.flavor == TemplateFlavor::Creative => CREATIVE_SECTION_PADDING,
        _ => spacing_padding,
    };
    let (control_height, control_padding) = input_size_values(config.input_size);
    let (label, label_width) = label_values(config.label_position);
    let (primary, accent, custom_palette) = palette(config.theme_colors.as_ref(), template);
    ResolvedStyle {
        card_radius,
        input_radius,
        button_radius,
        gap,
        section_padding,
        control_height,
        control_padding,
        label,
        label_width,
        primary,
        accent,
        custom_palette,
    }
}

/// Card, input, and button radii are separate domains: pill means 24px cards
/// but fully round controls.
fn radius_values(radius: BorderRadius) -> (&'static str, &'static str, &'static str) {
    match radius {
        BorderRadius::Sharp => ("0px", "0px", "0px"),
        BorderRadius::Rounded | BorderRadius::Unknown => ("16px", "8px", "8px"),
        BorderRadius::Pill => ("24px", "9999px", "9999px"),
    }
}

fn spacing_values(spacing: Spacing) -> (&'static str, &'static str) {
    match spacing {
        Spacing::Compact => ("8px", "12px 12px"),
        Spacing::Comfortable | Spacing::Unknown => ("16px", "20px 20px"),
        Spacing::Spacious => ("24px", "32px 32px"),
    }
}

fn input_size_values(size: InputSize) -> (&'static str, &'static str) {
    match size {
        InputSize::Sm => ("32px", "6px 10px"),
        InputSize::Md | InputSize::Unknown => ("40px", "8px 12px"),
        InputSize::Lg => ("48px", "12px 16px"),
    }
}

fn label_values(position: LabelPosition) -> (LabelTreatment, Option<&'static str>) {
    match position {
        LabelPosition::Top | LabelPosition::Unknown => (LabelTreatment::Block, None),
        LabelPosition::Left => (LabelTreatment::Column, Some("140px")),
        LabelPosition::Inline => (LabelTreatment::Floating, None),
    }
}

fn palette(
    theme_colors: Option<&Vec<String>>,
    template: Option<&ThemeSpec>,
) -> (String, String, bool) {
    let template_colors = template.and_then(|theme| theme.colors.as_ref());
    let fallback_primary = template_colors
        .and_then(|colors| colors.first())
        .map(String::as_str)
        .unwrap_or(DEFAULT_PRIMARY);
    let fallback_accent = template_colors
        .and_then(|colors| colors.get(1))
        .map(String::as_str)
        .unwrap_or(DEFAULT_ACCENT);

    let custom = theme_colors.and_then(|colors| colors.first());
    let primary = custom.map(String::as_str).unwrap_or(fallback_primary);
    let accent = theme_colors
        .and_then(|colors| colors.get(1))
        .map(String::as_str)
        .unwrap_or(fallback_accent);
    (primary.to_string(), accent.to_string(), custom.is_some())
}

/// Step indicator model; one variant per stepper renderer. Renderers for each
/// variant read radius and palette from `ResolvedStyle` independently.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepIndicator {
    Dots { total: usize, active: usize },
    Numbers { total: usize, active: usize },
    Progress { percent: u8 },
    Breadcrumb { labels: Vec<String>, active: usize },
}

/// Discriminated dispatch on the configured stepper type.
pub fn step_indicator(
    config: &PresentationConfig,
    plan: &StepPlan,
    current_step: usize,
) -> StepIndicator {
    let total = plan.step_count().max(1);
    let active = current_step.min(total - 1);
    match config.stepper_type {
        StepperType::Dots | StepperType::Unknown => StepIndicator::Dots { total, active },
        StepperType::Numbers => StepIndicator::Numbers { total, active },
        StepperType::Progress => {
            let percent = ((active + 1) * 100 / total) as u8;
            StepIndicator::Progress { percent }
        }
        StepperType::Breadcrumb => StepIndicator::Breadcrumb { labels: plan.titles(), active },
    }
}
