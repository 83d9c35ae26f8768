use serde_json::json;

use form_spec::theme::ThemeRegistry;
use form_spec::{
    BorderRadius, FormSchema, InputSize, LabelPosition, LabelTreatment, PresentationConfig,
    Spacing, StepIndicator, StepperType, resolve_style, step_indicator,
};

fn config() -> PresentationConfig {
    PresentationConfig::default()
}

#[test]
fn every_axis_value_resolves_to_defined_output() {
    let radii = [
        BorderRadius::Sharp,
        BorderRadius::Rounded,
        BorderRadius::Pill,
        BorderRadius::Unknown,
    ];
    let spacings = [
        Spacing::Compact,
        Spacing::Comfortable,
        Spacing::Spacious,
        Spacing::Unknown,
    ];
    let sizes = [InputSize::Sm, InputSize::Md, InputSize::Lg, InputSize::Unknown];
    let labels = [
        LabelPosition::Top,
        LabelPosition::Left,
        LabelPosition::Inline,
        LabelPosition::Unknown,
    ];

    for radius in radii {
        for spacing in spacings {
            for size in sizes {
                for label in labels {
                    let style = resolve_style(
                        &PresentationConfig {
                            border_radius: radius,
                            spacing,
                            input_size: size,
                            label_position: label,
                            ..config()
                        },
                        None,
                    );
                    assert!(!style.card_radius.is_empty());
                    assert!(!style.gap.is_empty());
                    assert!(!style.section_padding.is_empty());
                    assert!(!style.control_height.is_empty());
                    assert!(!style.primary.is_empty());
                }
            }
        }
    }
}

#[test]
fn radius_setting_drives_three_distinct_domains() {
    let pill = resolve_style(
        &PresentationConfig { border_radius: BorderRadius::Pill, ..config() },
        None,
    );
    assert_eq!(pill.card_radius, "24px");
    assert_eq!(pill.input_radius, "9999px");
    assert_eq!(pill.button_radius, "9999px");

    let sharp = resolve_style(
        &PresentationConfig { border_radius: BorderRadius::Sharp, ..config() },
        None,
    );
    assert_eq!(sharp.card_radius, "0px");
    assert_eq!(sharp.input_radius, "0px");

    let rounded = resolve_style(&config(), None);
    assert_eq!(rounded.card_radius, "16px");
    assert_eq!(rounded.input_radius, "8px");
}

#[test]
fn spacing_table_covers_gap_and_padding() {
    let compact = resolve_style(
        &PresentationConfig { spacing: Spacing::Compact, ..config() },
        None,
    );
    assert_eq!(compact.gap, "8px");
    assert_eq!(compact.section_padding, "12px 12px");

    let spacious = resolve_style(
        &PresentationConfig { spacing: Spacing::Spacious, ..config() },
        None,
    );
    assert_eq!(spacious.gap, "24px");
    assert_eq!(spacious.section_padding, "32px 32px");
}

#[test]
fn creative_template_pins_the_section_padding() {
    let registry = ThemeRegistry::builtin();
    let creative = registry.get("creative");
    let modern = registry.get("modern");

    for spacing in [Spacing::Compact, Spacing::Comfortable, Spacing::Spacious] {
        let cfg = PresentationConfig { spacing, ..config() };
        let pinned = resolve_style(&cfg, creative);
        assert_eq!(pinned.section_padding, "24px 16px");
        // Gap still follows the spacing table; only the padding is pinned.
        assert_eq!(pinned.gap, resolve_style(&cfg, modern).gap);
    }

    let unpinned = resolve_style(
        &PresentationConfig { spacing: Spacing::Spacious, ..config() },
        modern,
    );
    assert_eq!(unpinned.section_padding, "32px 32px");
}

#[test]
fn input_size_sets_height_and_padding_pairs() {
    let sm = resolve_style(&PresentationConfig { input_size: InputSize::Sm, ..config() }, None);
    assert_eq!((sm.control_height, sm.control_padding), ("32px", "6px 10px"));

    let lg = resolve_style(&PresentationConfig { input_size: InputSize::Lg, ..config() }, None);
    assert_eq!((lg.control_height, lg.control_padding), ("48px", "12px 16px"));
}

#[test]
fn left_labels_reserve_a_fixed_column() {
    let left = resolve_style(
        &PresentationConfig { label_position: LabelPosition::Left, ..config() },
        None,
    );
    assert_eq!(left.label, LabelTreatment::Column);
    assert_eq!(left.label_width, Some("140px"));

    let top = resolve_style(&config(), None);
    assert_eq!(top.label, LabelTreatment::Block);
    assert_eq!(top.label_width, None);

    let inline = resolve_style(
        &PresentationConfig { label_position: LabelPosition::Inline, ..config() },
        None,
    );
    assert_eq!(inline.label, LabelTreatment::Floating);
}

#[test]
fn palette_prefers_config_colors_over_template_over_defaults() {
    let registry = ThemeRegistry::builtin();
    let classic = registry.get("classic");

    let configured = resolve_style(
        &PresentationConfig {
            theme_colors: Some(vec!["#123456".into(), "#654321".into()]),
            ..config()
        },
        classic,
    );
    assert_eq!(configured.primary, "#123456");
    assert_eq!(configured.accent, "#654321");
    assert!(configured.custom_palette);

    let templated = resolve_style(&config(), classic);
    assert_eq!(templated.primary, "#1e3a5f");
    assert_eq!(templated.accent, "#b45309");
    assert!(!templated.custom_palette);

    let ambient = resolve_style(&config(), None);
    assert_eq!(ambient.primary, "#4f46e5");
    assert_eq!(ambient.accent, "#06b6d4");
    assert!(!ambient.custom_palette);
}

#[test]
fn single_custom_color_keeps_the_fallback_accent() {
    let style = resolve_style(
        &PresentationConfig { theme_colors: Some(vec!["#ff0000".into()]), ..config() },
        None,
    );
    assert_eq!(style.primary, "#ff0000");
    assert_eq!(style.accent, "#06b6d4");
    assert!(style.custom_palette);
}

#[test]
fn empty_color_list_stays_distinct_from_absent() {
    let explicit = PresentationConfig { theme_colors: Some(vec![]), ..config() };
    let absent = config();

    // Both fall back to the ambient palette when resolved.
    let resolved = resolve_style(&explicit, None);
    assert_eq!(resolved.primary, "#4f46e5");
    assert!(!resolved.custom_palette);

    // But the wire form still tells them apart.
    let explicit_json = serde_json::to_value(&explicit).unwrap();
    let absent_json = serde_json::to_value(&absent).unwrap();
    assert_eq!(explicit_json["themeColors"], json!([]));
    assert!(absent_json.get("themeColors").is_none());

    let round: PresentationConfig = serde_json::from_value(explicit_json).unwrap();
    assert_eq!(round.theme_colors, Some(vec![]));
}

#[test]
fn unknown_wire_values_fall_back_instead_of_failing() {
    let cfg: PresentationConfig = serde_json::from_value(json!({
        "borderRadius": "circle",
        "spacing": "cozy",
        "stepperType": "wheel",
        "labelPosition": "bottom",
        "inputSize": "xxl"
    }))
    .expect("deserialize");

    assert_eq!(cfg.border_radius, BorderRadius::Unknown);
    assert_eq!(cfg.spacing, Spacing::Unknown);

    let style = resolve_style(&cfg, None);
    assert_eq!(style.card_radius, "16px");
    assert_eq!(style.gap, "16px");
    assert_eq!(style.control_height, "40px");
    assert_eq!(style.label, LabelTreatment::Block);
}

#[test]
fn stepper_dispatch_matches_the_configured_type() {
    let schema: FormSchema = serde_json::from_str(include_str!("fixtures/travel_form.json"))
        .expect("deserialize fixture");
    let plan = schema.step_plan();

    let dots = step_indicator(&config(), &plan, 1);
    assert_eq!(dots, StepIndicator::Dots { total: 5, active: 1 });

    let numbers = step_indicator(
        &PresentationConfig { stepper_type: StepperType::Numbers, ..config() },
        &plan,
        0,
    );
    assert_eq!(numbers, StepIndicator::Numbers { total: 5, active: 0 });

    let progress = step_indicator(
        &PresentationConfig { stepper_type: StepperType::Progress, ..config() },
        &plan,
        2,
    );
    assert_eq!(progress, StepIndicator::Progress { percent: 60 });

    let breadcrumb = step_indicator(
        &PresentationConfig { stepper_type: StepperType::Breadcrumb, ..config() },
        &plan,
        4,
    );
    assert_eq!(
        breadcrumb,
        StepIndicator::Breadcrumb { labels: plan.titles(), active: 4 }
    );
}

#[test]
fn stepper_clamps_stale_positions() {
    let schema: FormSchema = serde_json::from_value(json!({
        "title": "Tiny",
        "fields": [{ "id": "a", "name": "a", "label": "A", "type": "text" }]
    }))
    .expect("deserialize");
    let plan = schema.step_plan();

    let indicator = step_indicator(&config(), &plan, 42);
    assert_eq!(indicator, StepIndicator::Dots { total: 2, active: 1 });
}
