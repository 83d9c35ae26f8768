use serde_json::json;

use form_spec::{FieldValueStore, FormSchema, validate, validate_step};

fn fixture_schema() -> FormSchema {
    serde_json::from_str(include_str!("fixtures/travel_form.json")).expect("deserialize fixture")
}

fn complete_store() -> FieldValueStore {
    FieldValueStore::from_object(&json!({
        "startDate": "2025-06-01",
        "endDate": "2025-06-08",
        "destination": "US",
        "contactEmail": "ada@example.com",
        "numTravellers": "2",
        "plan": "premium",
        "addOns": ["adventure"],
        "paymentMethod": "card",
        "cardNumber": "4111 1111 1111 1111"
    }))
}

#[test]
fn empty_form_reports_visible_required_fields_only() {
    let schema = fixture_schema();
    let outcome = validate(&schema, &FieldValueStore::new());

    assert!(!outcome.valid);
    // cardNumber and paypalEmail sit behind a hidden payment branch.
    assert_eq!(
        outcome.missing_required,
        vec![
            "startDate",
            "endDate",
            "destination",
            "contactEmail",
            "numTravellers",
            "plan",
            "paymentMethod"
        ]
    );
}

#[test]
fn complete_form_passes() {
    let schema = fixture_schema();
    let outcome = validate(&schema, &complete_store());
    assert!(outcome.valid, "unexpected errors: {:?}", outcome.errors);
    assert!(outcome.errors.is_empty());
    assert!(outcome.missing_required.is_empty());
}

#[test]
fn choosing_a_payment_branch_requires_its_fields() {
    let schema = fixture_schema();
    let mut store = complete_store();
    store.remove("cardNumber");

    let outcome = validate(&schema, &store);
    assert!(!outcome.valid);
    assert_eq!(outcome.missing_required, vec!["cardNumber"]);

    store.set("paymentMethod", json!("paypal"));
    let outcome = validate(&schema, &store);
    assert_eq!(outcome.missing_required, vec!["paypalEmail"]);
}

#[test]
fn hidden_fields_are_never_validated() {
    let schema = fixture_schema();
    let mut store = complete_store();
    // Invalid email on the paypal branch, but the card branch is active.
    store.set("paypalEmail", json!("not-an-email"));

    let outcome = validate(&schema, &store);
    assert!(outcome.valid, "unexpected errors: {:?}", outcome.errors);
}

#[test]
fn email_rule_rejects_malformed_addresses() {
    let schema = fixture_schema();
    let mut store = complete_store();
    store.set("contactEmail", json!("not-an-email"));

    let outcome = validate(&schema, &store);
    assert!(!outcome.valid);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].field, "contactEmail");
    assert_eq!(outcome.errors[0].code, "email");
    assert_eq!(outcome.errors[0].message, "Enter a valid email address");
}

#[test]
fn pattern_rule_checks_the_card_number() {
    let schema = fixture_schema();
    let mut store = complete_store();
    store.set("cardNumber", json!("not a card"));

    let outcome = validate(&schema, &store);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].code, "pattern");
}

#[test]
fn numeric_bounds_apply_to_the_traveller_count() {
    let schema = fixture_schema();
    let mut store = complete_store();

    store.set("numTravellers", json!("0"));
    let outcome = validate(&schema, &store);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].code, "min");
    assert_eq!(outcome.errors[0].message, "At least one traveller");

    store.set("numTravellers", json!("11"));
    let outcome = validate(&schema, &store);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].code, "max");

    store.set("numTravellers", json!("5"));
    assert!(validate(&schema, &store).valid);
}

#[test]
fn length_rules_only_apply_to_entered_values() {
    let schema = fixture_schema();
    let mut store = complete_store();

    // Blank optional field: no rule fires.
    store.set("notes", json!(""));
    assert!(validate(&schema, &store).valid);

    store.set("notes", json!("x".repeat(501)));
    let outcome = validate(&schema, &store);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].code, "max_length");

    store.set("notes", json!("window seat please"));
    assert!(validate(&schema, &store).valid);
}

#[test]
fn unknown_rule_kinds_are_ignored() {
    let schema: FormSchema = serde_json::from_value(json!({
        "title": "Odd",
        "fields": [
            {
                "id": "a",
                "name": "a",
                "label": "A",
                "type": "text",
                "validations": [
                    { "type": "mustRhyme", "message": "should not fire" }
                ]
            }
        ]
    }))
    .expect("deserialize");

    let mut store = FieldValueStore::new();
    store.set("a", json!("anything"));
    assert!(validate(&schema, &store).valid);
}

#[test]
fn rule_messages_fall_back_to_the_field_label() {
    let schema: FormSchema = serde_json::from_value(json!({
        "title": "Terse",
        "fields": [
            {
                "id": "age",
                "name": "age",
                "label": "Age",
                "type": "number",
                "validations": [{ "type": "min", "value": 18 }]
            }
        ]
    }))
    .expect("deserialize");

    let mut store = FieldValueStore::new();
    store.set("age", json!("12"));
    let outcome = validate(&schema, &store);
    assert_eq!(outcome.errors[0].message, "Age value below minimum");
}

#[test]
fn step_validation_scopes_the_sweep() {
    let schema = fixture_schema();
    let store = FieldValueStore::new();

    let first = validate_step(&schema, &store, 0);
    assert_eq!(
        first.missing_required,
        vec!["startDate", "endDate", "destination", "contactEmail"]
    );

    let third = validate_step(&schema, &store, 2);
    assert_eq!(third.missing_required, vec!["plan"]);

    // The review bucket holds no fields, so it always passes.
    let review = validate_step(&schema, &store, 4);
    assert!(review.valid);
}

#[test]
fn step_scoped_predicates_still_read_the_full_store() {
    let schema = fixture_schema();
    let mut store = FieldValueStore::new();
    store.set("paymentMethod", json!("card"));

    let outcome = validate_step(&schema, &store, 3);
    assert!(outcome.missing_required.contains(&"cardNumber".to_string()));
    assert!(!outcome.missing_required.contains(&"paypalEmail".to_string()));
}
