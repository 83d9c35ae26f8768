use serde_json::json;

use form_spec::{
    Condition, FieldValueStore, FormSchema, is_visible, resolve_visibility,
    visible_fields_for_step,
};

fn payment_schema() -> FormSchema {
    serde_json::from_value(json!({
        "title": "Payment",
        "fields": [
            {
                "id": "paymentMethod",
                "name": "paymentMethod",
                "label": "Payment method",
                "type": "radio",
                "options": ["card", "paypal"]
            },
            {
                "id": "cardNumber",
                "name": "cardNumber",
                "label": "Card number",
                "type": "text",
                "conditional": { "field": "paymentMethod", "value": "card" }
            },
            {
                "id": "paypalEmail",
                "name": "paypalEmail",
                "label": "PayPal email",
                "type": "email",
                "conditional": { "field": "paymentMethod", "value": "paypal" }
            }
        ]
    }))
    .expect("deserialize")
}

#[test]
fn fields_without_predicates_are_always_visible() {
    let schema = payment_schema();
    let store = FieldValueStore::new();
    let visibility = resolve_visibility(&schema, &store);
    assert_eq!(visibility.get("paymentMethod"), Some(&true));
    assert_eq!(visibility.get("cardNumber"), Some(&false));
    assert_eq!(visibility.get("paypalEmail"), Some(&false));
}

#[test]
fn predicate_follows_the_watched_field() {
    let schema = payment_schema();
    let mut store = FieldValueStore::new();

    store.set("paymentMethod", json!("card"));
    let visibility = resolve_visibility(&schema, &store);
    assert_eq!(visibility.get("cardNumber"), Some(&true));
    assert_eq!(visibility.get("paypalEmail"), Some(&false));

    store.set("paymentMethod", json!("paypal"));
    let visibility = resolve_visibility(&schema, &store);
    assert_eq!(visibility.get("cardNumber"), Some(&false));
    assert_eq!(visibility.get("paypalEmail"), Some(&true));
}

#[test]
fn equality_is_strict_across_json_types() {
    let condition = Condition { field: "numTravellers".into(), value: json!("1") };
    let mut store = FieldValueStore::new();

    store.set("numTravellers", json!(1));
    assert!(!is_visible(Some(&condition), &store));

    store.set("numTravellers", json!("1"));
    assert!(is_visible(Some(&condition), &store));

    let boolean = Condition { field: "agreed".into(), value: json!(true) };
    store.set("agreed", json!("true"));
    assert!(!is_visible(Some(&boolean), &store));
    store.set("agreed", json!(true));
    assert!(is_visible(Some(&boolean), &store));
}

#[test]
fn missing_watched_field_hides_the_dependent() {
    let condition = Condition { field: "plan".into(), value: json!("premium") };
    let store = FieldValueStore::new();
    assert!(!is_visible(Some(&condition), &store));
    assert!(is_visible(None, &store));
}

#[test]
fn evaluation_is_pure_across_unrelated_changes() {
    let condition = Condition { field: "plan".into(), value: json!("gold") };
    let mut store = FieldValueStore::new();
    store.set("plan", json!("gold"));

    let first = is_visible(Some(&condition), &store);
    store.set("destination", json!("US"));
    store.set("notes", json!("window seat"));
    let second = is_visible(Some(&condition), &store);
    assert_eq!(first, second);
    assert!(second);
}

#[test]
fn visible_step_fields_keep_schema_order() {
    let schema: FormSchema = serde_json::from_str(include_str!("fixtures/travel_form.json"))
        .expect("deserialize fixture");
    let mut store = FieldValueStore::new();
    store.set("paymentMethod", json!("card"));

    let visible = visible_fields_for_step(&schema, &store, 3);
    assert_eq!(visible, vec!["paymentMethod", "cardNumber", "notes"]);
}
