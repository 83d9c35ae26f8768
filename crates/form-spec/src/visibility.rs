use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::FormSchema;
use crate::store::FieldValueStore;

pub type VisibilityMap = std::collections::BTreeMap<String, bool>;

/// Declarative visibility predicate attached to a field: visible iff the
/// named field's current value equals `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub field: String,
    pub value: Value,
}

impl Condition {
    /// Strict JSON equality, no coercion: `1` never matches `"1"`.
    pub fn matches(&self, candidate: Option<&Value>) -> bool {
        candidate == Some(&self.value)
    }
}

/// No predicate means always visible. Stateless and cache-free; callers
/// re-evaluate on every store change.
pub fn is_visible(predicate: Option<&Condition>, store: &FieldValueStore) -> bool {
    match predicate {
        Some(condition) => condition.matches(store.get(&condition.field)),
        None => true,
    }
}

/// Evaluates every field of the schema against the current store.
pub fn resolve_visibility(schema: &FormSchema, store: &FieldValueStore) -> VisibilityMap {
    let mut map = VisibilityMap::new();
    for field in &schema.fields {
        map.insert(field.name.clone(), is_visible(field.conditional.as_ref(), store));
    }
    map
}

/// Names of the fields in the `step` bucket that are currently visible, in
/// schema order.
pub fn visible_fields_for_step(
    schema: &FormSchema,
    store: &FieldValueStore,
    step: usize,
) -> Vec<String> {
    schema
        .fields
        .iter()
        .filter(|field| field.step() == step)
        .filter(|field| is_visible(field.conditional.as_ref(), store))
        .map(|field| field.name.clone())
        .collect()
}
