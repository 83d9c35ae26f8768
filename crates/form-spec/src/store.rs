use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

/// Reserved field names read by the quote and roster layers. The store itself
/// is schema-agnostic.
pub const FIELD_NUM_TRAVELLERS: &str = "numTravellers";
pub const FIELD_START_DATE: &str = "startDate";
pub const FIELD_END_DATE: &str = "endDate";
pub const FIELD_DESTINATION: &str = "destination";
pub const FIELD_PLAN: &str = "plan";
pub const FIELD_ADD_ONS: &str = "addOns";
/// Ephemeral UI fields. They live in the store like any other value; renderer
/// chrome seeds them when the schema declares no matching field.
pub const FIELD_SELECTED_PLAN: &str = "selectedPlan";
pub const FIELD_PAYMENT_METHOD: &str = "paymentMethod";
/// Form-data key carrying the traveller records in snapshots.
pub const KEY_TRAVELLERS: &str = "travellers";

pub type SubscriptionId = u64;

enum Watch {
    Field(String),
    Snapshot,
}

struct Subscriber {
    id: SubscriptionId,
    watch: Watch,
    callback: Box<dyn FnMut(&Value)>,
}

/// Single source of truth for every field value, including ephemeral UI-only
/// fields. Mutated only by the field whose change event fired; every other
/// component reads it within a pass.
///
/// Observation is explicit: `subscribe` delivers the new value of one field,
/// `watch` delivers a full form-data snapshot per change. Callbacks receive
/// values by reference and never re-enter the store, which keeps local
/// mirrors in sync without stale-closure reads.
pub struct FieldValueStore {
    values: BTreeMap<String, Value>,
    subscribers: Vec<Subscriber>,
    next_subscription: SubscriptionId,
}

impl FieldValueStore {
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            subscribers: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Seeds a store from a JSON object; anything else yields an empty store.
    pub fn from_object(value: &Value) -> Self {
        let mut store = Self::new();
        if let Value::Object(map) = value {
            for (key, val) in map {
                store.values.insert(key.clone(), val.clone());
            }
        }
        store
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Writes one field and notifies its subscribers plus snapshot watchers.
    /// Every call counts as a change event; there is no diffing contract.
    pub fn set(&mut self, field: &str, value: Value) {
        self.values.insert(field.to_string(), value);
        self.notify(field);
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        let removed = self.values.remove(field);
        if removed.is_some() {
            self.notify(field);
        }
        removed
    }

    /// "Start new quote": clears all values. Subscriptions stay alive, each
    /// component still owns the ones it registered; snapshot watchers see the
    /// empty state.
    pub fn reset(&mut self) {
        self.values.clear();
        let empty = Value::Object(Map::new());
        for sub in &mut self.subscribers {
            if matches!(sub.watch, Watch::Snapshot) {
                (sub.callback)(&empty);
            }
        }
    }

    /// Full form-data snapshot as a JSON object.
    pub fn snapshot(&self) -> Value {
        object_from(&self.values)
    }

    /// Registers a callback for one field. It fires after every write to that
    /// field with the new value.
    pub fn subscribe(
        &mut self,
        field: &str,
        callback: impl FnMut(&Value) + 'static,
    ) -> SubscriptionId {
        self.push_subscriber(Watch::Field(field.to_string()), Box::new(callback))
    }

    /// Registers a snapshot watcher: a full form-data object per change, the
    /// `onFormDataChange` boundary.
    pub fn watch(&mut self, callback: impl FnMut(&Value) + 'static) -> SubscriptionId {
        self.push_subscriber(Watch::Snapshot, Box::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|sub| sub.id != id);
        self.subscribers.len() != before
    }

    fn push_subscriber(&mut self, watch: Watch, callback: Box<dyn FnMut(&Value)>) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push(Subscriber { id, watch, callback });
        id
    }

    fn notify(&mut self, field: &str) {
        let value = self.values.get(field).cloned().unwrap_or(Value::Null);
        let values = &self.values;
        let mut snapshot: Option<Value> = None;
        for sub in &mut self.subscribers {
            match &sub.watch {
                Watch::Field(name) if name == field => (sub.callback)(&value),
                Watch::Snapshot => {
                    let snap = snapshot.get_or_insert_with(|| object_from(values));
                    (sub.callback)(snap);
                }
                Watch::Field(_) => {}
            }
        }
    }
}

impl Default for FieldValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FieldValueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValueStore")
            .field("values", &self.values)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

fn object_from(values: &BTreeMap<String, Value>) -> Value {
    Value::Object(values.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}
