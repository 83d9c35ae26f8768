use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Traveller list bounds; the count field always clamps into this range.
pub const MIN_TRAVELLERS: usize = 1;
pub const MAX_TRAVELLERS: usize = 10;

/// Stable per-record id assigned at append time. UI state keys on it, so
/// records keep their state when the list shrinks and regrows.
pub type RecordId = u64;

/// One traveller of the quote. Values mirror the raw inputs; age stays a
/// string until validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TravellerRecord {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub passport_number: String,
    #[serde(default = "default_medical")]
    pub has_medical_conditions: String,
}

fn default_medical() -> String {
    "no".to_string()
}

impl TravellerRecord {
    pub fn blank(id: RecordId) -> Self {
        Self {
            id,
            full_name: String::new(),
            age: String::new(),
            passport_number: String::new(),
            has_medical_conditions: default_medical(),
        }
    }

    /// Record-scoped lookup backing per-traveller conditional UI.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "fullName" => Some(Value::String(self.full_name.clone())),
            "age" => Some(Value::String(self.age.clone())),
            "passportNumber" => Some(Value::String(self.passport_number.clone())),
            "hasMedicalConditions" => Some(Value::String(self.has_medical_conditions.clone())),
            _ => None,
        }
    }

    /// Applies one edit; unknown names are ignored and reported.
    pub fn set_field(&mut self, name: &str, value: &Value) -> bool {
        let text = scalar_text(value);
        match name {
            "fullName" => self.full_name = text,
            "age" => self.age = text,
            "passportNumber" => self.passport_number = text,
            "hasMedicalConditions" => self.has_medical_conditions = text,
            _ => return false,
        }
        true
    }

    pub fn is_blank(&self) -> bool {
        self.full_name.is_empty()
            && self.age.is_empty()
            && self.passport_number.is_empty()
            && self.has_medical_conditions == "no"
    }
}

/// Per-traveller UI state re-keyed alongside the record list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TravellerUiState {
    #[serde(default)]
    pub conditions_open: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
}

/// Parses a raw count value the way the count input produces it: strings and
/// numbers yield their integer prefix, anything else is `None` and the caller
/// leaves the roster untouched.
pub fn parse_count(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

/// `parse_count` clamped into the traveller bounds.
pub fn desired_count(raw: &Value) -> Option<usize> {
    parse_count(raw).map(|n| n.clamp(MIN_TRAVELLERS as i64, MAX_TRAVELLERS as i64) as usize)
}

fn leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1_i64, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Absurdly long digit runs saturate instead of failing, so they still clamp.
    Some(sign * digits[..end].parse::<i64>().unwrap_or(i64::MAX))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Grow-or-truncate to `desired` travellers, preserving existing entries.
/// Growth appends blanks with fresh ids drawn from `next_id`; shrink drops
/// from the end only. Matching lengths return the list unchanged.
pub fn sync(current: &[TravellerRecord], desired: usize, next_id: &mut RecordId) -> Vec<TravellerRecord> {
    let desired = desired.clamp(MIN_TRAVELLERS, MAX_TRAVELLERS);
    let mut records = current.to_vec();
    if desired < records.len() {
        records.truncate(desired);
    } else {
        while records.len() < desired {
            let id = *next_id;
            *next_id += 1;
            records.push(TravellerRecord::blank(id));
        }
    }
    records
}

/// Owns the traveller list, the per-record UI-state map, and the id
/// allocator. Created on renderer mount; length is derived from the count
/// field and never independently settable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravellerRoster {
    records: Vec<TravellerRecord>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    ui: BTreeMap<RecordId, TravellerUiState>,
    next_id: RecordId,
}

impl TravellerRoster {
    /// Fresh roster with the minimum single blank traveller.
    pub fn new() -> Self {
        let mut next_id = 1;
        let records = sync(&[], MIN_TRAVELLERS, &mut next_id);
        let ui = records
            .iter()
            .map(|record| (record.id, TravellerUiState::default()))
            .collect();
        Self { records, ui, next_id }
    }

    /// Rebuilds a roster from snapshot records. Hand-written data may omit
    /// ids; they are reassigned when missing or duplicated.
    pub fn from_records(mut records: Vec<TravellerRecord>) -> Self {
        let ids: BTreeSet<RecordId> = records.iter().map(|record| record.id).collect();
        let unique = ids.len() == records.len() && !ids.contains(&0);
        let mut next_id = 1;
        if unique {
            next_id = records.iter().map(|record| record.id).max().unwrap_or(0) + 1;
        } else {
            for record in &mut records {
                record.id = next_id;
                next_id += 1;
            }
        }
        let ui = records
            .iter()
            .map(|record| (record.id, TravellerUiState::default()))
            .collect();
        Self { records, ui, next_id }
    }

    /// Reads the `travellers` key of a form-data snapshot.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Array(items)) => {
                let records = items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect();
                Self::from_records(records)
            }
            _ => Self::new(),
        }
    }

    pub fn records(&self) -> &[TravellerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, index: usize) -> Option<&TravellerRecord> {
        self.records.get(index)
    }

    pub fn set_record_field(&mut self, index: usize, field: &str, value: &Value) -> bool {
        match self.records.get_mut(index) {
            Some(record) => record.set_field(field, value),
            None => false,
        }
    }

    pub fn ui(&self, id: RecordId) -> Option<&TravellerUiState> {
        self.ui.get(&id)
    }

    pub fn ui_mut(&mut self, id: RecordId) -> &mut TravellerUiState {
        self.ui.entry(id).or_default()
    }

    /// Applies the raw count field value. Non-numeric input leaves everything
    /// untouched; a matching count is the idempotent no-op that prevents
    /// feedback loops.
    pub fn sync_raw(&mut self, raw: &Value) -> bool {
        match desired_count(raw) {
            Some(desired) => self.sync_count(desired),
            None => false,
        }
    }

    /// Grow/truncate to `desired` and re-key the UI-state map with the same
    /// rule: surviving records keep their state, new records start default.
    pub fn sync_count(&mut self, desired: usize) -> bool {
        let desired = desired.clamp(MIN_TRAVELLERS, MAX_TRAVELLERS);
        if desired == self.records.len() {
            return false;
        }
        self.records = sync(&self.records, desired, &mut self.next_id);
        let live: BTreeSet<RecordId> = self.records.iter().map(|record| record.id).collect();
        self.ui.retain(|id, _| live.contains(id));
        for record in &self.records {
            self.ui.entry(record.id).or_default();
        }
        true
    }

    /// Snapshot form: the bare record array under the `travellers` key.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(&self.records).unwrap_or(Value::Array(Vec::new()))
    }
}

impl Default for TravellerRoster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_count_takes_integer_prefix() {
        assert_eq!(parse_count(&json!("3")), Some(3));
        assert_eq!(parse_count(&json!(" 4 ")), Some(4));
        assert_eq!(parse_count(&json!("7 adults")), Some(7));
        assert_eq!(parse_count(&json!("3.9")), Some(3));
        assert_eq!(parse_count(&json!(5)), Some(5));
        assert_eq!(parse_count(&json!(5.7)), Some(5));
        assert_eq!(parse_count(&json!("")), None);
        assert_eq!(parse_count(&json!("abc")), None);
        assert_eq!(parse_count(&json!(null)), None);
        assert_eq!(parse_count(&json!(true)), None);
    }

    #[test]
    fn desired_count_clamps_into_bounds() {
        assert_eq!(desired_count(&json!("0")), Some(1));
        assert_eq!(desired_count(&json!("-2")), Some(1));
        assert_eq!(desired_count(&json!("15")), Some(10));
        assert_eq!(desired_count(&json!("99999999999999999999")), Some(10));
    }

    #[test]
    fn ui_state_survives_shrink_and_regrow_by_id() {
        let mut roster = TravellerRoster::new();
        roster.sync_count(3);
        let second_id = roster.records()[1].id;
        roster.ui_mut(second_id).conditions_open = true;

        roster.sync_count(2);
        assert!(roster.ui(second_id).is_some_and(|ui| ui.conditions_open));

        // The record that held the state is gone once it is truncated away.
        roster.sync_count(1);
        assert!(roster.ui(second_id).is_none());
        roster.sync_count(3);
        assert!(roster.ui(second_id).is_none());
    }

    #[test]
    fn sync_raw_ignores_garbage() {
        let mut roster = TravellerRoster::new();
        roster.sync_count(4);
        assert!(!roster.sync_raw(&json!("not a number")));
        assert_eq!(roster.len(), 4);
        assert!(!roster.sync_raw(&json!(null)));
        assert_eq!(roster.len(), 4);
    }

    #[test]
    fn from_records_reassigns_missing_ids() {
        let roster = TravellerRoster::from_records(vec![
            TravellerRecord {
                id: 0,
                full_name: "Ada".to_string(),
                ..TravellerRecord::blank(0)
            },
            TravellerRecord::blank(0),
        ]);
        let ids: Vec<RecordId> = roster.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(roster.records()[0].full_name, "Ada");
    }
}
