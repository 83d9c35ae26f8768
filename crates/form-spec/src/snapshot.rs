use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_cbor::{to_vec, value::to_value};
use serde_json::Value;

use crate::pricing::PriceQuote;

/// Optional metadata paired with a `QuoteSnapshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

/// Exportable capture of one `onFormDataChange` emission: the full form-data
/// object plus the quote derived from it. Consumers get a whole new snapshot
/// per change; there is no diffing contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSnapshot {
    pub form_title: String,
    pub form_data: Value,
    pub quote: PriceQuote,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<SnapshotMeta>,
}

impl QuoteSnapshot {
    pub fn new(form_title: impl Into<String>, form_data: Value, quote: PriceQuote) -> Self {
        Self { form_title: form_title.into(), form_data, quote, meta: None }
    }

    /// Serializes the snapshot as canonical CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        let canonical = to_value(self)?;
        to_vec(&canonical)
    }

    /// Serializes the snapshot as indented JSON for debugging.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::pricing::{QuoteInput, quote};

    use super::*;

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = QuoteSnapshot::new(
            "Travel Quote",
            json!({"destination": "US", "numTravellers": "2"}),
            quote(&QuoteInput::default()),
        );
        let pretty = snapshot.to_json_pretty().unwrap();
        let parsed: QuoteSnapshot = serde_json::from_str(&pretty).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn cbor_export_is_non_empty_and_stable() {
        let snapshot = QuoteSnapshot::new(
            "Travel Quote",
            json!({"plan": "gold"}),
            quote(&QuoteInput::default()),
        );
        let first = snapshot.to_cbor().unwrap();
        let second = snapshot.to_cbor().unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}
