use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{
    FIELD_ADD_ONS, FIELD_DESTINATION, FIELD_END_DATE, FIELD_NUM_TRAVELLERS, FIELD_PLAN,
    FIELD_SELECTED_PLAN, FIELD_START_DATE, FieldValueStore,
};
use crate::travellers::{self, MAX_TRAVELLERS, MIN_TRAVELLERS};

/// Business constants behind the quote formula. These are published pricing
/// data, not derived logic; the defaults carry exactly the documented values
/// and nothing beyond them.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingTables {
    pub high_cost_destinations: &'static [&'static str],
    pub high_cost_multiplier: f64,
    pub mid_cost_destinations: &'static [&'static str],
    pub mid_cost_multiplier: f64,
    pub plan_base_prices: &'static [(&'static str, i64)],
    pub default_plan_base_price: i64,
    pub add_on_prices: &'static [(&'static str, i64)],
    pub tax_rate: f64,
}

const HIGH_COST_DESTINATIONS: &[&str] = &[
    "US", "CA", "AU", "GB", "FR", "DE", "IT", "ES", "CH", "NL", "SE", "NO", "DK",
];
const MID_COST_DESTINATIONS: &[&str] = &["JP", "SG", "HK", "NZ", "KR", "AE", "IL"];
const PLAN_BASE_PRICES: &[(&str, i64)] = &[
    ("bronze", 50),
    ("silver", 100),
    ("gold", 150),
    ("basic", 50),
    ("standard", 100),
    ("premium", 150),
];
const ADD_ON_PRICES: &[(&str, i64)] =
    &[("adventure", 30), ("rental", 20), ("covid", 25), ("cancel", 40)];

impl Default for PricingTables {
    fn default() -> Self {
        Self {
            high_cost_destinations: HIGH_COST_DESTINATIONS,
            high_cost_multiplier: 1.5,
            mid_cost_destinations: MID_COST_DESTINATIONS,
            mid_cost_multiplier: 1.2,
            plan_base_prices: PLAN_BASE_PRICES,
            default_plan_base_price: 100,
            add_on_prices: ADD_ON_PRICES,
            tax_rate: 0.18,
        }
    }
}

/// Raw quote inputs. Every lookup miss degrades to a documented default, so
/// the quote is safe to recompute on every keystroke.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteInput {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub destination: Option<String>,
    pub plan: Option<String>,
    pub add_ons: Vec<String>,
    pub traveller_count: i64,
}

impl QuoteInput {
    /// Mirrors the reserved field names out of the store at call time, so a
    /// same-tick store update is always observed. The ephemeral
    /// `selectedPlan` wins over a schema-declared `plan` field.
    pub fn from_store(store: &FieldValueStore) -> Self {
        Self {
            start_date: date_value(store.get(FIELD_START_DATE)),
            end_date: date_value(store.get(FIELD_END_DATE)),
            destination: text_value(store.get(FIELD_DESTINATION)),
            plan: text_value(store.get(FIELD_SELECTED_PLAN))
                .or_else(|| text_value(store.get(FIELD_PLAN))),
            add_ons: list_value(store.get(FIELD_ADD_ONS)),
            traveller_count: store
                .get(FIELD_NUM_TRAVELLERS)
                .and_then(travellers::parse_count)
                .unwrap_or(0),
        }
    }
}

/// Itemized quote. Never stored; always recomputed from current field values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub trip_duration_days: i64,
    pub regional_multiplier: f64,
    pub plan_base_price: i64,
    pub base_premium: i64,
    pub add_ons_premium: i64,
    pub subtotal: i64,
    pub tax: i64,
    pub total: i64,
}

/// Quote against the default tables.
pub fn quote(input: &QuoteInput) -> PriceQuote {
    quote_with_tables(input, &PricingTables::default())
}

pub fn quote_with_tables(input: &QuoteInput, tables: &PricingTables) -> PriceQuote {
    let trip_duration_days = trip_duration_days(input.start_date, input.end_date);
    let regional_multiplier = multiplier_in(tables, input.destination.as_deref());
    let plan_base_price = plan_price_in(tables, input.plan.as_deref());
    let travellers = input
        .traveller_count
        .clamp(MIN_TRAVELLERS as i64, MAX_TRAVELLERS as i64);

    let base_premium_per_traveller = if trip_duration_days > 0 {
        round_currency(
            plan_base_price as f64 / 7.0 * trip_duration_days as f64 * regional_multiplier,
        )
    } else {
        plan_base_price
    };
    let base_premium = base_premium_per_traveller * travellers;

    let add_ons_total: i64 = input
        .add_ons
        .iter()
        .map(|add_on| add_on_price_in(tables, add_on))
        .sum();
    // Per traveller, but deliberately not scaled by the regional multiplier;
    // only the base premium is.
    let add_ons_premium = add_ons_total * travellers;

    let subtotal = base_premium + add_ons_premium;
    let tax = round_currency(subtotal as f64 * tables.tax_rate);
    let total = subtotal + tax;

    PriceQuote {
        trip_duration_days,
        regional_multiplier,
        plan_base_price,
        base_premium,
        add_ons_premium,
        subtotal,
        tax,
        total,
    }
}

/// Whole days between the dates, order-insensitive; 0 when either is missing.
pub fn trip_duration_days(start: Option<NaiveDate>, end: Option<NaiveDate>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) => (end - start).num_days().abs(),
        _ => 0,
    }
}

/// Round half away from zero to integer currency units.
pub fn round_currency(value: f64) -> i64 {
    value.round() as i64
}

/// Destination lookup against the default tables; exact code match, misses
/// fall through to 1.0.
pub fn regional_multiplier(destination: Option<&str>) -> f64 {
    multiplier_in(&PricingTables::default(), destination)
}

/// Case-insensitive plan lookup against the default tables.
pub fn plan_base_price(plan: Option<&str>) -> i64 {
    plan_price_in(&PricingTables::default(), plan)
}

/// Per-traveller add-on price; unknown add-ons contribute 0.
pub fn add_on_price(add_on: &str) -> i64 {
    add_on_price_in(&PricingTables::default(), add_on)
}

fn multiplier_in(tables: &PricingTables, destination: Option<&str>) -> f64 {
    match destination {
        Some(code) if tables.high_cost_destinations.contains(&code) => tables.high_cost_multiplier,
        Some(code) if tables.mid_cost_destinations.contains(&code) => tables.mid_cost_multiplier,
        _ => 1.0,
    }
}

fn plan_price_in(tables: &PricingTables, plan: Option<&str>) -> i64 {
    if let Some(plan) = plan {
        let lowered = plan.to_ascii_lowercase();
        for (name, price) in tables.plan_base_prices {
            if *name == lowered {
                return *price;
            }
        }
    }
    tables.default_plan_base_price
}

fn add_on_price_in(tables: &PricingTables, add_on: &str) -> i64 {
    tables
        .add_on_prices
        .iter()
        .find(|(name, _)| *name == add_on)
        .map(|(_, price)| *price)
        .unwrap_or(0)
}

fn date_value(raw: Option<&Value>) -> Option<NaiveDate> {
    let text = raw?.as_str()?;
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

fn text_value(raw: Option<&Value>) -> Option<String> {
    match raw? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Add-on selections arrive either as a JSON array of ids or as a
/// comma-separated string from a free-text input.
fn list_value(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
