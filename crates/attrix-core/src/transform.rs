//! Row transformer: maps one loosely-typed report row into the fixed
//! warehouse schema.
//!
//! The mapping is declarative data rather than inline branching: every
//! dimension and standard metric is one [`FieldSpec`] entry, and the
//! custom-event fields are driven off the catalog slugs. `transform_row` is
//! total; whatever the raw row looks like, every declared output field is
//! present in the result.

use serde_json::{Map, Value};

use crate::catalog;
use crate::client::RawReportRow;

/// Currency code stamped on every output row.
pub const CURRENCY_CODE: &str = "USD";

/// Data-source label stamped on every output row.
pub const DATA_SOURCE_NAME: &str = "Adjust API";

// Custom-event columns carry this prefix in the legacy warehouse schema.
const CUSTOM_EVENT_PREFIX: &str = "C_DATASCAPE_";

/// Fully-populated warehouse row; every declared field is always present.
pub type OutputRow = Map<String, Value>;

/// Per-field defaulting and coercion policy.
///
/// The divergent defaults are deliberate and mirror the legacy schema:
/// identifier-like dimensions fall back to the string `"unknown"`, the
/// platform falls back to `"mobile_app"`, and metrics fall back to zero.
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    /// Dimension copied verbatim; null when absent.
    Text,
    /// Dimension copied verbatim; the given literal when absent.
    TextOr(&'static str),
    /// Integer count; zero when absent, null, or unparseable.
    Count,
    /// Decimal currency amount; zero when absent, null, or unparseable.
    Amount,
}

impl FieldKind {
    fn coerce(self, value: Option<&Value>) -> Value {
        match self {
            Self::Text => value.cloned().unwrap_or(Value::Null),
            Self::TextOr(default) => value
                .cloned()
                .unwrap_or_else(|| Value::String((*default).to_owned())),
            Self::Count => Value::from(coerce_i64(value)),
            Self::Amount => Value::from(coerce_f64(value)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    source: &'static str,
    target: &'static str,
    kind: FieldKind,
}

const fn field(source: &'static str, target: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        source,
        target,
        kind,
    }
}

/// Source-key → target-key mapping for dimensions and standard metrics.
const FIELD_TABLE: &[FieldSpec] = &[
    // Dimensions
    field("day", "DATE", FieldKind::Text),
    field("app", "APP", FieldKind::Text),
    field("os_name", "OS_NAME", FieldKind::Text),
    field("device_type", "DEVICE_TYPE", FieldKind::Text),
    field("country", "COUNTRY", FieldKind::Text),
    field("country_code", "COUNTRY_CODE", FieldKind::Text),
    field("region", "REGION", FieldKind::Text),
    field("partner_id", "PARTNER_ID", FieldKind::Text),
    field("partner_name", "PARTNER_NAME", FieldKind::Text),
    field(
        "campaign_id_network",
        "CAMPAIGN_ID_NETWORK",
        FieldKind::TextOr("unknown"),
    ),
    field(
        "campaign_network",
        "CAMPAIGN_NETWORK",
        FieldKind::TextOr("unknown"),
    ),
    field(
        "adgroup_id_network",
        "ADGROUP_ID_NETWORK",
        FieldKind::TextOr("unknown"),
    ),
    field(
        "adgroup_network",
        "ADGROUP_NETWORK",
        FieldKind::TextOr("unknown"),
    ),
    field("creative_id", "AD_ID", FieldKind::TextOr("unknown")),
    field("creative", "AD_NAME", FieldKind::TextOr("unknown")),
    field("store_id", "STORE_ID", FieldKind::Text),
    field("store_type", "STORE_TYPE", FieldKind::Text),
    field("platform", "PLATFORM", FieldKind::TextOr("mobile_app")),
    // Standard metrics
    field("installs", "INSTALLS", FieldKind::Count),
    field("clicks", "CLICKS", FieldKind::Count),
    field("impressions", "IMPRESSIONS", FieldKind::Count),
    field("sessions", "SESSIONS", FieldKind::Count),
    field("base_sessions", "BASE_SESSIONS", FieldKind::Count),
    field("cost", "COST", FieldKind::Amount),
    field("adjust_cost", "ADJUST_COST", FieldKind::Amount),
    field("network_cost", "NETWORK_COST", FieldKind::Amount),
    field("reattributions", "REATTRIBUTIONS", FieldKind::Count),
    field(
        "reattribution_reinstalls",
        "REATTRIBUTION_REINSTALLS",
        FieldKind::Count,
    ),
    field("reinstalls", "REINSTALLS", FieldKind::Count),
    field("uninstalls", "UNINSTALLS", FieldKind::Count),
    field("deattributions", "DEATTRIBUTIONS", FieldKind::Count),
    field("events", "EVENTS", FieldKind::Count),
    field("paid_clicks", "PAID_CLICKS", FieldKind::Count),
    field("paid_impressions", "PAID_IMPRESSIONS", FieldKind::Count),
    field("paid_installs", "PAID_INSTALLS", FieldKind::Count),
];

/// Transforms one raw report row into the fixed warehouse schema.
pub fn transform_row(raw: &RawReportRow) -> OutputRow {
    let mut output = Map::new();

    for spec in FIELD_TABLE {
        output.insert(spec.target.to_owned(), spec.kind.coerce(raw.get(spec.source)));
    }

    for slug in catalog::CUSTOM_EVENT_SLUGS {
        let events_source = format!("{slug}_events");
        output.insert(
            custom_event_target(slug, "EVENTS"),
            FieldKind::Count.coerce(raw.get(events_source.as_str())),
        );
        if catalog::slug_has_revenue(slug) {
            let revenue_source = format!("{slug}_revenue");
            output.insert(
                custom_event_target(slug, "REVENUE"),
                FieldKind::Amount.coerce(raw.get(revenue_source.as_str())),
            );
        }
    }

    output.insert(
        String::from("CURRENCY_CODE"),
        Value::String(String::from(CURRENCY_CODE)),
    );
    output.insert(
        String::from("DATA_SOURCE_NAME"),
        Value::String(String::from(DATA_SOURCE_NAME)),
    );

    output
}

/// Number of fields every output row carries.
pub fn output_field_count() -> usize {
    // field table + per-slug events + per-slug revenue + two constants
    FIELD_TABLE.len()
        + catalog::CUSTOM_EVENT_SLUGS.len()
        + catalog::CUSTOM_EVENT_SLUGS
            .iter()
            .filter(|slug| catalog::slug_has_revenue(slug))
            .count()
        + 2
}

fn custom_event_target(slug: &str, suffix: &str) -> String {
    format!("{CUSTOM_EVENT_PREFIX}{}_{suffix}", slug.to_ascii_uppercase())
}

fn coerce_i64(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64))
            .unwrap_or(0),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|float| float as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn coerce_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => text.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawReportRow {
        value.as_object().expect("test rows are objects").clone()
    }

    #[test]
    fn empty_row_populates_every_declared_field() {
        let output = transform_row(&RawReportRow::new());

        assert_eq!(output.len(), output_field_count());
        assert_eq!(output["INSTALLS"], json!(0));
        assert_eq!(output["COST"], json!(0.0));
        assert_eq!(output["C_DATASCAPE_BUNDLE_PURCHASE_EVENTS"], json!(0));
        assert_eq!(output["C_DATASCAPE_BUNDLE_PURCHASE_REVENUE"], json!(0.0));
        assert_eq!(output["PLATFORM"], json!("mobile_app"));
        assert_eq!(output["AD_NAME"], json!("unknown"));
        assert_eq!(output["CAMPAIGN_ID_NETWORK"], json!("unknown"));
        assert_eq!(output["DATE"], Value::Null);
        assert_eq!(output["COUNTRY"], Value::Null);
        assert_eq!(output["CURRENCY_CODE"], json!("USD"));
        assert_eq!(output["DATA_SOURCE_NAME"], json!("Adjust API"));
    }

    #[test]
    fn present_but_null_metric_defaults_to_zero() {
        let output = transform_row(&raw(json!({ "installs": null, "cost": null })));

        assert_eq!(output["INSTALLS"], json!(0));
        assert_eq!(output["COST"], json!(0.0));
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let output = transform_row(&raw(json!({
            "installs": "10",
            "clicks": "3.7",
            "cost": "12.5",
        })));

        assert_eq!(output["INSTALLS"], json!(10));
        assert_eq!(output["CLICKS"], json!(3));
        assert_eq!(output["COST"], json!(12.5));
    }

    #[test]
    fn unparseable_metric_defaults_to_zero() {
        let output = transform_row(&raw(json!({ "installs": "n/a", "cost": {} })));

        assert_eq!(output["INSTALLS"], json!(0));
        assert_eq!(output["COST"], json!(0.0));
    }

    #[test]
    fn dimensions_copy_verbatim_under_renamed_keys() {
        let output = transform_row(&raw(json!({
            "day": "2025-01-01",
            "app": "app123",
            "creative": "banner_a",
            "creative_id": "cr-9",
            "platform": "ios",
        })));

        assert_eq!(output["DATE"], json!("2025-01-01"));
        assert_eq!(output["APP"], json!("app123"));
        assert_eq!(output["AD_NAME"], json!("banner_a"));
        assert_eq!(output["AD_ID"], json!("cr-9"));
        assert_eq!(output["PLATFORM"], json!("ios"));
    }

    #[test]
    fn registration_has_events_but_no_revenue_column() {
        let output = transform_row(&RawReportRow::new());

        assert!(output.contains_key("C_DATASCAPE_REGISTRATION_EVENTS"));
        assert!(!output.contains_key("C_DATASCAPE_REGISTRATION_REVENUE"));
    }

    #[test]
    fn custom_event_metrics_map_from_derived_source_keys() {
        let output = transform_row(&raw(json!({
            "coin_purchase_events": 4,
            "coin_purchase_revenue": 19.96,
        })));

        assert_eq!(output["C_DATASCAPE_COIN_PURCHASE_EVENTS"], json!(4));
        assert_eq!(output["C_DATASCAPE_COIN_PURCHASE_REVENUE"], json!(19.96));
    }

    #[test]
    fn unknown_source_fields_are_ignored() {
        let output = transform_row(&raw(json!({ "surprise_field": "value" })));

        assert_eq!(output.len(), output_field_count());
        assert!(!output.contains_key("surprise_field"));
        assert!(!output.contains_key("SURPRISE_FIELD"));
    }
}
