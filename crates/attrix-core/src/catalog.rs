//! Static report vocabulary: dimensions, standard metrics, and the derived
//! custom-event metric names.

/// Grouping dimensions requested on every report, in wire order.
pub const DIMENSIONS: &[&str] = &[
    "day",
    "app",
    "os_name",
    "device_type",
    "country",
    "country_code",
    "region",
    "partner_id",
    "partner_name",
    "campaign_id_network",
    "campaign_network",
    "adgroup_id_network",
    "adgroup_network",
    "creative_id",
    "creative",
    "store_id",
    "store_type",
    "platform",
];

/// Standard metrics exposed by the reports service.
pub const STANDARD_METRICS: &[&str] = &[
    "installs",
    "clicks",
    "impressions",
    "sessions",
    "base_sessions",
    "cost",
    "adjust_cost",
    "network_cost",
    "reattributions",
    "reattribution_reinstalls",
    "reinstalls",
    "uninstalls",
    "deattributions",
    "events",
    "paid_clicks",
    "paid_impressions",
    "paid_installs",
];

/// Custom trackable event slugs configured upstream.
pub const CUSTOM_EVENT_SLUGS: &[&str] = &[
    "bundle_purchase",
    "coin_purchase",
    "credit_purchase",
    "playforcashclick",
    "reachlevel_5",
    "reachlevel_10",
    "reachlevel_20",
    "reachlevel_30",
    "reachlevel_40",
    "reachlevel_50",
    "reachlevel_60",
    "reachlevel_70",
    "reachlevel_80",
    "reachlevel_90",
    "reachlevel_100",
    "reachlevel_110",
    "registration",
    "tutorial_completed",
];

// Slugs that track an action with no monetary value attached.
const REVENUE_EXEMPT_SLUGS: &[&str] = &["registration"];

/// Whether a slug carries a `{slug}_revenue` metric in addition to its
/// `{slug}_events` count.
pub fn slug_has_revenue(slug: &str) -> bool {
    !REVENUE_EXEMPT_SLUGS.contains(&slug)
}

/// Derives the event/revenue metric names from the slug list, preserving
/// slug order with each slug's event count ahead of its revenue.
pub fn derive_event_metrics() -> Vec<String> {
    let mut metrics = Vec::with_capacity(CUSTOM_EVENT_SLUGS.len() * 2);
    for slug in CUSTOM_EVENT_SLUGS {
        metrics.push(format!("{slug}_events"));
        if slug_has_revenue(slug) {
            metrics.push(format!("{slug}_revenue"));
        }
    }
    metrics
}

/// Full metric list sent upstream: standard metrics followed by the derived
/// event metrics. Computed once per batch, never per row.
pub fn all_metrics() -> Vec<String> {
    STANDARD_METRICS
        .iter()
        .map(|metric| (*metric).to_owned())
        .chain(derive_event_metrics())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_metrics_pair_events_with_revenue() {
        let metrics = derive_event_metrics();

        // One revenue-exempt slug: 2N - 1 names.
        assert_eq!(metrics.len(), CUSTOM_EVENT_SLUGS.len() * 2 - 1);
        assert!(metrics.contains(&String::from("bundle_purchase_events")));
        assert!(metrics.contains(&String::from("bundle_purchase_revenue")));
    }

    #[test]
    fn registration_has_no_revenue_metric() {
        let metrics = derive_event_metrics();

        assert!(metrics.contains(&String::from("registration_events")));
        assert!(!metrics.contains(&String::from("registration_revenue")));
    }

    #[test]
    fn event_count_precedes_revenue_for_each_slug() {
        let metrics = derive_event_metrics();
        let events = metrics
            .iter()
            .position(|m| m == "coin_purchase_events")
            .expect("events metric present");
        let revenue = metrics
            .iter()
            .position(|m| m == "coin_purchase_revenue")
            .expect("revenue metric present");

        assert_eq!(revenue, events + 1);
    }

    #[test]
    fn all_metrics_starts_with_standard_metrics() {
        let metrics = all_metrics();

        assert_eq!(metrics.len(), STANDARD_METRICS.len() + derive_event_metrics().len());
        assert_eq!(metrics[0], "installs");
        assert_eq!(metrics[STANDARD_METRICS.len()], "bundle_purchase_events");
    }
}
