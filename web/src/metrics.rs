//! Site metrics.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `base_site_route_outcomes_total{route, reply}` - Handled requests by route and reply kind
//! - `base_site_api_failures_total{route, kind}` - Base API failures by route and failure kind

use metrics::describe_counter;

/// Handled requests by route and reply kind.
pub const ROUTE_OUTCOMES: &str = "base_site_route_outcomes_total";

/// Base API failures by route and failure kind.
pub const API_FAILURES: &str = "base_site_api_failures_total";

/// Register metric descriptions.
///
/// Call once at startup, after the recorder is installed.
pub fn register_site_metrics() {
    describe_counter!(
        ROUTE_OUTCOMES,
        "Total number of handled requests by route and reply (redirect, render)"
    );
    describe_counter!(
        API_FAILURES,
        "Total number of Base API failures by route and kind (unauthorized, invalid_request, unknown)"
    );

    tracing::info!("Site metrics registered");
}

/// Record a handled request.
pub fn record_route_outcome(route: &'static str, reply: &'static str) {
    metrics::counter!(ROUTE_OUTCOMES, "route" => route, "reply" => reply).increment(1);
}

/// Record a failure a handler recovered from.
pub fn record_api_failure(route: &'static str, kind: &'static str) {
    metrics::counter!(API_FAILURES, "route" => route, "kind" => kind).increment(1);
}
