//! Metric definitions for the auth service.
//!
//! Prometheus naming: `auth_` prefix, `_total` counters, `_seconds` histograms.
//!
//! # Cardinality
//!
//! Every label is bounded by code:
//! - `status`: success, error (plus `already_revoked` for revocations)
//! - `error_category`: see [`super::ErrorCategory`]
//! - `decision`: public, anonymous, reentrant, authenticated, rejected

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder and return its render handle.
///
/// Fails if a recorder is already installed in this process.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record token pair issuance duration and outcome
///
/// Metric: `auth_token_issuance_duration_seconds`, `auth_token_issuance_total`
/// Labels: `status`
pub fn record_token_issuance(status: &str, duration: Duration) {
    histogram!("auth_token_issuance_duration_seconds", "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("auth_token_issuance_total", "status" => status.to_string()).increment(1);
}

/// Record token validation result
///
/// Metric: `auth_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("auth_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

/// Record a revocation attempt
///
/// Metric: `auth_revocations_total`
/// Labels: `status` (revoked, already_revoked, already_expired)
pub fn record_revocation(status: &str) {
    counter!("auth_revocations_total", "status" => status.to_string()).increment(1);
}

/// Update the number of live revocation entries
///
/// Metric: `auth_revocation_entries`
pub fn set_revocation_entries(count: u64) {
    gauge!("auth_revocation_entries").set(count as f64);
}

/// Record a login attempt
///
/// Metric: `auth_logins_total`
/// Labels: `status` (success, invalid_credentials, error)
pub fn record_login(status: &str) {
    counter!("auth_logins_total", "status" => status.to_string()).increment(1);
}

/// Record the outcome of the request authentication filter
///
/// Metric: `auth_filter_decisions_total`
/// Labels: `decision`
pub fn record_filter_decision(decision: &str) {
    counter!("auth_filter_decisions_total", "decision" => decision.to_string()).increment(1);
}
