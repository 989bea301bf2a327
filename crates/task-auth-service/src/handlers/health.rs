//! Liveness probe.

/// Returns `OK` while the process is serving requests.
///
/// Checks no dependencies; directory outages surface as 503 on login.
pub async fn health_check() -> &'static str {
    "OK"
}
