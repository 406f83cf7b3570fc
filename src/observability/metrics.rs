//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_forward_requests_total` (counter): forwards by method, outcome
//! - `gateway_forward_duration_seconds` (histogram): end-to-end latency by outcome
//!
//! Outcome is `forwarded` or the rejection label (`invalid_key`,
//! `invalid_method`, `invalid_url`, `invalid_request`, `upstream_error`).
//! Recording without an installed exporter is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const FORWARD_REQUESTS_TOTAL: &str = "gateway_forward_requests_total";
pub const FORWARD_DURATION_SECONDS: &str = "gateway_forward_duration_seconds";

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one finished forward request.
pub fn record_forward(method: &'static str, outcome: &'static str, start: Instant) {
    ::metrics::counter!(FORWARD_REQUESTS_TOTAL, "method" => method, "outcome" => outcome).increment(1);
    ::metrics::histogram!(FORWARD_DURATION_SECONDS, "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_exporter_is_noop() {
        record_forward("GET", "forwarded", Instant::now());
        record_forward("other", "invalid_method", Instant::now());
    }
}
