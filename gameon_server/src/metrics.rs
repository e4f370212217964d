//! Prometheus metrics for monitoring the GameOn server.
//!
//! Handlers record counters directly with the `metrics` macros; this
//! module only installs the exporter. Metrics are served in Prometheus
//! text format at `http://<addr>/metrics`.
//!
//! Recorded series include:
//!
//! - `auth_registrations_total`, `auth_logins_total`
//! - `games_created_total`, `games_joined_total`, `games_settled_total`
//! - `payment_reservations_total`, `payments_confirmed_total`
//! - `webhooks_processed_total`, `webhook_signature_failures_total`

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))
}
