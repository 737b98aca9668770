//! Prometheus metrics endpoint.

use crate::server::MailboxRelay;
use axum::{http::header::CONTENT_TYPE, response::IntoResponse, Extension};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Prometheus metrics handler.
///
/// Returns metrics in Prometheus text format.
/// Includes both gauges (current state) and counters (monotonic since startup).
pub async fn metrics_handler(Extension(relay): Extension<Arc<MailboxRelay>>) -> impl IntoResponse {
    let m = relay.metrics();

    // Gauges — current state
    let mailboxes = relay.total_mailboxes();

    // Counters — monotonic since startup
    let deposits = m.deposits_total.load(Ordering::Relaxed);
    let receives = m.receives_total.load(Ordering::Relaxed);
    let delivered = m.delivered_total.load(Ordering::Relaxed);
    let timeouts = m.timeouts_total.load(Ordering::Relaxed);
    let rejected = m.rejected_total.load(Ordering::Relaxed);
    let bytes_rx = m.bytes_received.load(Ordering::Relaxed);
    let evictions = m.evictions_total.load(Ordering::Relaxed);

    let body = format!(
        r#"# HELP pair_relay_mailboxes_active Number of live mailboxes
# TYPE pair_relay_mailboxes_active gauge
pair_relay_mailboxes_active {mailboxes}

# HELP pair_relay_info Server information
# TYPE pair_relay_info gauge
pair_relay_info{{version="{version}"}} 1

# HELP pair_relay_deposits_total Total deposits accepted
# TYPE pair_relay_deposits_total counter
pair_relay_deposits_total {deposits}

# HELP pair_relay_receives_total Total receive long-polls started
# TYPE pair_relay_receives_total counter
pair_relay_receives_total {receives}

# HELP pair_relay_delivered_total Total receives that returned a value
# TYPE pair_relay_delivered_total counter
pair_relay_delivered_total {delivered}

# HELP pair_relay_timeouts_total Total receives that timed out empty-handed
# TYPE pair_relay_timeouts_total counter
pair_relay_timeouts_total {timeouts}

# HELP pair_relay_rejected_total Total requests rejected at the transport boundary
# TYPE pair_relay_rejected_total counter
pair_relay_rejected_total {rejected}

# HELP pair_relay_bytes_received_total Total payload bytes accepted via deposits
# TYPE pair_relay_bytes_received_total counter
pair_relay_bytes_received_total {bytes_rx}

# HELP pair_relay_evictions_total Total mailboxes removed by the idle sweep
# TYPE pair_relay_evictions_total counter
pair_relay_evictions_total {evictions}
"#,
        version = env!("CARGO_PKG_VERSION"),
    );

    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
