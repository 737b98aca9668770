//! Relay server coordination.
//!
//! [`MailboxRelay`] owns the configuration, the mailbox store, and the
//! operational metrics, and is shared as `Arc` between the HTTP handlers and
//! the idle sweep task.

use crate::config::Config;
use crate::store::MailboxStore;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Operational metrics for monitoring relay activity.
///
/// All counters are monotonically increasing (reset only on restart).
/// Thread-safe via `AtomicU64` — no locks needed for incrementing.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Total deposits accepted.
    pub deposits_total: AtomicU64,
    /// Total receive long-polls started.
    pub receives_total: AtomicU64,
    /// Total receives that returned a value.
    pub delivered_total: AtomicU64,
    /// Total receives that timed out empty-handed.
    pub timeouts_total: AtomicU64,
    /// Total requests rejected at the transport boundary
    /// (missing receiver, oversized payload).
    pub rejected_total: AtomicU64,
    /// Total payload bytes accepted via deposits.
    pub bytes_received: AtomicU64,
    /// Total mailboxes removed by the idle sweep.
    pub evictions_total: AtomicU64,
}

/// Main relay server state.
#[derive(Debug, Default)]
pub struct MailboxRelay {
    config: Config,
    store: MailboxStore,
    metrics: RelayMetrics,
}

impl MailboxRelay {
    /// Create a new relay with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: MailboxStore::new(),
            metrics: RelayMetrics::default(),
        }
    }

    /// Get the relay configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get access to the mailbox store.
    pub fn store(&self) -> &MailboxStore {
        &self.store
    }

    /// Get access to the operational metrics.
    pub fn metrics(&self) -> &RelayMetrics {
        &self.metrics
    }

    /// Deposit `value` for `key`. Never blocks and never fails in a way the
    /// transport must surface.
    pub fn deposit(&self, key: &str, value: String) {
        self.metrics.deposits_total.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .bytes_received
            .fetch_add(value.len() as u64, Ordering::Relaxed);
        self.store.deposit(key, value);
    }

    /// Long-poll for a value deposited for `key`, bounded by the configured
    /// await timeout. `None` is absence, not an error.
    pub async fn receive(&self, key: &str) -> Option<String> {
        self.metrics.receives_total.fetch_add(1, Ordering::Relaxed);

        let got = self
            .store
            .receive(key, self.config.mailbox.await_timeout())
            .await;

        match &got {
            Some(_) => &self.metrics.delivered_total,
            None => &self.metrics.timeouts_total,
        }
        .fetch_add(1, Ordering::Relaxed);

        got
    }

    /// Number of live mailboxes.
    pub fn total_mailboxes(&self) -> usize {
        self.store.len()
    }
}

/// Load configuration, start the sweep, and serve HTTP until shutdown.
///
/// This is the whole process lifecycle behind the binary: everything after
/// logging setup lives here so the error path stays typed.
pub async fn run(config_path: &Path) -> crate::error::Result<()> {
    let config = Config::load(config_path)?;

    crate::http::health::init_start_time();

    let relay = Arc::new(MailboxRelay::new(config));
    crate::sweep::spawn_sweep_task(relay.clone());

    let bind_address = relay.config().server.bind_address.clone();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!(
        "pair-relay v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        bind_address
    );

    let app = crate::http::build_router(relay);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
