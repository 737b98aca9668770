//! Background idle sweep for quiet mailboxes.
//!
//! Runs periodically and evicts mailboxes whose last activity is older than
//! the configured threshold. This is a memory-bound safeguard for a long-idle
//! process, not a per-delivery mechanism: the receive timeout is what bounds
//! a stuck waiter.

use crate::server::MailboxRelay;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Spawn the background sweep task.
///
/// Returns a handle that can be used to abort the task.
pub fn spawn_sweep_task(relay: Arc<MailboxRelay>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let config = relay.config().sweep.clone();

        if !config.enabled {
            tracing::info!("Idle sweep disabled");
            return;
        }

        tracing::info!(
            "Idle sweep started (interval: {}s, threshold: {}s)",
            config.interval_secs,
            config.idle_secs
        );

        let mut timer = interval(Duration::from_secs(config.interval_secs));
        // The first tick fires immediately; harmless, nothing is idle yet.
        let threshold = config.idle_threshold();

        loop {
            timer.tick().await;

            let evicted = relay.store().evict_idle(threshold);
            if evicted > 0 {
                relay
                    .metrics()
                    .evictions_total
                    .fetch_add(evicted as u64, Ordering::Relaxed);
                tracing::info!("Sweep: evicted {} idle mailboxes", evicted);
            } else {
                tracing::debug!("Sweep: no idle mailboxes");
            }
        }
    })
}
