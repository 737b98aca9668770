//! Concurrent mailbox store and the rendezvous protocol.
//!
//! The store maps receiver keys to mailboxes, creating them lazily on first
//! use by either side. `deposit` and `receive` are safe to call concurrently
//! for the same key and for different keys; per-key serialization happens via
//! each mailbox's own lock, and no store-level lock is held across a blocking
//! wait.

use crate::mailbox::{Claim, Mailbox};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// Concurrent mapping from receiver key to [`Mailbox`].
///
/// Keys are caller-chosen identifiers, opaque to the store. Entries persist
/// until [`MailboxStore::evict_idle`] removes them; mailboxes captured by
/// in-flight callers stay valid for those callers but become invisible to new
/// lookups.
#[derive(Debug, Default)]
pub struct MailboxStore {
    mailboxes: DashMap<String, Arc<Mailbox>>,
}

impl MailboxStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically return the existing mailbox for `key`, or insert and
    /// return a fresh empty one.
    ///
    /// Concurrent first-callers for the same new key observe the same
    /// mailbox instance.
    pub fn get_or_create(&self, key: &str) -> Arc<Mailbox> {
        self.mailboxes.entry(key.to_owned()).or_default().clone()
    }

    /// Deposit `value` for `key`. Never blocks.
    ///
    /// A blocked receiver for the key is woken immediately; otherwise the
    /// value is parked for the next receive, replacing any earlier
    /// undelivered value.
    pub fn deposit(&self, key: &str, value: String) {
        let mailbox = self.get_or_create(key);
        mailbox.deposit(value);
        tracing::debug!("Deposited message for key {:?}", key);
    }

    /// Wait up to `timeout` for a value deposited for `key`.
    ///
    /// Returns immediately when a value is already pending. `None` means the
    /// window elapsed with nothing delivered — absence, not an error. A call
    /// whose waiter was replaced by a later receive for the same key also
    /// resolves only at its own deadline, matching the single-slot contract.
    pub async fn receive(&self, key: &str, timeout: Duration) -> Option<String> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mailbox = self.get_or_create(key);

        let rx = match mailbox.claim_or_subscribe() {
            Claim::Ready(value) => {
                tracing::debug!("Immediate delivery for key {:?}", key);
                return Some(value);
            }
            Claim::Pending(rx) => rx,
        };

        match tokio::time::timeout_at(deadline, rx).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(_)) => {
                // Our waiter was replaced by a later receive for this key.
                // An orphaned call must not return early; it waits out the
                // remainder of its window.
                tracing::debug!("Waiter for key {:?} was replaced, waiting out window", key);
                tokio::time::sleep_until(deadline).await;
                None
            }
            Err(_) => {
                tracing::debug!("Receive for key {:?} timed out", key);
                None
            }
        }
    }

    /// Remove every mailbox that has been idle longer than `threshold`.
    ///
    /// Returns the number of evicted entries. Eviction never takes any
    /// mailbox's field lock; callers holding an `Arc` to an evicted mailbox
    /// keep using it untouched, so a receiver blocked on an evicted key is
    /// not woken here and resolves via delivery or its own timeout.
    pub fn evict_idle(&self, threshold: Duration) -> usize {
        let before = self.mailboxes.len();
        self.mailboxes
            .retain(|_, mailbox| !mailbox.idle_longer_than(threshold));
        before.saturating_sub(self.mailboxes.len())
    }

    /// Number of live mailboxes.
    pub fn len(&self) -> usize {
        self.mailboxes.len()
    }

    /// Whether the store holds no mailboxes.
    pub fn is_empty(&self) -> bool {
        self.mailboxes.is_empty()
    }
}
