//! Per-key mailbox slot.
//!
//! A mailbox holds at most one pending value or one pending waiter, never
//! both as a steady state: a waiter matched by a deposit is woken and cleared
//! inside the same critical section. All field access goes through the
//! mailbox's own mutex, and critical sections never await.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::oneshot;

/// What a mailbox currently holds.
#[derive(Debug, Default)]
enum Slot {
    /// Nothing pending.
    #[default]
    Empty,
    /// A value deposited but not yet claimed.
    Value(String),
    /// A blocked receiver's one-shot wake-up handle.
    Waiter(oneshot::Sender<String>),
}

/// Outcome of a receiver's claim on a mailbox.
#[derive(Debug)]
pub enum Claim {
    /// A value was already pending; consumed without blocking.
    Ready(String),
    /// No value yet; the receiver's waiter is installed and this end
    /// completes when a deposit wakes it.
    Pending(oneshot::Receiver<String>),
}

/// A per-key slot holding either one pending value or one pending waiter.
///
/// Mailboxes are created lazily on first use and shared as `Arc` so that a
/// caller which captured one before an eviction keeps operating on the same
/// object.
#[derive(Debug)]
pub struct Mailbox {
    slot: Mutex<Slot>,
    /// Unix milliseconds of the most recent deposit or receive on this key.
    /// Read by the idle sweep.
    touched: AtomicI64,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self {
            slot: Mutex::new(Slot::Empty),
            touched: AtomicI64::new(unix_now()),
        }
    }
}

impl Mailbox {
    /// Record activity on this mailbox.
    pub fn touch(&self) {
        self.touched.store(unix_now(), Ordering::Relaxed);
    }

    /// Whether this mailbox has seen no activity for longer than `threshold`.
    pub fn idle_longer_than(&self, threshold: Duration) -> bool {
        let touched = self.touched.load(Ordering::Relaxed);
        unix_now().saturating_sub(touched) > threshold.as_millis() as i64
    }

    /// Deposit a value. Never blocks.
    ///
    /// If a waiter is installed it is woken with the value and cleared
    /// (one-shot). Waking is best-effort: a receiver that already gave up is
    /// logged and ignored, and the waiter is treated as gone either way. With
    /// no waiter, the value is parked for the next receive, overwriting any
    /// earlier undelivered value (last-write-wins).
    pub fn deposit(&self, value: String) {
        self.touch();
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match std::mem::take(&mut *slot) {
            Slot::Waiter(tx) => {
                // Slot stays Empty whether or not the send lands.
                if tx.send(value).is_err() {
                    tracing::debug!("Waiter vanished before delivery, value dropped");
                }
            }
            _ => *slot = Slot::Value(value),
        }
    }

    /// Consume a pending value, or install this receiver as the waiter.
    ///
    /// At most one waiter is held per mailbox: a later receive for the same
    /// key replaces an earlier one, whose call then only resolves via its own
    /// timeout. That single-slot behavior is kept deliberately for
    /// compatibility with existing clients.
    pub fn claim_or_subscribe(&self) -> Claim {
        self.touch();
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match std::mem::take(&mut *slot) {
            Slot::Value(value) => Claim::Ready(value),
            previous => {
                let (tx, rx) = oneshot::channel();
                *slot = Slot::Waiter(tx);
                if matches!(previous, Slot::Waiter(_)) {
                    tracing::warn!(
                        "Replacing an installed waiter; the earlier receive will time out"
                    );
                }
                Claim::Pending(rx)
            }
        }
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
