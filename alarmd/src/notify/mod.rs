/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Re-notification pipeline.
//!
//! ```text
//! AlarmService ──┐
//!                ├──► dispatch queue (bounded mpsc, FIFO) ──► NotificationDispatcher ──► Notifier
//! Scheduler ─────┘
//! ```
//!
//! * [`NotificationScheduler`] wakes on a fixed period and enqueues alarms
//!   whose deadline has passed.
//! * [`NotificationDispatcher`] is the single consumer; it re-checks the
//!   alarm's current state, resets its deadline from that state and calls the
//!   [`Notifier`] outside the store lock.
//!
//! Both tasks take a [`CancellationToken`](tokio_util::sync::CancellationToken)
//! and stop when it fires.

pub mod dispatcher;
pub mod scheduler;

pub use dispatcher::NotificationDispatcher;
pub use scheduler::NotificationScheduler;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::alarm::Alarm;
#[cfg(test)]
use crate::alarm::AlarmState;

/// Default dispatch queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

// ── Dispatch queue ────────────────────────────────────────────────────────────

/// Producer half of the dispatch queue.
///
/// Cloned into the service and the scheduler.  [`enqueue`](Self::enqueue)
/// awaits free capacity when the queue is saturated.
#[derive(Debug, Clone)]
pub struct DispatchQueue {
    tx: mpsc::Sender<Alarm>,
}

impl DispatchQueue {
    /// Hands `alarm` to the dispatcher.
    ///
    /// Never call this with the store lock held.  If the dispatcher has
    /// already stopped the alarm is dropped with a warning.
    pub async fn enqueue(&self, alarm: Alarm) {
        let id = alarm.id.clone();
        if self.tx.send(alarm).await.is_err() {
            warn!(alarm_id = %id, "dispatcher stopped, notification dropped");
        }
    }
}

/// Consumer half of the dispatch queue, owned by the dispatcher.
pub type DispatchReceiver = mpsc::Receiver<Alarm>;

/// Creates a bounded dispatch queue.
///
/// # Panics
/// Panics if `capacity` is zero; the config loader rejects that value before
/// it gets here.
pub fn dispatch_queue(capacity: usize) -> (DispatchQueue, DispatchReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (DispatchQueue { tx }, rx)
}

// ── Notifier ──────────────────────────────────────────────────────────────────

/// The notification side effect.
///
/// Called by the dispatcher with the alarm's current record, after the store
/// lock has been released.  Implementations must not block for long; the
/// dispatcher is a single consumer.
pub trait Notifier: Send + Sync {
    fn notify(&self, alarm: &Alarm);
}

/// Emits one structured `tracing` event per notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, alarm: &Alarm) {
        info!(
            alarm_id = %alarm.id,
            name     = %alarm.name,
            state    = %alarm.state,
            "🔔 alarm notification"
        );
    }
}

/// Keeps every notification in memory, in delivery order.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    seen: std::sync::Mutex<Vec<(String, AlarmState)>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(alarm id, state)` pairs notified so far.
    pub fn notifications(&self) -> Vec<(String, AlarmState)> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }

    /// Number of notifications for `id`.
    pub fn count_for(&self, id: &str) -> usize {
        self.notifications().iter().filter(|(a, _)| a == id).count()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, alarm: &Alarm) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((alarm.id.clone(), alarm.state));
        }
    }
}
