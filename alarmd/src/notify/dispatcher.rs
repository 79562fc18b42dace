/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Single consumer of the dispatch queue.
//!
//! Queued alarms are snapshots; by the time one is dequeued the alarm may have
//! changed state or been deleted.  Only the record currently in the store
//! decides whether a notification fires.

use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::alarm::Alarm;
use crate::notify::{DispatchReceiver, Notifier};
use crate::store::AlarmStore;

/// Background task draining the dispatch queue in FIFO order.
pub struct NotificationDispatcher {
    store: Arc<AlarmStore>,
    rx: DispatchReceiver,
    notifier: Arc<dyn Notifier>,
    token: CancellationToken,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<AlarmStore>,
        rx: DispatchReceiver,
        notifier: Arc<dyn Notifier>,
        token: CancellationToken,
    ) -> Self {
        Self {
            store,
            rx,
            notifier,
            token,
        }
    }

    /// Runs until the cancellation token fires or every producer is gone.
    pub async fn run(mut self) {
        info!("notification dispatcher started");

        loop {
            tokio::select! {
                _ = self.token.cancelled() => break,
                next = self.rx.recv() => match next {
                    Some(alarm) => {
                        self.process(&alarm, Instant::now()).await;
                    }
                    None => break,
                },
            }
        }

        info!("notification dispatcher stopped");
    }

    /// Handles one dequeued alarm.
    ///
    /// The schedule entry is updated under the store's write lock; the
    /// notifier runs after the lock is released.  Returns `true` if a
    /// notification was emitted.
    pub async fn process(&self, queued: &Alarm, now: Instant) -> bool {
        match self.store.rearm(&queued.id, now).await {
            Some(current) => {
                self.notifier.notify(&current);
                true
            }
            None => {
                debug!(
                    alarm_id = %queued.id,
                    queued_state = %queued.state,
                    "discarded: alarm gone or state not re-notified"
                );
                false
            }
        }
    }
}
