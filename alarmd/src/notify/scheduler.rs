/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Periodic scan for alarms whose re-notification deadline has passed.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::alarm::Alarm;
use crate::notify::DispatchQueue;
use crate::store::AlarmStore;

/// Default wake-up period of the scheduler.
pub const DEFAULT_SCAN_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Background task that re-arms and enqueues due alarms.
pub struct NotificationScheduler {
    store: Arc<AlarmStore>,
    queue: DispatchQueue,
    period: Duration,
    token: CancellationToken,
}

impl NotificationScheduler {
    pub fn new(
        store: Arc<AlarmStore>,
        queue: DispatchQueue,
        period: Duration,
        token: CancellationToken,
    ) -> Self {
        Self {
            store,
            queue,
            period,
            token,
        }
    }

    /// Runs until the cancellation token fires.  The first scan happens one
    /// full period after start.
    pub async fn run(self) {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(period_secs = self.period.as_secs(), "notification scheduler started");

        loop {
            tokio::select! {
                _ = self.token.cancelled() => break,
                _ = ticker.tick() => {
                    self.scan(Instant::now()).await;
                }
            }
        }

        info!("notification scheduler stopped");
    }

    /// One scan: re-arm every alarm whose deadline lies before `now` under the
    /// store's write lock, then enqueue them once the lock is released.
    ///
    /// Returns the enqueued alarms.
    pub async fn scan(&self, now: Instant) -> Vec<Alarm> {
        let due = self.store.collect_due(now).await;

        for alarm in &due {
            debug!(alarm_id = %alarm.id, state = %alarm.state, "alarm due for re-notification");
            self.queue.enqueue(alarm.clone()).await;
        }

        if !due.is_empty() {
            info!(due = due.len(), "scheduler scan enqueued alarms");
        }
        due
    }
}
