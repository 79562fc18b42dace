/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Process-level wiring of the registry.
//!
//! [`AlarmRuntime::start`] builds one store, one dispatch queue, the service
//! façade and the two background tasks, all sharing one
//! [`CancellationToken`].  [`AlarmRuntime::shutdown`] cancels the token and
//! waits for both tasks, so tests and the binary stop deterministically.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::NotificationSettings;
use crate::notify::{dispatch_queue, NotificationDispatcher, NotificationScheduler, Notifier};
use crate::service::AlarmService;
use crate::store::AlarmStore;

/// A running registry: service handle plus its background tasks.
pub struct AlarmRuntime {
    store: Arc<AlarmStore>,
    service: AlarmService,
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl AlarmRuntime {
    /// Builds the registry and spawns the scheduler and dispatcher on the
    /// current tokio runtime.
    pub fn start(settings: &NotificationSettings, notifier: Arc<dyn Notifier>) -> Self {
        let store = Arc::new(AlarmStore::new(settings.intervals));
        let (queue, rx) = dispatch_queue(settings.queue_capacity);
        let token = CancellationToken::new();

        let scheduler = NotificationScheduler::new(
            store.clone(),
            queue.clone(),
            settings.scan_period,
            token.child_token(),
        );
        let dispatcher =
            NotificationDispatcher::new(store.clone(), rx, notifier, token.child_token());

        let tasks = vec![tokio::spawn(scheduler.run()), tokio::spawn(dispatcher.run())];

        let intervals = store.intervals();
        info!(
            scan_period_secs   = settings.scan_period.as_secs(),
            queue_capacity     = settings.queue_capacity,
            triggered_secs     = intervals.triggered.as_secs(),
            acknowledged_secs  = intervals.acknowledged.as_secs(),
            "alarm registry started"
        );

        Self {
            service: AlarmService::new(store.clone(), queue),
            store,
            token,
            tasks,
        }
    }

    /// Cloneable handle for callers.
    pub fn service(&self) -> AlarmService {
        self.service.clone()
    }

    pub fn store(&self) -> Arc<AlarmStore> {
        self.store.clone()
    }

    /// Token whose cancellation stops the background tasks.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Stops the scheduler and the dispatcher and waits for them to finish.
    pub async fn shutdown(self) {
        self.token.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!("notification task ended abnormally: {e}");
            }
        }
        info!("alarm registry stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::{AlarmState, NewAlarm, NotifyIntervals};
    use crate::notify::RecordingNotifier;
    use std::time::Duration;

    fn settings() -> NotificationSettings {
        NotificationSettings {
            scan_period: Duration::from_secs(10),
            queue_capacity: 8,
            intervals: NotifyIntervals {
                triggered: Duration::from_secs(30),
                acknowledged: Duration::from_secs(120),
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn create_is_notified_immediately_then_renotified_on_cadence() {
        let notifier = Arc::new(RecordingNotifier::new());
        let rt = AlarmRuntime::start(&settings(), notifier.clone());
        let svc = rt.service();

        let a = svc.create(NewAlarm::new("Server Overload", "Triggered")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(notifier.count_for(&a.id), 1, "creation notifies at once");

        // Dispatch re-armed the deadline to ~t+30; the scan at t+40 picks it up.
        tokio::time::sleep(Duration::from_secs(41)).await;
        assert_eq!(notifier.count_for(&a.id), 2);

        rt.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cleared_alarm_is_never_renotified() {
        let notifier = Arc::new(RecordingNotifier::new());
        let rt = AlarmRuntime::start(&settings(), notifier.clone());
        let svc = rt.service();

        let a = svc.create(NewAlarm::new("Fan", "Triggered")).await.unwrap();
        svc.update_state(&a.id, "Cleared").await.unwrap();
        tokio::time::sleep(Duration::from_secs(300)).await;

        // The creation dispatch may observe Cleared already; never more than once.
        assert!(notifier.count_for(&a.id) <= 1);
        assert!(notifier
            .notifications()
            .iter()
            .all(|(_, s)| *s != AlarmState::Cleared));
        assert!(rt.store().next_notify_at(&a.id).await.is_none());

        rt.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_joins_background_tasks() {
        let rt = AlarmRuntime::start(&settings(), Arc::new(RecordingNotifier::new()));
        let token = rt.cancellation_token();
        rt.shutdown().await;
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn store_uses_configured_intervals() {
        let rt = AlarmRuntime::start(&settings(), Arc::new(RecordingNotifier::new()));
        assert_eq!(*rt.store().intervals(), settings().intervals);
        rt.shutdown().await;
    }

    #[tokio::test]
    async fn service_keeps_working_after_shutdown() {
        let rt = AlarmRuntime::start(&settings(), Arc::new(RecordingNotifier::new()));
        let svc = rt.service();
        rt.shutdown().await;

        // Dispatcher is gone; enqueue must not hang.
        let a = svc.create(NewAlarm::new("Late", "Triggered")).await.unwrap();
        assert_eq!(svc.get_by_id(&a.id).await.unwrap().name, "Late");
    }
}
