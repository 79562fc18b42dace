/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Alarm service façade.
//!
//! [`AlarmService`] is the only entry point the transport layer uses.  Each
//! operation runs its store step under the store lock, then (for mutations)
//! hands the affected alarm to the dispatch queue once the lock is released.
//!
//! # Example
//! ```rust,ignore
//! let runtime = AlarmRuntime::start(&settings, Arc::new(LogNotifier));
//! let service = runtime.service();
//! let alarm = service.create(NewAlarm::new("Server Overload", "Triggered")).await?;
//! service.update_state(&alarm.id, "Acknowledged").await?;
//! ```

use std::sync::Arc;

use tracing::{info, warn};

use crate::alarm::{Alarm, AlarmState, NewAlarm};
use crate::notify::DispatchQueue;
use crate::store::{self, AlarmError, AlarmStore, BulkOutcome};

/// Cheap-to-clone handle over the shared store and the dispatch queue.
#[derive(Debug, Clone)]
pub struct AlarmService {
    store: Arc<AlarmStore>,
    queue: DispatchQueue,
}

impl AlarmService {
    pub fn new(store: Arc<AlarmStore>, queue: DispatchQueue) -> Self {
        Self { store, queue }
    }

    /// Checks `entry` against the static invariants without touching the store.
    pub fn validate(&self, entry: &NewAlarm) -> Result<AlarmState, AlarmError> {
        store::validate(entry)
    }

    /// Creates a new alarm.  The requested state must be valid but is always
    /// replaced by `Triggered`.
    pub async fn create(&self, entry: NewAlarm) -> Result<Alarm, AlarmError> {
        let alarm = self.store.create(&entry).await?;
        info!(alarm_id = %alarm.id, name = %alarm.name, "alarm created");

        self.queue.enqueue(alarm.clone()).await;
        Ok(alarm)
    }

    /// Creates every valid entry; invalid ones are skipped and reported in the
    /// outcome's [`error`](BulkOutcome::error).
    pub async fn bulk_create(&self, entries: Vec<NewAlarm>) -> BulkOutcome {
        let outcome = self.store.bulk_create(&entries).await;

        info!(
            requested = entries.len(),
            created   = outcome.created.len(),
            failed    = outcome.failures.len(),
            "bulk create"
        );
        for failure in &outcome.failures {
            warn!(name = %failure.name, cause = %failure.cause, "bulk entry rejected");
        }

        for alarm in &outcome.created {
            self.queue.enqueue(alarm.clone()).await;
        }
        outcome
    }

    pub async fn get_all(&self) -> Vec<Alarm> {
        self.store.get_all().await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Alarm, AlarmError> {
        self.store.get(id).await
    }

    /// Moves alarm `id` to the state named by `state`.
    ///
    /// The literal is validated before the lookup, so an invalid state on an
    /// unknown id reports `Validation`, not `NotFound`.
    pub async fn update_state(&self, id: &str, state: &str) -> Result<Alarm, AlarmError> {
        let state: AlarmState = state.parse()?;
        let alarm = self.store.update_state(id, state).await?;
        info!(alarm_id = %alarm.id, state = %alarm.state, "alarm state updated");

        self.queue.enqueue(alarm.clone()).await;
        Ok(alarm)
    }

    /// Deletes alarm `id` together with its schedule entry and returns a
    /// confirmation message.
    pub async fn delete(&self, id: &str) -> Result<String, AlarmError> {
        let alarm = self.store.delete(id).await?;
        info!(alarm_id = %alarm.id, "alarm deleted");
        Ok(format!("Alarm ID: {} successfully deleted", alarm.id))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::dispatch_queue;
    use std::collections::HashSet;

    /// Service with its queue drained by a throwaway task so enqueue never
    /// blocks.
    fn service() -> AlarmService {
        let (queue, mut rx) = dispatch_queue(16);
        tokio::spawn(async move { while rx.recv().await.is_some() {} });
        AlarmService::new(Arc::new(AlarmStore::default()), queue)
    }

    // ── create ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn create_with_any_valid_state_yields_triggered() {
        let svc = service();
        for state in AlarmState::ALL {
            let a = svc.create(NewAlarm::new("Test Alarm", state.as_str())).await.unwrap();
            assert_eq!(a.state, AlarmState::Triggered);
            assert_eq!(a.name, "Test Alarm");
            assert!(!a.id.is_empty());
        }
    }

    #[tokio::test]
    async fn create_validation_failures() {
        let svc = service();

        let err = svc.create(NewAlarm::new("", "Triggered")).await.unwrap_err();
        assert_eq!(err.to_string(), "alarm name is mandatory");

        let err = svc.create(NewAlarm::new("X", "Bogus")).await.unwrap_err();
        assert!(matches!(err, AlarmError::Validation(_)));
        assert!(svc.get_all().await.is_empty());
    }

    #[tokio::test]
    async fn validate_checks_entry_without_storing_it() {
        let svc = service();

        assert_eq!(
            svc.validate(&NewAlarm::new("Disk", "ACKed")).unwrap(),
            AlarmState::Acknowledged
        );
        assert_eq!(
            svc.validate(&NewAlarm::new("", "Triggered")).unwrap_err(),
            AlarmError::Validation("alarm name is mandatory".into())
        );
        assert!(matches!(
            svc.validate(&NewAlarm::new("Disk", "Bogus")),
            Err(AlarmError::Validation(_))
        ));
        assert!(svc.get_all().await.is_empty());
    }

    #[tokio::test]
    async fn created_alarm_round_trips_through_get_by_id() {
        let svc = service();
        let a = svc.create(NewAlarm::new("Memory Alert", "Triggered")).await.unwrap();
        assert_eq!(svc.get_by_id(&a.id).await.unwrap(), a);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found_for_get_and_delete() {
        let svc = service();
        let id = uuid::Uuid::new_v4().to_string();
        assert!(matches!(svc.get_by_id(&id).await, Err(AlarmError::NotFound { .. })));
        assert!(matches!(svc.delete(&id).await, Err(AlarmError::NotFound { .. })));
    }

    // ── get_all ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn get_all_returns_every_alarm() {
        let svc = service();
        svc.create(NewAlarm::new("Alarm 1", "Triggered")).await.unwrap();
        svc.create(NewAlarm::new("Alarm 2", "ACKed")).await.unwrap();
        assert_eq!(svc.get_all().await.len(), 2);
    }

    // ── update_state ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn acknowledge_sets_acked_at_and_advances_updated_at() {
        let svc = service();
        let a = svc.create(NewAlarm::new("Update Test", "Triggered")).await.unwrap();

        let acked = svc.update_state(&a.id, "Acknowledged").await.unwrap();
        assert_eq!(acked.state, AlarmState::Acknowledged);
        assert!(acked.acked_at.is_some());
        assert!(acked.updated_at > a.updated_at);
        assert!(acked.updated_at >= acked.created_at);
        assert_eq!(acked.created_at, a.created_at);
    }

    #[tokio::test]
    async fn update_with_invalid_state_is_validation_even_for_unknown_id() {
        let svc = service();
        let a = svc.create(NewAlarm::new("Update Test", "Triggered")).await.unwrap();

        let err = svc.update_state(&a.id, "InvalidState").await.unwrap_err();
        assert!(matches!(err, AlarmError::Validation(_)));
        assert_eq!(svc.get_by_id(&a.id).await.unwrap().state, AlarmState::Triggered);

        let err = svc.update_state("missing", "InvalidState").await.unwrap_err();
        assert!(matches!(err, AlarmError::Validation(_)));

        let err = svc.update_state("missing", "Cleared").await.unwrap_err();
        assert!(matches!(err, AlarmError::NotFound { .. }));
    }

    // ── delete ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn delete_returns_confirmation() {
        let svc = service();
        let a = svc.create(NewAlarm::new("To Be Deleted", "Active")).await.unwrap();

        let msg = svc.delete(&a.id).await.unwrap();
        assert_eq!(msg, format!("Alarm ID: {} successfully deleted", a.id));
        assert!(svc.get_all().await.is_empty());
    }

    // ── bulk_create ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn bulk_partial_success_returns_valid_subset_and_aggregate_error() {
        let svc = service();
        let outcome = svc
            .bulk_create(vec![
                NewAlarm::new("A", "Triggered"),
                NewAlarm::new("", "Triggered"),
            ])
            .await;

        assert_eq!(outcome.created.len(), 1);
        assert_eq!(outcome.created[0].name, "A");
        let err = outcome.error().expect("aggregate error");
        assert!(err.to_string().contains("alarm name is mandatory"));
    }

    #[tokio::test]
    async fn bulk_success_and_empty_list() {
        let svc = service();
        let outcome = svc
            .bulk_create(vec![
                NewAlarm::new("Alarm 1", "Triggered"),
                NewAlarm::new("Alarm 2", "Active"),
            ])
            .await;
        assert_eq!(outcome.created.len(), 2);
        assert!(outcome.error().is_none());

        let outcome = svc.bulk_create(Vec::new()).await;
        assert!(outcome.created.is_empty());
        assert!(outcome.error().is_none());
    }

    #[tokio::test]
    async fn sample_fixture_loads_completely() {
        let raw = include_str!("../testdata/sample_alarms.json");
        let entries: Vec<NewAlarm> = serde_json::from_str(raw).unwrap();

        let svc = service();
        let outcome = svc.bulk_create(entries.clone()).await;
        assert!(outcome.error().is_none(), "{:?}", outcome.error());
        assert_eq!(outcome.created.len(), entries.len());
    }

    // ── concurrency ───────────────────────────────────────────────────────────

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_yield_unique_ids() {
        const N: usize = 64;
        let svc = service();

        let mut handles = Vec::with_capacity(N);
        for i in 0..N {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.create(NewAlarm::new(format!("alarm-{i}"), "Triggered"))
                    .await
                    .unwrap()
                    .id
            }));
        }

        let mut ids = HashSet::new();
        for h in handles {
            ids.insert(h.await.unwrap());
        }
        assert_eq!(ids.len(), N);
        assert_eq!(svc.get_all().await.len(), N);
    }
}
