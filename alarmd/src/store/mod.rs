//! Alarm store: the single source of truth for alarm records and their
//! notification schedule.
//!
//! [`AlarmStore`] owns two maps behind **one** [`tokio::sync::RwLock`]:
//!
//! ```text
//! StoreInner
//! ├── alarms:   id → Alarm      (the records)
//! └── schedule: id → Instant    (next eligible re-notification)
//! ```
//!
//! They are never locked independently, so no reader can observe a record
//! without its schedule entry or an entry for a deleted record.
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | Ownership | Explicit component shared via `Arc`, one per process (or per test) |
//! | Lock | `tokio::sync::RwLock`; reads share, every mutation is exclusive |
//! | Schedule clock | `tokio::time::Instant` (monotonic, pausable in tests) |
//! | Record clock | `chrono::Utc` wall clock for `created_at` / `updated_at` / `acked_at` |
//! | Bulk create | One write-lock acquisition for the whole batch; bad entries are skipped |
//!
//! The store never talks to the dispatch queue itself.  Every method returns
//! the records the caller has to signal, and the caller enqueues them after
//! the lock is released.

pub mod error;

pub use error::{AlarmError, BatchFailure};

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::alarm::{Alarm, AlarmState, NewAlarm, NotifyIntervals};

// ── Validation ────────────────────────────────────────────────────────────────

/// Checks a creation request against the static invariants and returns the
/// parsed state.
///
/// Checks (in order):
/// 1. `name` is non-empty.
/// 2. `state` is a member of the closed enumeration.
pub fn validate(entry: &NewAlarm) -> Result<AlarmState, AlarmError> {
    if entry.name.is_empty() {
        return Err(AlarmError::empty_name());
    }
    entry.state.parse()
}

// ── Bulk outcome ──────────────────────────────────────────────────────────────

/// Result of a bulk creation.
///
/// Partial success is not total failure: `created` holds every alarm that was
/// inserted, in input order, whatever happened to its siblings.
#[derive(Debug, Clone, Default)]
pub struct BulkOutcome {
    pub created: Vec<Alarm>,
    pub failures: Vec<BatchFailure>,
}

impl BulkOutcome {
    /// Aggregate error describing every skipped entry, or `None` if the whole
    /// batch went in.
    pub fn error(&self) -> Option<AlarmError> {
        if self.failures.is_empty() {
            None
        } else {
            Some(AlarmError::PartialBatch {
                failures: self.failures.clone(),
            })
        }
    }
}

// ── AlarmStore ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct StoreInner {
    alarms: HashMap<String, Alarm>,
    schedule: HashMap<String, Instant>,
}

impl StoreInner {
    /// Validate, build and insert one alarm together with its first schedule
    /// entry.  Must be called with the write lock held.
    fn insert_validated(
        &mut self,
        entry: &NewAlarm,
        intervals: &NotifyIntervals,
        now: Instant,
    ) -> Result<Alarm, AlarmError> {
        // The requested state only has to be valid; creation forces Triggered.
        validate(entry)?;

        let alarm = Alarm::raise(entry.name.clone(), Utc::now());
        if let Some(iv) = intervals.interval_for(alarm.state) {
            self.schedule.insert(alarm.id.clone(), now + iv);
        }
        self.alarms.insert(alarm.id.clone(), alarm.clone());
        Ok(alarm)
    }
}

/// In-memory alarm registry guarded by a single read/write lock.
#[derive(Debug)]
pub struct AlarmStore {
    inner: RwLock<StoreInner>,
    intervals: NotifyIntervals,
}

impl AlarmStore {
    /// Creates an empty store that re-notifies on `intervals`.
    pub fn new(intervals: NotifyIntervals) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            intervals,
        }
    }

    /// Re-notification intervals this store schedules with.
    pub fn intervals(&self) -> &NotifyIntervals {
        &self.intervals
    }

    // ── Mutations (exclusive lock) ────────────────────────────────────────────

    /// Validates `entry`, then inserts a new `Triggered` alarm and its
    /// schedule entry under one write-lock acquisition.
    pub async fn create(&self, entry: &NewAlarm) -> Result<Alarm, AlarmError> {
        let mut inner = self.inner.write().await;
        inner.insert_validated(entry, &self.intervals, Instant::now())
    }

    /// Applies [`create`](Self::create) to every entry under one write-lock
    /// acquisition.  Invalid entries are skipped and reported in the outcome.
    pub async fn bulk_create(&self, entries: &[NewAlarm]) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        let mut inner = self.inner.write().await;
        let now = Instant::now();

        for entry in entries {
            match inner.insert_validated(entry, &self.intervals, now) {
                Ok(alarm) => outcome.created.push(alarm),
                Err(e) => outcome.failures.push(BatchFailure {
                    name: entry.name.clone(),
                    cause: e.to_string(),
                }),
            }
        }
        outcome
    }

    /// Sets the state of alarm `id`.  The schedule entry is left alone; the
    /// dispatcher and the scheduler scan recompute it.
    pub async fn update_state(&self, id: &str, state: AlarmState) -> Result<Alarm, AlarmError> {
        let mut inner = self.inner.write().await;
        let alarm = inner
            .alarms
            .get_mut(id)
            .ok_or_else(|| AlarmError::not_found(id))?;

        alarm.transition(state, Utc::now());
        Ok(alarm.clone())
    }

    /// Removes alarm `id` and its schedule entry atomically.
    pub async fn delete(&self, id: &str) -> Result<Alarm, AlarmError> {
        let mut inner = self.inner.write().await;
        let alarm = inner
            .alarms
            .remove(id)
            .ok_or_else(|| AlarmError::not_found(id))?;
        inner.schedule.remove(id);
        Ok(alarm)
    }

    // ── Reads (shared lock) ───────────────────────────────────────────────────

    /// Snapshot of every alarm.  Order is unspecified.
    pub async fn get_all(&self) -> Vec<Alarm> {
        self.inner.read().await.alarms.values().cloned().collect()
    }

    pub async fn get(&self, id: &str) -> Result<Alarm, AlarmError> {
        self.inner
            .read()
            .await
            .alarms
            .get(id)
            .cloned()
            .ok_or_else(|| AlarmError::not_found(id))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.alarms.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Next eligible re-notification time for `id`, if it has a schedule
    /// entry.
    pub async fn next_notify_at(&self, id: &str) -> Option<Instant> {
        self.inner.read().await.schedule.get(id).copied()
    }

    /// Number of schedule entries.
    pub async fn scheduled_count(&self) -> usize {
        self.inner.read().await.schedule.len()
    }

    // ── Notification support (exclusive lock) ────────────────────────────────

    /// Scheduler step: collect every alarm whose deadline lies strictly before
    /// `now`, re-arming it at `now + interval`.
    ///
    /// * Entries for alarms that no longer exist are dropped.
    /// * Entries for alarms whose current state has no interval are dropped,
    ///   but the alarm is still returned so the dispatcher sees it.
    pub async fn collect_due(&self, now: Instant) -> Vec<Alarm> {
        let mut inner = self.inner.write().await;
        let StoreInner { alarms, schedule } = &mut *inner;

        let mut due = Vec::new();
        schedule.retain(|id, next| {
            if now <= *next {
                return true;
            }
            let Some(alarm) = alarms.get(id) else {
                debug!(alarm_id = %id, "dropping schedule entry of deleted alarm");
                return false;
            };
            due.push(alarm.clone());
            match self.intervals.interval_for(alarm.state) {
                Some(iv) => {
                    *next = now + iv;
                    true
                }
                None => false,
            }
        });
        due
    }

    /// Dispatcher step: look up the *current* record for `id` and, if its
    /// state is re-notified, set its deadline to `now + interval`.
    ///
    /// The interval is always the current state's, so a state change since
    /// the last dispatch replaces the old deadline.  Returns the current record when
    /// a notification should fire, `None` when the alarm is gone or its state
    /// carries no interval (any stale entry is removed in that case).
    pub async fn rearm(&self, id: &str, now: Instant) -> Option<Alarm> {
        let mut inner = self.inner.write().await;

        let current = match inner.alarms.get(id) {
            Some(alarm) => alarm.clone(),
            None => {
                inner.schedule.remove(id);
                return None;
            }
        };

        match self.intervals.interval_for(current.state) {
            Some(iv) => {
                inner.schedule.insert(current.id.clone(), now + iv);
                Some(current)
            }
            None => {
                inner.schedule.remove(id);
                None
            }
        }
    }
}

impl Default for AlarmStore {
    fn default() -> Self {
        Self::new(NotifyIntervals::default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
