/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core alarm data structures.
//!
//! Two types model the two sides of the registry:
//!
//! ```text
//! caller ──(NewAlarm)──►  AlarmService  ──►  Alarm  ──(dispatch queue)──►  Notifier
//!           ↑ unvalidated                      ↑ stored record, cloned out on every read
//!           name + state literal
//! ```
//!
//! # Ownership model
//! The [`AlarmStore`](crate::store::AlarmStore) owns every [`Alarm`].  Callers
//! and the notification tasks only ever see clones taken under the store lock,
//! so a record handed out can never be observed half-mutated.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::AlarmError;

// ── Alarm state ───────────────────────────────────────────────────────────────

/// Lifecycle state of an alarm.
///
/// The set is closed: parsing any other literal fails, so an invalid state can
/// never reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlarmState {
    /// Freshly raised.  Every alarm starts here.
    Triggered,
    /// Being worked on.
    Active,
    /// Operator has seen it.
    #[serde(alias = "ACKed")]
    Acknowledged,
    /// Condition is gone.
    Cleared,
}

impl AlarmState {
    /// All members of the enumeration, in lifecycle order.
    pub const ALL: [AlarmState; 4] = [
        AlarmState::Triggered,
        AlarmState::Active,
        AlarmState::Acknowledged,
        AlarmState::Cleared,
    ];

    /// Wire literal for this state.
    pub fn as_str(self) -> &'static str {
        match self {
            AlarmState::Triggered => "Triggered",
            AlarmState::Active => "Active",
            AlarmState::Acknowledged => "Acknowledged",
            AlarmState::Cleared => "Cleared",
        }
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlarmState {
    type Err = AlarmError;

    /// Parse a wire literal.  `ACKed` is accepted as a legacy spelling of
    /// `Acknowledged`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Triggered" => Ok(AlarmState::Triggered),
            "Active" => Ok(AlarmState::Active),
            "Acknowledged" | "ACKed" => Ok(AlarmState::Acknowledged),
            "Cleared" => Ok(AlarmState::Cleared),
            other => Err(AlarmError::invalid_state(other)),
        }
    }
}

// ── Notification intervals ────────────────────────────────────────────────────

/// Re-notification cadence per state.
///
/// Only `Triggered` and `Acknowledged` carry an interval; an alarm in any
/// other state is never re-notified and holds no schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyIntervals {
    pub triggered: Duration,
    pub acknowledged: Duration,
}

impl NotifyIntervals {
    pub const DEFAULT_TRIGGERED: Duration = Duration::from_secs(2 * 60 * 60);
    pub const DEFAULT_ACKNOWLEDGED: Duration = Duration::from_secs(24 * 60 * 60);

    /// Returns the interval for `state`, or `None` if the state is not
    /// re-notified.
    pub fn interval_for(&self, state: AlarmState) -> Option<Duration> {
        match state {
            AlarmState::Triggered => Some(self.triggered),
            AlarmState::Acknowledged => Some(self.acknowledged),
            AlarmState::Active | AlarmState::Cleared => None,
        }
    }
}

impl Default for NotifyIntervals {
    fn default() -> Self {
        Self {
            triggered: Self::DEFAULT_TRIGGERED,
            acknowledged: Self::DEFAULT_ACKNOWLEDGED,
        }
    }
}

// ── NewAlarm (input) ──────────────────────────────────────────────────────────

/// Unvalidated creation request.
///
/// `state` stays a raw literal so an unknown value surfaces as a validation
/// failure from the service instead of a decode error at the transport.  A
/// missing state is read as `Triggered`, which creation forces anyway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewAlarm {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_state_literal")]
    pub state: String,
}

fn default_state_literal() -> String {
    AlarmState::Triggered.as_str().to_string()
}

impl NewAlarm {
    pub fn new(name: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
        }
    }
}

// ── Alarm (stored record) ─────────────────────────────────────────────────────

/// A tracked alarm.
///
/// # Lifecycle
/// Built by [`Alarm::raise`] inside the store's write lock (fresh id, state
/// forced to `Triggered`), mutated in place by
/// [`Alarm::transition`], and dropped when the alarm is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    /// UUID v4, assigned at creation.
    pub id: String,
    pub name: String,
    pub state: AlarmState,
    pub created_at: DateTime<Utc>,
    /// Equal to `created_at` until the first state mutation.
    pub updated_at: DateTime<Utc>,
    /// Set on every transition to `Acknowledged`, `None` before that.
    pub acked_at: Option<DateTime<Utc>>,
}

impl Alarm {
    /// Creates a new `Triggered` alarm with a fresh identifier.
    pub fn raise(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            state: AlarmState::Triggered,
            created_at: now,
            updated_at: now,
            acked_at: None,
        }
    }

    /// Moves the alarm to `state`, stamping `updated_at` (and `acked_at` for
    /// `Acknowledged`).
    ///
    /// `updated_at` is kept strictly increasing even if the wall clock has not
    /// advanced since the previous mutation.
    pub fn transition(&mut self, state: AlarmState, now: DateTime<Utc>) {
        let stamp = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::microseconds(1)
        };

        self.state = state;
        self.updated_at = stamp;
        if state == AlarmState::Acknowledged {
            self.acked_at = Some(stamp);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
