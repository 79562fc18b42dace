/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the alarm registry.
//!
//! Two types model the two failure layers:
//!
//! * [`BatchFailure`]: why a single entry of a bulk request was skipped.
//! * [`AlarmError`]: the per-operation error returned by
//!   [`AlarmService`](crate::service::AlarmService).
//!
//! None of these are fatal to the process, and a failed operation never
//! leaves a record partially mutated.

use thiserror::Error;

// ── Bulk entry failure ────────────────────────────────────────────────────────

/// One rejected entry of a bulk creation, identified by the name the caller
/// supplied (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub name: String,
    pub cause: String,
}

impl std::fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Alarm {}: {}", self.name, self.cause)
    }
}

// ── Top-level alarm errors ────────────────────────────────────────────────────

/// Error type returned by every registry operation.
///
/// The HTTP layer maps the variants onto status codes:
///
/// | Variant | Status |
/// |---|---|
/// | `Validation` | `400 Bad Request` |
/// | `NotFound` | `404 Not Found` |
/// | `PartialBatch` | `400 Bad Request` (body still lists the created alarms) |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlarmError {
    /// Caller-supplied data violates a static invariant (empty name, unknown
    /// state literal).
    #[error("{0}")]
    Validation(String),

    /// The referenced alarm is not in the store.
    #[error("alarm {id} not found")]
    NotFound { id: String },

    /// A bulk creation skipped one or more entries.  The created subset is
    /// returned alongside this error, not inside it.
    #[error("failed to create some alarms: {}", join_failures(.failures))]
    PartialBatch { failures: Vec<BatchFailure> },
}

impl AlarmError {
    pub(crate) fn empty_name() -> Self {
        AlarmError::Validation("alarm name is mandatory".to_string())
    }

    pub(crate) fn invalid_state(literal: &str) -> Self {
        AlarmError::Validation(format!("invalid alarm state: '{literal}'"))
    }

    pub(crate) fn not_found(id: &str) -> Self {
        AlarmError::NotFound { id: id.to_string() }
    }
}

fn join_failures(failures: &[BatchFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
