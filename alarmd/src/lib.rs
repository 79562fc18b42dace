/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! alarmd – in-memory alarm registry with periodic re-notification
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── alarm.rs        – Alarm record, AlarmState, NewAlarm, NotifyIntervals
//! ├── store/          – AlarmStore (records + schedule under one RwLock), errors
//! ├── notify/         – dispatch queue, Notifier, scheduler and dispatcher tasks
//! ├── service.rs      – AlarmService façade
//! ├── runtime.rs      – wiring + deterministic shutdown
//! ├── config/         – YAML configuration
//! └── http/           – axum transport
//! ```

pub mod alarm;
pub mod config;
pub mod http;
pub mod notify;
pub mod runtime;
pub mod service;
pub mod store;
