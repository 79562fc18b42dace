//! alarmd configuration loading.
//!
//! The expected YAML structure is (every key optional):
//! ```yaml
//! server:
//!   port: 8080
//! notifications:
//!   scan_period_secs: 3600
//!   queue_capacity: 100
//!   intervals:
//!     triggered_secs: 7200
//!     acknowledged_secs: 86400
//! ```
//!
//! Missing keys fall back to the built-in defaults; zero values are rejected.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::alarm::NotifyIntervals;
use crate::notify::scheduler::DEFAULT_SCAN_PERIOD;
use crate::notify::DEFAULT_QUEUE_CAPACITY;

/// Port the HTTP server listens on when neither the file nor the CLI sets one.
pub const DEFAULT_PORT: u16 = 8080;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerEntry,
    notifications: NotificationsEntry,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerEntry {
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NotificationsEntry {
    scan_period_secs: Option<u64>,
    queue_capacity: Option<usize>,
    intervals: IntervalsEntry,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IntervalsEntry {
    triggered_secs: Option<u64>,
    acknowledged_secs: Option<u64>,
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Semantic problems in an otherwise well-formed configuration file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("'{field}' must be greater than zero")]
    Zero { field: &'static str },
}

// ── Public data structures ────────────────────────────────────────────────────

/// Settings for the re-notification pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    /// How often the scheduler scans for due alarms.
    pub scan_period: Duration,
    /// Bound of the dispatch queue.
    pub queue_capacity: usize,
    pub intervals: NotifyIntervals,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            scan_period: DEFAULT_SCAN_PERIOD,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            intervals: NotifyIntervals::default(),
        }
    }
}

/// Complete daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmdConfig {
    pub port: u16,
    pub notifications: NotificationSettings,
}

impl Default for AlarmdConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            notifications: NotificationSettings::default(),
        }
    }
}

impl AlarmdConfig {
    /// Parses `path` into a configuration, filling gaps with defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is structurally
    /// invalid, or a value is out of range.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        let config = Self::from_file(file)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        debug!(?config, "configuration loaded");
        Ok(config)
    }

    fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let n = file.notifications;

        let scan_period = secs_or(
            n.scan_period_secs,
            defaults.notifications.scan_period,
            "notifications.scan_period_secs",
        )?;
        let triggered = secs_or(
            n.intervals.triggered_secs,
            defaults.notifications.intervals.triggered,
            "notifications.intervals.triggered_secs",
        )?;
        let acknowledged = secs_or(
            n.intervals.acknowledged_secs,
            defaults.notifications.intervals.acknowledged,
            "notifications.intervals.acknowledged_secs",
        )?;

        let queue_capacity = n
            .queue_capacity
            .unwrap_or(defaults.notifications.queue_capacity);
        if queue_capacity == 0 {
            return Err(ConfigError::Zero {
                field: "notifications.queue_capacity",
            });
        }

        Ok(Self {
            port: file.server.port.unwrap_or(defaults.port),
            notifications: NotificationSettings {
                scan_period,
                queue_capacity,
                intervals: NotifyIntervals {
                    triggered,
                    acknowledged,
                },
            },
        })
    }
}

fn secs_or(
    value: Option<u64>,
    default: Duration,
    field: &'static str,
) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(default),
        Some(0) => Err(ConfigError::Zero { field }),
        Some(secs) => Ok(Duration::from_secs(secs)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AlarmdConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.notifications.scan_period, Duration::from_secs(3_600));
        assert_eq!(cfg.notifications.queue_capacity, 100);
        assert_eq!(cfg.notifications.intervals, NotifyIntervals::default());
    }

    #[test]
    fn load_full_yaml() {
        let yaml = r#"
server:
  port: 9090
notifications:
  scan_period_secs: 60
  queue_capacity: 16
  intervals:
    triggered_secs: 120
    acknowledged_secs: 600
"#;
        let f = yaml_tempfile(yaml);
        let cfg = AlarmdConfig::load_from_file(f.path()).unwrap();

        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.notifications.scan_period, Duration::from_secs(60));
        assert_eq!(cfg.notifications.queue_capacity, 16);
        assert_eq!(cfg.notifications.intervals.triggered, Duration::from_secs(120));
        assert_eq!(cfg.notifications.intervals.acknowledged, Duration::from_secs(600));
    }

    #[test]
    fn partial_yaml_keeps_defaults_for_missing_keys() {
        let f = yaml_tempfile("notifications:\n  intervals:\n    triggered_secs: 30\n");
        let cfg = AlarmdConfig::load_from_file(f.path()).unwrap();

        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.notifications.intervals.triggered, Duration::from_secs(30));
        assert_eq!(
            cfg.notifications.intervals.acknowledged,
            NotifyIntervals::DEFAULT_ACKNOWLEDGED
        );
    }

    #[test]
    fn empty_mapping_is_all_defaults() {
        let f = yaml_tempfile("{}\n");
        let cfg = AlarmdConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg, AlarmdConfig::default());
    }

    #[test]
    fn zero_values_are_rejected() {
        let f = yaml_tempfile("notifications:\n  queue_capacity: 0\n");
        let err = AlarmdConfig::load_from_file(f.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::Zero {
                field: "notifications.queue_capacity"
            })
        );

        let f = yaml_tempfile("notifications:\n  scan_period_secs: 0\n");
        assert!(AlarmdConfig::load_from_file(f.path()).is_err());
    }

    #[test]
    fn missing_file_returns_error() {
        let result = AlarmdConfig::load_from_file(Path::new("/nonexistent/path/alarmd.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        assert!(AlarmdConfig::load_from_file(f.path()).is_err());
    }
}
