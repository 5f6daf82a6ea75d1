//! # Alert Evaluation
//!
//! Maps a [`MetricRecord`] to the threshold alerts it triggers. Evaluation is pure: the
//! thresholds are passed in, nothing is read from the environment, nothing is logged.
//!
//! A metric alerts when it is at or above its threshold. Alerts come back in a fixed order
//! (cpu, ram, disk). Network throughput and battery never alert.
//!
//! ```rust
//! use hostwatch::alert::{evaluate, AlertKind, AlertThresholds, Status};
//! use hostwatch::core::MetricRecord;
//!
//! let record = MetricRecord::new("2025-03-01T12:00:00", 85.0, 40.0, 50.0, 0.0, 0.0, None);
//! let alerts = evaluate(&record, &AlertThresholds::default());
//!
//! assert_eq!(alerts.len(), 1);
//! assert_eq!(alerts[0].kind, AlertKind::Cpu);
//! assert_eq!(Status::from_alerts(&alerts), Status::Alert);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::MetricRecord;

pub const DEFAULT_CPU_WARN: f64 = 85.0;
pub const DEFAULT_RAM_WARN: f64 = 85.0;
pub const DEFAULT_DISK_WARN: f64 = 90.0;

/// Warning levels, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub cpu_warn: f64,
    pub ram_warn: f64,
    pub disk_warn: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self { cpu_warn: DEFAULT_CPU_WARN, ram_warn: DEFAULT_RAM_WARN, disk_warn: DEFAULT_DISK_WARN }
    }
}

/// The metric an alert was raised for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Cpu,
    Ram,
    Disk,
}

impl AlertKind {
    fn label(self) -> &'static str {
        match self {
            AlertKind::Cpu => "CPU",
            AlertKind::Ram => "RAM",
            AlertKind::Disk => "Disk",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::Cpu => write!(f, "cpu"),
            AlertKind::Ram => write!(f, "ram"),
            AlertKind::Disk => write!(f, "disk"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    fn high(kind: AlertKind, value: f64) -> Self {
        Self { kind, message: format!("High {}: {:.1}%", kind.label(), value) }
    }
}

/// Overall health derived from the alert list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Alert,
}

impl Status {
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        if alerts.is_empty() {
            Status::Ok
        } else {
            Status::Alert
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "ok"),
            Status::Alert => write!(f, "alert"),
        }
    }
}

/// Evaluates `record` against `thresholds`.
pub fn evaluate(record: &MetricRecord, thresholds: &AlertThresholds) -> Vec<Alert> {
    [
        (AlertKind::Cpu, record.cpu_percent, thresholds.cpu_warn),
        (AlertKind::Ram, record.ram_percent, thresholds.ram_warn),
        (AlertKind::Disk, record.disk_percent, thresholds.disk_warn),
    ]
    .into_iter()
    .filter(|(_, value, warn)| value >= warn)
    .map(|(kind, value, _)| Alert::high(kind, value))
    .collect()
}
