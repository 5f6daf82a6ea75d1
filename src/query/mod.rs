//! # Query Engine
//!
//! Read-side operations over a loaded [`Series`]: the latest record, a trailing time
//! window, and per-gauge statistics over a window.
//!
//! Windows are boundary-inclusive: a record stamped exactly `now - hours` is inside.
//! When a stored timestamp cannot be parsed the window cannot be computed faithfully, so
//! the query falls back to the last [`FALLBACK_RECORDS`] records instead of failing.
//!
//! `now` is always an argument, which keeps every query deterministic under test.
//!
//! ```rust
//! use chrono::NaiveDateTime;
//! use hostwatch::alert::AlertThresholds;
//! use hostwatch::core::{MetricRecord, Series};
//! use hostwatch::query::QueryEngine;
//!
//! let series = Series::from(vec![
//!     MetricRecord::new("2025-03-01T11:30:00", 10.0, 20.0, 30.0, 0.0, 0.0, None),
//!     MetricRecord::new("2025-03-01T11:45:00", 50.0, 20.0, 30.0, 0.0, 0.0, None),
//!     MetricRecord::new("2025-03-01T12:00:00", 90.0, 20.0, 30.0, 0.0, 0.0, None),
//! ]);
//! let now = NaiveDateTime::parse_from_str("2025-03-01T12:00:00", "%Y-%m-%dT%H:%M:%S").unwrap();
//!
//! let stats = QueryEngine::new(AlertThresholds::default()).stats(&series, 1, now).unwrap();
//! assert_eq!((stats.cpu.current, stats.cpu.avg, stats.cpu.max, stats.cpu.min), (90.0, 50.0, 90.0, 10.0));
//! ```

mod stats;


use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::alert::{evaluate, Alert, AlertThresholds, Status};
use crate::core::{MetricRecord, Series};

pub use stats::{MetricStats, SeriesStats};

/// Number of trailing records returned when a window cannot be computed
pub const FALLBACK_RECORDS: usize = 100;

/// Window used by the aggregate statistics query
pub const STATS_WINDOW_HOURS: u32 = 1;

/// Latest record together with the alerts it raises
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentStatus {
    #[serde(rename = "data")]
    pub record: MetricRecord,
    pub alerts: Vec<Alert>,
    pub status: Status,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngine {
    thresholds: AlertThresholds,
}

impl QueryEngine {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    pub fn latest<'a>(&self, series: &'a Series) -> Option<&'a MetricRecord> {
        series.latest()
    }

    /// Records stamped at or after `now - hours`, in series order.
    pub fn windowed(&self, series: &Series, hours: u32, now: NaiveDateTime) -> Vec<MetricRecord> {
        let Some(cutoff) = now.checked_sub_signed(Duration::hours(i64::from(hours))) else {
            return self.fallback(series, "window start out of range");
        };

        let mut window = Vec::new();
        for record in series.iter() {
            match record.timestamp.parse() {
                Some(ts) if ts >= cutoff => window.push(record.clone()),
                Some(_) => {}
                None => return self.fallback(series, "unparseable timestamp in series"),
            }
        }
        window
    }

    /// Aggregates over the last `hours`; `None` when the window holds no record.
    pub fn stats(&self, series: &Series, hours: u32, now: NaiveDateTime) -> Option<SeriesStats> {
        SeriesStats::from_records(&self.windowed(series, hours, now))
    }

    /// Latest record, its alerts and the overall status; `None` for an empty series.
    pub fn current(&self, series: &Series) -> Option<CurrentStatus> {
        let record = self.latest(series)?.clone();
        let alerts = evaluate(&record, &self.thresholds);
        let status = Status::from_alerts(&alerts);
        Some(CurrentStatus { record, alerts, status })
    }

    fn fallback(&self, series: &Series, reason: &str) -> Vec<MetricRecord> {
        warn!(reason, records = FALLBACK_RECORDS, "cannot compute time window, returning most recent records");
        series.tail(FALLBACK_RECORDS).to_vec()
    }
}
