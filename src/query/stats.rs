use serde::{Deserialize, Serialize};

use crate::core::types::round1;
use crate::core::MetricRecord;

/// Aggregates of one gauge over a window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    /// Value of the last record in the window
    pub current: f64,
    /// Arithmetic mean, one decimal
    pub avg: f64,
    pub max: f64,
    pub min: f64,
}

impl MetricStats {
    /// `None` for an empty sequence
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut iter = values.into_iter();
        let first = iter.next()?;

        let (mut sum, mut count, mut max, mut min, mut current) = (first, 1usize, first, first, first);
        for value in iter {
            sum += value;
            count += 1;
            max = max.max(value);
            min = min.min(value);
            current = value;
        }

        Some(Self { current, avg: round1(sum / count as f64), max, min })
    }
}

/// Per-gauge aggregates over a window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub cpu: MetricStats,
    pub ram: MetricStats,
    pub disk: MetricStats,
}

impl SeriesStats {
    /// `None` when `records` is empty
    pub fn from_records(records: &[MetricRecord]) -> Option<Self> {
        Some(Self {
            cpu: MetricStats::from_values(records.iter().map(|r| r.cpu_percent))?,
            ram: MetricStats::from_values(records.iter().map(|r| r.ram_percent))?,
            disk: MetricStats::from_values(records.iter().map(|r| r.disk_percent))?,
        })
    }
}
