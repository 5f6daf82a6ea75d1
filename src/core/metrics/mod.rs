/// # Core Metrics Module
///
/// The record produced once per collector tick and the series those records form.
///
/// ## Example
///
/// ```rust
/// use hostwatch::core::metrics::{MetricRecord, Series};
///
/// let record = MetricRecord::new("2025-03-01T12:00:00", 12.5, 40.0, 61.2, 3.1, 0.8, Some(97));
/// let series = Series::from(vec![record.clone()]);
/// assert_eq!(series.latest(), Some(&record));
/// ```
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::core::types::Timestamp;
use crate::error::{Error, Result};

/// Header row of the plain-text log, in field order
pub const CSV_HEADER: &str = "timestamp,cpu_percent,ram_percent,disk_percent,net_rx_kbps,net_tx_kbps,battery_percent";

/// One sample of host health
///
/// Created by the sampler, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub timestamp: Timestamp,
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub disk_percent: f64,
    pub net_rx_kbps: f64,
    pub net_tx_kbps: f64,
    /// `None` when the host has no battery or it could not be read
    pub battery_percent: Option<u8>,
}

impl MetricRecord {
    pub fn new(
        timestamp: impl Into<Timestamp>,
        cpu_percent: f64,
        ram_percent: f64,
        disk_percent: f64,
        net_rx_kbps: f64,
        net_tx_kbps: f64,
        battery_percent: Option<u8>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            cpu_percent,
            ram_percent,
            disk_percent,
            net_rx_kbps,
            net_tx_kbps,
            battery_percent,
        }
    }

    /// Checks that every gauge and rate is a finite number.
    ///
    /// JSON has no encoding for NaN or infinity, so such a record could not be read back.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("cpu_percent", self.cpu_percent),
            ("ram_percent", self.ram_percent),
            ("disk_percent", self.disk_percent),
            ("net_rx_kbps", self.net_rx_kbps),
            ("net_tx_kbps", self.net_tx_kbps),
        ] {
            if !value.is_finite() {
                return Err(Error::invalid_record(format!("{name} is not finite ({value}) at {}", self.timestamp)));
            }
        }
        Ok(())
    }

    /// Renders the record as one line of the plain-text log, without the newline.
    pub fn to_csv_line(&self) -> String {
        let battery = self.battery_percent.map(|b| b.to_string()).unwrap_or_default();
        format!(
            "{},{:.1},{:.1},{:.1},{:.1},{:.1},{}",
            self.timestamp, self.cpu_percent, self.ram_percent, self.disk_percent, self.net_rx_kbps, self.net_tx_kbps, battery
        )
    }
}

/// Records in insertion order, which is also chronological order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series {
    records: Vec<MetricRecord>,
}

impl Series {
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    pub(crate) fn push(&mut self, record: MetricRecord) {
        self.records.push(record);
    }

    /// Returns the most recent record in the series, if any
    pub fn latest(&self) -> Option<&MetricRecord> {
        self.records.last()
    }

    /// The last `n` records, or all of them when the series is shorter
    pub fn tail(&self, n: usize) -> &[MetricRecord] {
        &self.records[self.records.len().saturating_sub(n)..]
    }

    pub fn into_vec(self) -> Vec<MetricRecord> {
        self.records
    }
}

impl Deref for Series {
    type Target = [MetricRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl From<Vec<MetricRecord>> for Series {
    fn from(records: Vec<MetricRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<MetricRecord> for Series {
    fn from_iter<I: IntoIterator<Item = MetricRecord>>(iter: I) -> Self {
        Self { records: iter.into_iter().collect() }
    }
}

impl IntoIterator for Series {
    type Item = MetricRecord;
    type IntoIter = std::vec::IntoIter<MetricRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
