//! # Metric Sampler
//!
//! Produces one [`MetricRecord`] per call from a [`MetricSource`].
//!
//! CPU, RAM and disk are gauges. CPU usage needs two observations, so the sampler primes
//! the counters and reads usage one CPU window later. Network throughput is a rate: byte
//! counters are read twice, one network window apart. With the defaults (1s + 3s) a call
//! to [`MetricSampler::sample`] therefore takes about four seconds, which dominates the
//! length of a collector tick.
//!
//! Failure policy:
//!
//! - a CPU, RAM or disk read failure fails the sample, no partial record is produced
//! - a network read failure yields a zero rate
//! - a battery read failure yields no battery value
//!
//! ## Example
//!
//! ```rust,no_run
//! use hostwatch::sampler::{MetricSampler, SamplerConfig, SystemSource};
//!
//! #[tokio::main]
//! async fn main() -> hostwatch::Result<()> {
//!     let mut sampler = MetricSampler::new(SystemSource::new("/"), SamplerConfig::default());
//!     let record = sampler.sample().await?;
//!     println!("CPU {}% RAM {}% rx {} kbps", record.cpu_percent, record.ram_percent, record.net_rx_kbps);
//!     Ok(())
//! }
//! ```

mod system;


use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use tracing::{debug, instrument, warn};

use crate::core::types::{round1, Timestamp};
use crate::core::MetricRecord;
use crate::error::{Error, Result};
use crate::network::traffic::{TrafficData, TrafficRate};

pub use system::SystemSource;

pub const DEFAULT_CPU_WINDOW: Duration = Duration::from_secs(1);
pub const DEFAULT_NET_WINDOW: Duration = Duration::from_secs(3);

/// Access to the host's instantaneous metrics
///
/// Implementations only read; all waiting is done by [`MetricSampler`].
#[cfg_attr(test, automock)]
pub trait MetricSource: Send {
    /// Takes the first observation of a CPU usage measurement
    fn prime_cpu(&mut self);

    /// CPU usage since the last [`prime_cpu`](MetricSource::prime_cpu), in percent
    fn cpu_percent(&mut self) -> Result<f64>;

    fn ram_percent(&mut self) -> Result<f64>;

    fn disk_percent(&mut self) -> Result<f64>;

    /// Cumulative byte counters over all interfaces
    fn net_counters(&mut self) -> Result<TrafficData>;

    /// `Ok(None)` when the host has no battery
    fn battery_percent(&mut self) -> Result<Option<u8>>;
}

/// Measurement windows used by the sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    pub cpu_window: Duration,
    pub net_window: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { cpu_window: DEFAULT_CPU_WINDOW, net_window: DEFAULT_NET_WINDOW }
    }
}

impl SamplerConfig {
    /// Time a single sample spends waiting
    pub fn busy_time(&self) -> Duration {
        self.cpu_window + self.net_window
    }
}

pub struct MetricSampler<S> {
    source: S,
    config: SamplerConfig,
}

impl<S: MetricSource> MetricSampler<S> {
    pub fn new(source: S, config: SamplerConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Takes one full sample. Blocks the task for [`SamplerConfig::busy_time`].
    #[instrument(skip(self), level = "debug")]
    pub async fn sample(&mut self) -> Result<MetricRecord> {
        let timestamp = Timestamp::now();

        self.source.prime_cpu();
        tokio::time::sleep(self.config.cpu_window).await;
        let cpu = gauge("cpu", self.source.cpu_percent())?;
        let ram = gauge("ram", self.source.ram_percent())?;
        let disk = gauge("disk", self.source.disk_percent())?;

        let rate = self.measure_network().await;

        let battery = self.source.battery_percent().unwrap_or_else(|e| {
            debug!(error = %e, "battery unavailable");
            None
        });

        Ok(MetricRecord::new(timestamp, cpu, ram, disk, rate.rx_kbps, rate.tx_kbps, battery))
    }

    async fn measure_network(&mut self) -> TrafficRate {
        let before = self.source.net_counters();
        // Always wait the full window so the tick length does not depend on the outcome.
        tokio::time::sleep(self.config.net_window).await;
        let after = self.source.net_counters();

        match (before, after) {
            (Ok(before), Ok(after)) => after.rate_since(&before, self.config.net_window),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "network counters unavailable, reporting zero throughput");
                TrafficRate::default()
            }
        }
    }
}

fn gauge(name: &str, reading: Result<f64>) -> Result<f64> {
    let value = reading.map_err(|e| match e {
        Error::Measurement(msg) => Error::measurement(format!("{name}: {msg}")),
        other => Error::measurement(format!("{name}: {other}")),
    })?;

    if !value.is_finite() {
        return Err(Error::measurement(format!("{name}: non-finite reading {value}")));
    }

    Ok(round1(value.clamp(0.0, 100.0)))
}
