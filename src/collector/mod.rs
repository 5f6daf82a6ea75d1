//! # Collector
//!
//! The driver loop: sample, evaluate alerts, append, sleep.
//!
//! One collector owns one sampler and writes to one store. Ticks run back to back on a
//! single task and never overlap. The pause after a tick is fixed (see
//! [`Config::tick_pause`]) so that sampling time plus pause approximates the configured
//! interval.
//!
//! A tick is the unit of atomicity. A measurement failure or a failed append costs that
//! tick only: [`Collector::run`] logs it and carries on with the next one. Shutdown is
//! observed between ticks, never inside one.


use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument, warn};

use crate::alert::{evaluate, Alert, AlertThresholds};
use crate::config::Config;
use crate::core::MetricRecord;
use crate::error::Result;
use crate::sampler::{MetricSampler, MetricSource};
use crate::store::SeriesStore;

/// Outcome of one successful tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub record: MetricRecord,
    pub alerts: Vec<Alert>,
}

/// Counters accumulated by [`Collector::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub recorded: usize,
    pub failed: usize,
    pub alerts: usize,
}

impl RunSummary {
    pub fn ticks(&self) -> usize {
        self.recorded + self.failed
    }
}

/// Starts waiting for `signal` on a background task right away.
///
/// The returned future completes once `signal` has fired, even if it was first polled
/// after that. Pass it to [`Collector::run`] so a signal raised during the first tick
/// is not missed. It also completes if the listener task goes away.
pub fn spawn_shutdown_listener<F>(signal: F) -> impl Future<Output = ()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        signal.await;
        let _ = tx.send(());
    });
    async move {
        if rx.await.is_err() {
            debug!("shutdown listener dropped");
        }
    }
}

pub struct Collector<S> {
    sampler: MetricSampler<S>,
    store: Arc<SeriesStore>,
    thresholds: AlertThresholds,
    pause: Duration,
}

impl<S: MetricSource> Collector<S> {
    pub fn new(sampler: MetricSampler<S>, store: Arc<SeriesStore>, thresholds: AlertThresholds, pause: Duration) -> Self {
        Self { sampler, store, thresholds, pause }
    }

    pub fn from_config(source: S, store: Arc<SeriesStore>, config: &Config) -> Self {
        Self::new(MetricSampler::new(source, config.sampler_config()), store, config.thresholds, config.tick_pause())
    }

    pub fn store(&self) -> &Arc<SeriesStore> {
        &self.store
    }

    pub fn pause(&self) -> Duration {
        self.pause
    }

    /// Runs one sample-evaluate-append cycle.
    #[instrument(skip(self), level = "debug")]
    pub async fn tick(&mut self) -> Result<TickReport> {
        let record = self.sampler.sample().await?;

        let alerts = evaluate(&record, &self.thresholds);
        for alert in &alerts {
            warn!(kind = %alert.kind, timestamp = %record.timestamp, "ALERT: {}", alert.message);
        }

        self.store.append(&record)?;

        info!(
            timestamp = %record.timestamp,
            cpu = record.cpu_percent,
            ram = record.ram_percent,
            disk = record.disk_percent,
            rx_kbps = record.net_rx_kbps,
            tx_kbps = record.net_tx_kbps,
            battery = ?record.battery_percent,
            "sample recorded"
        );

        Ok(TickReport { record, alerts })
    }

    /// Ticks until `shutdown` completes. A tick in progress always finishes first.
    pub async fn run<F>(&mut self, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut summary = RunSummary::default();

        info!(
            pause_secs = self.pause.as_secs(),
            store = %self.store.series_path().display(),
            "collector running"
        );

        loop {
            match self.tick().await {
                Ok(report) => {
                    summary.recorded += 1;
                    summary.alerts += report.alerts.len();
                }
                Err(e) if e.is_measurement() => {
                    summary.failed += 1;
                    warn!(error = %e, "sample failed, skipping tick");
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(error = %e, "failed to record sample");
                }
            }

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.pause) => {}
            }
        }

        info!(recorded = summary.recorded, failed = summary.failed, alerts = summary.alerts, "collector stopped");
        summary
    }
}
