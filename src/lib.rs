//! Hostwatch - a small host health collector
//!
//! This crate samples a handful of host gauges at a fixed cadence, keeps every sample in an
//! append-only log on disk and answers queries over that log.
//!
//! # Features
//!
//! - **Sampling**: CPU, RAM and disk usage, network throughput and battery charge
//! - **Alerts**: threshold checks on CPU, RAM and disk for every sample
//! - **Storage**: an append-only JSON Lines series (`health.jsonl`) plus a CSV mirror
//! - **Queries**: latest sample, time-windowed history and per-gauge statistics
//!
//! # Examples
//!
//! Collecting until Ctrl-C:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use hostwatch::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ConfigLoader::new().load()?;
//!     let store = Arc::new(SeriesStore::open(&config.log_dir)?.with_plain_log(config.plain_log));
//!     let source = SystemSource::new(&config.disk_mount);
//!
//!     let mut collector = Collector::from_config(source, store, &config);
//!     let summary = collector.run(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     }).await;
//!     println!("recorded {} samples", summary.recorded);
//!     Ok(())
//! }
//! ```
//!
//! Evaluating a sample against thresholds:
//!
//! ```rust
//! use hostwatch::prelude::*;
//!
//! let record = MetricRecord::new("2025-03-01T12:00:00", 91.0, 40.0, 50.0, 8.0, 1.0, None);
//! let alerts = evaluate(&record, &AlertThresholds::default());
//! assert_eq!(alerts[0].message, "High CPU: 91.0%");
//! ```
//!
//! # Error Handling
//!
//! Fallible operations return [`Result`]. Read paths used by the query surface never fail:
//! an unreadable or corrupt store reads as an empty series, and
//! [`SeriesStore::load_checked`](store::SeriesStore::load_checked) is there for callers that
//! want to tell the two apart.

#![doc(html_root_url = "https://docs.rs/hostwatch/0.1.0")]

pub mod alert;
pub mod battery;
pub mod collector;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod query;
pub mod sampler;
pub mod service;
pub mod store;

pub use error::{Error, Result};

/// Re-export common types for convenience
pub mod prelude {
    pub use crate::alert::{evaluate, Alert, AlertKind, AlertThresholds, Status};
    pub use crate::collector::{Collector, RunSummary, TickReport};
    pub use crate::config::{Config, ConfigLoader};
    pub use crate::core::{MetricRecord, Series, Timestamp};
    pub use crate::query::{CurrentStatus, QueryEngine, SeriesStats};
    pub use crate::sampler::{MetricSampler, MetricSource, SamplerConfig, SystemSource};
    pub use crate::service::{QueryService, Response};
    pub use crate::store::SeriesStore;
    pub use crate::{Error, Result};
}
