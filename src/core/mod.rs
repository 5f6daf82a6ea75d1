// Core modules
pub mod metrics;
pub mod types;

pub use metrics::{MetricRecord, Series, CSV_HEADER};
pub use types::Timestamp;
