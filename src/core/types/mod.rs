//! # Core Types Module
//!
//! Small value types shared by the sampler, the store and the query layer.
//!
//! ## Key Types
//!
//! * `Timestamp` - Second-precision local wall-clock time, kept in its stored text form
//!
//! ## Example
//!
//! ```rust
//! use hostwatch::core::types::Timestamp;
//!
//! let ts = Timestamp::from("2025-03-01T12:00:00");
//! assert!(ts.parse().is_some());
//! assert!(Timestamp::from("yesterday").parse().is_none());
//! ```

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Format used when rendering a timestamp: ISO-8601, no fraction, no offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Second-precision point in time as written to the store.
///
/// The text is kept verbatim so that a malformed value in stored data survives a load
/// and can be detected when a query needs to compare it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Current local time, truncated to whole seconds
    pub fn now() -> Self {
        Self::from_naive(Local::now().naive_local())
    }

    pub fn from_naive(time: NaiveDateTime) -> Self {
        Self(time.format(TIMESTAMP_FORMAT).to_string())
    }

    /// Parses the stored text.
    ///
    /// Accepts the rendered form with an optional fractional part. RFC 3339 values with an
    /// offset are converted to local time. Returns `None` for anything else.
    pub fn parse(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.0, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(&self.0).ok().map(|dt| dt.with_timezone(&Local).naive_local()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self::from_naive(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rounds to one decimal place, half away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
