//! # Query Service
//!
//! Request/response adapter over [`QueryEngine`] for an outer surface (HTTP routes, the
//! CLI). Every call loads the store afresh, so a service can run alongside a collector
//! in another process. Nothing here fails: an unreadable store is no data, and no data is
//! an explicit [`Response::Failure`] rather than zeros.
//!
//! Responses serialize as
//!
//! ```json
//! {"success": true, "data": ..., ...}
//! {"success": false, "error": "No data available"}
//! ```


use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::core::MetricRecord;
use crate::query::{CurrentStatus, QueryEngine, SeriesStats, STATS_WINDOW_HOURS};
use crate::store::SeriesStore;

pub const NO_DATA: &str = "No data available";

/// Outcome of a query.
///
/// The `success` flag is derived from the variant when serializing, and chooses the
/// variant when deserializing, so the two cannot disagree.
#[derive(Debug, Clone, PartialEq)]
pub enum Response<T> {
    Success { payload: T },
    Failure { error: String },
}

impl<T> Response<T> {
    pub fn success(payload: T) -> Self {
        Response::Success { payload }
    }

    pub fn no_data() -> Self {
        Response::Failure { error: NO_DATA.to_string() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            Response::Success { payload } => Some(payload),
            Response::Failure { .. } => None,
        }
    }

    pub fn into_payload(self) -> Option<T> {
        match self {
            Response::Success { payload } => Some(payload),
            Response::Failure { .. } => None,
        }
    }

    fn from_option(payload: Option<T>) -> Self {
        payload.map_or_else(Self::no_data, Self::success)
    }
}

#[derive(Serialize)]
struct SuccessBody<'a, T> {
    success: bool,
    #[serde(flatten)]
    payload: &'a T,
}

#[derive(Serialize)]
struct FailureBody<'a> {
    success: bool,
    error: &'a str,
}

impl<T: Serialize> Serialize for Response<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Response::Success { payload } => SuccessBody { success: true, payload }.serialize(serializer),
            Response::Failure { error } => FailureBody { success: false, error }.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Response<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut value = Value::deserialize(deserializer)?;
        let body = value.as_object_mut().ok_or_else(|| D::Error::custom("response must be a JSON object"))?;

        match body.remove("success") {
            Some(Value::Bool(true)) => T::deserialize(value).map(Response::success).map_err(D::Error::custom),
            Some(Value::Bool(false)) => match body.remove("error") {
                Some(Value::String(error)) => Ok(Response::Failure { error }),
                _ => Err(D::Error::custom("failed response without an error message")),
            },
            _ => Err(D::Error::custom("missing or non-boolean `success` flag")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub data: Vec<MetricRecord>,
    pub hours: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub data: SeriesStats,
}

/// Clock used to anchor query windows
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time, matching how records are stamped
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stopped at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub struct QueryService {
    store: Arc<SeriesStore>,
    engine: QueryEngine,
    clock: Box<dyn Clock>,
}

impl QueryService {
    pub fn new(store: Arc<SeriesStore>, engine: QueryEngine) -> Self {
        Self::with_clock(store, engine, LocalClock)
    }

    pub fn with_clock(store: Arc<SeriesStore>, engine: QueryEngine, clock: impl Clock + 'static) -> Self {
        Self { store, engine, clock: Box::new(clock) }
    }

    /// Latest record, its alerts and the overall status
    pub fn current(&self) -> Response<CurrentStatus> {
        Response::from_option(self.engine.current(&self.store.load()))
    }

    /// Records from the last `hours`.
    ///
    /// No data only when nothing was ever recorded; an empty window over a non-empty
    /// series is a successful, empty history.
    pub fn history(&self, hours: u32) -> Response<History> {
        let series = self.store.load();
        if series.is_empty() {
            return Response::no_data();
        }
        let data = self.engine.windowed(&series, hours, self.clock.now());
        Response::success(History { data, hours })
    }

    /// Per-gauge statistics over the last hour
    pub fn stats(&self) -> Response<Stats> {
        let series = self.store.load();
        let stats = self.engine.stats(&series, STATS_WINDOW_HOURS, self.clock.now());
        Response::from_option(stats.map(|data| Stats { data }))
    }
}
