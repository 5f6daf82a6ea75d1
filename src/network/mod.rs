//! Network throughput from cumulative interface counters
//!
//! Throughput is derived from two counter snapshots taken a known interval apart. See
//! [`traffic::TrafficData::rate_since`].

pub mod traffic;
