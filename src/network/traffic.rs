use std::time::Duration;

use crate::core::types::round1;

/// Cumulative byte counters summed over every interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficData {
    /// Total bytes received
    pub bytes_received: u64,

    /// Total bytes sent
    pub bytes_sent: u64,
}

impl TrafficData {
    pub fn new(bytes_received: u64, bytes_sent: u64) -> Self {
        Self { bytes_received, bytes_sent }
    }

    /// Throughput between an `earlier` reading and this one, taken `window` apart.
    ///
    /// A counter that went backwards (interface reset, wrap) counts as no traffic.
    pub fn rate_since(&self, earlier: &TrafficData, window: Duration) -> TrafficRate {
        TrafficRate {
            rx_kbps: kbps(self.bytes_received.saturating_sub(earlier.bytes_received), window),
            tx_kbps: kbps(self.bytes_sent.saturating_sub(earlier.bytes_sent), window),
        }
    }
}

/// Throughput in kilobits per second, one decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrafficRate {
    pub rx_kbps: f64,
    pub tx_kbps: f64,
}

fn kbps(bytes: u64, window: Duration) -> f64 {
    let seconds = window.as_secs_f64();
    if seconds > 0.0 {
        round1(bytes as f64 * 8.0 / 1024.0 / seconds)
    } else {
        0.0
    }
}
