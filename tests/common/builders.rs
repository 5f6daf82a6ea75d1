use std::collections::VecDeque;

use hostwatch::core::MetricRecord;
use hostwatch::error::{Error, Result};
use hostwatch::network::traffic::TrafficData;
use hostwatch::sampler::MetricSource;

/// Builds records with sensible defaults
pub struct RecordBuilder {
    timestamp: String,
    cpu: f64,
    ram: f64,
    disk: f64,
    rx: f64,
    tx: f64,
    battery: Option<u8>,
}

impl RecordBuilder {
    pub fn new(timestamp: &str) -> Self {
        Self { timestamp: timestamp.to_string(), cpu: 10.0, ram: 20.0, disk: 30.0, rx: 0.0, tx: 0.0, battery: None }
    }

    pub fn cpu(mut self, cpu: f64) -> Self {
        self.cpu = cpu;
        self
    }

    pub fn ram(mut self, ram: f64) -> Self {
        self.ram = ram;
        self
    }

    pub fn disk(mut self, disk: f64) -> Self {
        self.disk = disk;
        self
    }

    pub fn network(mut self, rx: f64, tx: f64) -> Self {
        self.rx = rx;
        self.tx = tx;
        self
    }

    pub fn battery(mut self, battery: u8) -> Self {
        self.battery = Some(battery);
        self
    }

    pub fn build(self) -> MetricRecord {
        MetricRecord::new(self.timestamp, self.cpu, self.ram, self.disk, self.rx, self.tx, self.battery)
    }
}

/// A [`MetricSource`] that replays a script of CPU readings.
///
/// Once the script runs out the last reading repeats. Network counters grow by a fixed
/// step on every read.
pub struct ScriptedSource {
    cpu: VecDeque<f64>,
    last_cpu: f64,
    ram: f64,
    disk: f64,
    counters: TrafficData,
    step: TrafficData,
    battery: Option<u8>,
    failing: bool,
}

impl ScriptedSource {
    pub fn new<I: IntoIterator<Item = f64>>(cpu: I) -> Self {
        Self {
            cpu: cpu.into_iter().collect(),
            last_cpu: 0.0,
            ram: 40.0,
            disk: 50.0,
            counters: TrafficData::new(0, 0),
            step: TrafficData::new(0, 0),
            battery: None,
            failing: false,
        }
    }

    pub fn ram(mut self, ram: f64) -> Self {
        self.ram = ram;
        self
    }

    pub fn disk(mut self, disk: f64) -> Self {
        self.disk = disk;
        self
    }

    /// Bytes added to the received and sent counters on every read
    pub fn traffic_step(mut self, received: u64, sent: u64) -> Self {
        self.step = TrafficData::new(received, sent);
        self
    }

    pub fn battery(mut self, battery: u8) -> Self {
        self.battery = Some(battery);
        self
    }

    /// Every CPU read fails
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }
}

impl MetricSource for ScriptedSource {
    fn prime_cpu(&mut self) {}

    fn cpu_percent(&mut self) -> Result<f64> {
        if self.failing {
            return Err(Error::Measurement("scripted failure".to_string()));
        }
        if let Some(next) = self.cpu.pop_front() {
            self.last_cpu = next;
        }
        Ok(self.last_cpu)
    }

    fn ram_percent(&mut self) -> Result<f64> {
        Ok(self.ram)
    }

    fn disk_percent(&mut self) -> Result<f64> {
        Ok(self.disk)
    }

    fn net_counters(&mut self) -> Result<TrafficData> {
        self.counters = TrafficData::new(
            self.counters.bytes_received + self.step.bytes_received,
            self.counters.bytes_sent + self.step.bytes_sent,
        );
        Ok(self.counters)
    }

    fn battery_percent(&mut self) -> Result<Option<u8>> {
        Ok(self.battery)
    }
}
