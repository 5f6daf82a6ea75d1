use std::path::{Path, PathBuf};

use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, Networks, RefreshKind, System};

use super::MetricSource;
use crate::battery::PowerSupply;
use crate::error::{Error, Result};
use crate::network::traffic::TrafficData;

/// [`MetricSource`] backed by `sysinfo` and the power-supply class
///
/// Keeps its `sysinfo` handles between samples so each read is a refresh, not a rescan.
pub struct SystemSource {
    sys: System,
    disks: Disks,
    networks: Networks,
    disk_mount: PathBuf,
    power: PowerSupply,
}

impl SystemSource {
    /// Disk usage is reported for the filesystem holding `disk_mount`
    pub fn new(disk_mount: impl Into<PathBuf>) -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
                .with_memory(MemoryRefreshKind::nothing().with_ram()),
        );

        Self {
            sys,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            disk_mount: disk_mount.into(),
            power: PowerSupply::new(),
        }
    }

    pub fn with_power_supply(mut self, power: PowerSupply) -> Self {
        self.power = power;
        self
    }

    pub fn disk_mount(&self) -> &Path {
        &self.disk_mount
    }
}

impl MetricSource for SystemSource {
    fn prime_cpu(&mut self) {
        self.sys.refresh_cpu_usage();
    }

    fn cpu_percent(&mut self) -> Result<f64> {
        self.sys.refresh_cpu_usage();
        if self.sys.cpus().is_empty() {
            return Err(Error::measurement("no CPUs reported"));
        }
        Ok(f64::from(self.sys.global_cpu_usage()))
    }

    fn ram_percent(&mut self) -> Result<f64> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return Err(Error::measurement("total memory reported as zero"));
        }
        let used = total.saturating_sub(self.sys.available_memory());
        Ok(used as f64 / total as f64 * 100.0)
    }

    fn disk_percent(&mut self) -> Result<f64> {
        self.disks.refresh(true);

        // The filesystem holding the path is the one with the longest matching mount point.
        let disk = self
            .disks
            .list()
            .iter()
            .filter(|disk| self.disk_mount.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .ok_or_else(|| Error::measurement(format!("no filesystem mounted at {}", self.disk_mount.display())))?;

        let total = disk.total_space();
        if total == 0 {
            return Err(Error::measurement(format!("{} reports zero capacity", disk.mount_point().display())));
        }
        let used = total.saturating_sub(disk.available_space());
        Ok(used as f64 / total as f64 * 100.0)
    }

    fn net_counters(&mut self) -> Result<TrafficData> {
        self.networks.refresh(true);
        let counters = self.networks.iter().fold(TrafficData::default(), |acc, (_, data)| TrafficData {
            bytes_received: acc.bytes_received.saturating_add(data.total_received()),
            bytes_sent: acc.bytes_sent.saturating_add(data.total_transmitted()),
        });
        Ok(counters)
    }

    fn battery_percent(&mut self) -> Result<Option<u8>> {
        self.power.percentage()
    }
}
