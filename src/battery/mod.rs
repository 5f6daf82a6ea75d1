//! # Battery Module
//!
//! Best-effort battery charge readout from the kernel's power-supply class
//! (`/sys/class/power_supply/<name>/{type,capacity}`).
//!
//! Hosts without a battery, or platforms without that directory, report no charge
//! rather than an error. Only a battery that exists but cannot be read is an error.
//!
//! ```rust,no_run
//! use hostwatch::battery::PowerSupply;
//!
//! match PowerSupply::new().percentage() {
//!     Ok(Some(pct)) => println!("Battery: {pct}%"),
//!     Ok(None) => println!("No battery"),
//!     Err(e) => println!("Battery unreadable: {e}"),
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default sysfs location of power supplies on Linux
pub const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

const BATTERY_TYPE: &str = "Battery";

#[derive(Debug, Clone)]
pub struct PowerSupply {
    root: PathBuf,
}

impl Default for PowerSupply {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerSupply {
    pub fn new() -> Self {
        Self::with_root(POWER_SUPPLY_ROOT)
    }

    /// Reads supplies from another directory laid out like the sysfs class
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Charge of the first battery (by supply name), 0-100.
    ///
    /// Returns `Ok(None)` when there is no battery.
    pub fn percentage(&self) -> Result<Option<u8>> {
        let Some(battery) = self.first_battery()? else {
            return Ok(None);
        };

        let raw = fs::read_to_string(battery.join("capacity"))?;
        let capacity: f64 = raw
            .trim()
            .parse()
            .map_err(|_| Error::measurement(format!("unparseable battery capacity {:?}", raw.trim())))?;

        Ok(Some(capacity.clamp(0.0, 100.0).round() as u8))
    }

    fn first_battery(&self) -> Result<Option<PathBuf>> {
        if !self.root.is_dir() {
            return Ok(None);
        }

        let mut supplies: Vec<PathBuf> = fs::read_dir(&self.root)?.flatten().map(|entry| entry.path()).collect();
        supplies.sort();

        Ok(supplies.into_iter().find(|dir| is_battery(dir)))
    }
}

fn is_battery(dir: &Path) -> bool {
    fs::read_to_string(dir.join("type")).map(|kind| kind.trim() == BATTERY_TYPE).unwrap_or(false)
}
