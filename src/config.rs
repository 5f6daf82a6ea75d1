//! Collector configuration
//!
//! Sources are merged in this order, later ones overriding earlier ones:
//!
//! 1. [`Config::default`]
//! 2. a TOML file (`hostwatch.toml` in the working directory unless another path is given)
//! 3. environment variables prefixed with `HOSTWATCH_`, nested keys separated by `__`
//!    (`HOSTWATCH_INTERVAL_SECS=30`, `HOSTWATCH_THRESHOLDS__CPU_WARN=70`)
//!
//! The result is validated before it is handed out.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::alert::AlertThresholds;
use crate::error::{Error, Result};
use crate::sampler::SamplerConfig;

pub const DEFAULT_CONFIG_FILE: &str = "hostwatch.toml";
pub const ENV_PREFIX: &str = "HOSTWATCH_";

pub const DEFAULT_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_NET_SAMPLE_SECS: u64 = 3;
pub const DEFAULT_CPU_SAMPLE_SECS: u64 = 1;
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_DISK_MOUNT: &str = "/";

/// Shortest pause between two ticks
pub const MIN_TICK_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Target length of one collector tick, sampling included
    pub interval_secs: u64,
    /// Network throughput measurement window
    pub net_sample_secs: u64,
    /// CPU usage measurement window
    pub cpu_sample_secs: u64,
    pub thresholds: AlertThresholds,
    /// Directory holding the series log and its plain-text mirror
    pub log_dir: PathBuf,
    /// Disk usage is reported for the filesystem holding this path
    pub disk_mount: PathBuf,
    /// Keep the plain-text mirror of the series
    pub plain_log: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            net_sample_secs: DEFAULT_NET_SAMPLE_SECS,
            cpu_sample_secs: DEFAULT_CPU_SAMPLE_SECS,
            thresholds: AlertThresholds::default(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            disk_mount: PathBuf::from(DEFAULT_DISK_MOUNT),
            plain_log: true,
        }
    }
}

impl Config {
    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            cpu_window: Duration::from_secs(self.cpu_sample_secs),
            net_window: Duration::from_secs(self.net_sample_secs),
        }
    }

    /// Sleep after each tick: `max(1, interval - cpu window - network window)` seconds
    pub fn tick_pause(&self) -> Duration {
        let busy = self.cpu_sample_secs.saturating_add(self.net_sample_secs);
        Duration::from_secs(self.interval_secs.saturating_sub(busy)).max(MIN_TICK_PAUSE)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(Error::config("interval_secs must be greater than 0"));
        }
        if self.net_sample_secs == 0 {
            return Err(Error::config("net_sample_secs must be greater than 0"));
        }
        for (name, value) in [
            ("thresholds.cpu_warn", self.thresholds.cpu_warn),
            ("thresholds.ram_warn", self.thresholds.ram_warn),
            ("thresholds.disk_warn", self.thresholds.disk_warn),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(Error::config(format!("{name} must be within 0..=100, got {value}")));
            }
        }
        if self.log_dir.as_os_str().is_empty() {
            return Err(Error::config("log_dir must not be empty"));
        }
        if !self.disk_mount.is_absolute() {
            return Err(Error::config(format!("disk_mount must be an absolute path, got {}", self.disk_mount.display())));
        }
        Ok(())
    }
}

/// Builds a [`Config`] from defaults, a TOML file and the environment
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None, env_prefix: ENV_PREFIX.to_string() }
    }

    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn load(&self) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        let path = self.config_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if path.exists() {
            debug!(path = %path.display(), "loading configuration file");
            figment = figment.merge(Toml::file(&path));
        } else if self.config_path.is_some() {
            warn!(path = %path.display(), "configuration file not found, using defaults");
        }

        figment = figment.merge(Env::prefixed(&self.env_prefix).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }
}
