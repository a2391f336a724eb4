//! Monitor configuration

use std::path::PathBuf;

use config::{Config, Environment, File};
use resman_common::{ResmanError, Result};
use serde::{Deserialize, Serialize};

use crate::sampler::host::{PROC_MEMINFO, PROC_STAT};
use crate::sampler::source::PROC_NET_DEV;

/// Default poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Configuration for the `resman-monitor` binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Interval between host samples
    pub poll_interval_ms: u64,
    /// Network counter file
    pub net_dev_path: PathBuf,
    /// CPU counter file
    pub stat_path: PathBuf,
    /// Memory info file
    pub meminfo_path: PathBuf,
    /// Optional JSON dump of the access log to chart at start-up
    pub access_log_path: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            net_dev_path: PathBuf::from(PROC_NET_DEV),
            stat_path: PathBuf::from(PROC_STAT),
            meminfo_path: PathBuf::from(PROC_MEMINFO),
            access_log_path: None,
        }
    }
}

impl MonitorConfig {
    /// Load from `.env`, an optional `resman.toml`, then `RESMAN_*` variables
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let cfg = Self::layered(File::with_name("resman").required(false))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults, then `file`, then `RESMAN_*` environment variables
    fn layered<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Self::default();
        let cfg = Config::builder()
            .set_default("poll_interval_ms", defaults.poll_interval_ms as i64)?
            .set_default("net_dev_path", path_str(&defaults.net_dev_path))?
            .set_default("stat_path", path_str(&defaults.stat_path))?
            .set_default("meminfo_path", path_str(&defaults.meminfo_path))?
            .add_source(file)
            .add_source(Environment::with_prefix("RESMAN").try_parsing(true))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(ResmanError::Config(
                "poll_interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }
}

fn path_str(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}
