//! Host CPU and memory utilization
//!
//! CPU usage is a delta between two `/proc/stat` snapshots, so it follows
//! the same baseline rules as the network sampler: the first reading and
//! any reading where the counters went backwards report 0%.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use resman_common::{ResmanError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const PROC_STAT: &str = "/proc/stat";
pub const PROC_MEMINFO: &str = "/proc/meminfo";

/// Aggregate CPU time counters from the `cpu` line of `/proc/stat` (in ticks)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    /// Parse the aggregate `cpu` line of `/proc/stat`
    pub fn parse_stat(content: &str) -> Result<Self> {
        let line = content
            .lines()
            .find(|l| l.split_whitespace().next() == Some("cpu"))
            .ok_or_else(|| ResmanError::HostCounters("no aggregate cpu line in stat".into()))?;

        let values = line
            .split_whitespace()
            .skip(1)
            .take(8)
            .map(|v| v.parse::<u64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ResmanError::HostCounters(format!("bad cpu counter: {}", e)))?;

        if values.len() < 4 {
            return Err(ResmanError::HostCounters(format!(
                "expected at least 4 cpu counters, got {}",
                values.len()
            )));
        }

        let at = |i: usize| values.get(i).copied().unwrap_or(0);
        Ok(Self {
            user: at(0),
            nice: at(1),
            system: at(2),
            idle: at(3),
            iowait: at(4),
            irq: at(5),
            softirq: at(6),
            steal: at(7),
        })
    }

    pub fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }

    pub fn idle_total(&self) -> u64 {
        self.idle + self.iowait
    }

    /// Busy percentage between `previous` and `self`, `None` on regression
    pub fn busy_percent_since(&self, previous: &CpuTimes) -> Option<f64> {
        let total = self.total().checked_sub(previous.total())?;
        let idle = self.idle_total().checked_sub(previous.idle_total())?;
        if total == 0 {
            return Some(0.0);
        }
        let busy = total.saturating_sub(idle);
        Some(busy as f64 / total as f64 * 100.0)
    }
}

/// CPU utilization sampler for one host
#[derive(Debug, Default)]
pub struct CpuSampler {
    last: Mutex<Option<CpuTimes>>,
}

impl CpuSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current` and return busy percent since the previous reading
    pub fn sample(&self, current: CpuTimes) -> f64 {
        let mut last = self.last.lock();
        let usage = match last.as_ref() {
            None => 0.0,
            Some(previous) => current.busy_percent_since(previous).unwrap_or_else(|| {
                info!("CPU counters went backwards, re-baselining");
                0.0
            }),
        };
        *last = Some(current);
        usage
    }
}

/// Memory totals from `/proc/meminfo` (in kB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub total_kb: u64,
    pub available_kb: u64,
}

impl MemoryUsage {
    /// Parse `/proc/meminfo`. Falls back to `MemFree` on kernels without `MemAvailable`.
    pub fn parse_meminfo(content: &str) -> Result<Self> {
        let mut total = None;
        let mut available = None;
        let mut free = None;

        for line in content.lines() {
            let Some((key, rest)) = line.split_once(':') else {
                continue;
            };
            let value = rest
                .split_whitespace()
                .next()
                .and_then(|v| v.parse::<u64>().ok());
            match key.trim() {
                "MemTotal" => total = value,
                "MemAvailable" => available = value,
                "MemFree" => free = value,
                _ => {}
            }
        }

        let total_kb =
            total.ok_or_else(|| ResmanError::HostCounters("MemTotal missing from meminfo".into()))?;
        let available_kb = available.or(free).ok_or_else(|| {
            ResmanError::HostCounters("MemAvailable and MemFree missing from meminfo".into())
        })?;

        Ok(Self {
            total_kb,
            available_kb: available_kb.min(total_kb),
        })
    }

    pub fn used_kb(&self) -> u64 {
        self.total_kb - self.available_kb
    }

    pub fn used_percent(&self) -> f64 {
        if self.total_kb == 0 {
            return 0.0;
        }
        self.used_kb() as f64 / self.total_kb as f64 * 100.0
    }
}

/// Point-in-time host utilization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemPerformance {
    pub cpu_usage_percent: f64,
    pub memory_usage_percent: f64,
}

/// Reads CPU and memory utilization from procfs
#[derive(Debug)]
pub struct HostProbe {
    stat_path: PathBuf,
    meminfo_path: PathBuf,
    cpu: CpuSampler,
}

impl HostProbe {
    pub fn new(stat_path: impl Into<PathBuf>, meminfo_path: impl Into<PathBuf>) -> Self {
        Self {
            stat_path: stat_path.into(),
            meminfo_path: meminfo_path.into(),
            cpu: CpuSampler::new(),
        }
    }

    /// Current utilization. CPU reads 0% on the first call.
    pub fn performance(&self) -> Result<SystemPerformance> {
        let stat = read_proc(&self.stat_path)?;
        let meminfo = read_proc(&self.meminfo_path)?;

        // Everything fallible happens before the CPU baseline moves
        let memory = MemoryUsage::parse_meminfo(&meminfo)?;
        let cpu_usage_percent = self.cpu.sample(CpuTimes::parse_stat(&stat)?);

        debug!(
            cpu = cpu_usage_percent,
            memory_used_kb = memory.used_kb(),
            "Sampled host performance"
        );

        Ok(SystemPerformance {
            cpu_usage_percent,
            memory_usage_percent: memory.used_percent(),
        })
    }
}

impl Default for HostProbe {
    fn default() -> Self {
        Self::new(PROC_STAT, PROC_MEMINFO)
    }
}

fn read_proc(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        ResmanError::HostCounters(format!("Failed to read {}: {}", path.display(), e))
    })
}
