//! # Resman Metering
//!
//! Aggregation and sampling behind the Resman resource dashboard.
//!
//! ## Components
//!
//! - [`HistogramAggregator`]: access events → six 4-hour buckets per category
//! - [`CounterSampler`]: cumulative network counters → throughput, tolerant
//!   of counter resets
//! - [`UsageSummarizer`]: membership records → per-resource frequencies,
//!   distinct owners and contended resources
//! - [`DashboardReport`]: the headline numbers built from all three
//!
//! The aggregator and summarizer are pure. The samplers hold the previous
//! snapshot behind a lock; keep one per monitored host.
//!
//! ```text
//!  access-log rows ──► HistogramAggregator ──┐
//!  membership rows ──► UsageSummarizer ──────┼──► DashboardReport
//!  /proc/net/dev ────► CounterSampler ───────┤
//!  /proc/stat,meminfo ► HostProbe ───────────┘
//! ```

pub mod config;
pub mod histogram;
pub mod report;
pub mod sampler;
pub mod usage;

pub use config::MonitorConfig;
pub use histogram::{Histogram, HistogramAggregator};
pub use report::DashboardReport;
pub use sampler::{
    CounterSampler, CounterSource, CpuSampler, HostProbe, ProcNetDev, SystemPerformance,
};
pub use usage::{UsageSummarizer, UsageSummary};
