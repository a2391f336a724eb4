//! Sampler module - host throughput and utilization
//!
//! This module provides:
//! - CounterSampler: network throughput from cumulative byte counters
//! - CounterSource / ProcNetDev: where those counters come from
//! - CpuSampler / HostProbe: CPU and memory utilization of the host
//!
//! Each sampler owns its "previous sample" behind a lock. Hold one instance
//! per monitored host and share it (e.g. in an `Arc`) with every poller.

pub mod counter;
pub mod host;
pub mod source;

pub use counter::{CounterSampler, SamplerMetrics};
pub use host::{CpuSampler, CpuTimes, HostProbe, MemoryUsage, SystemPerformance};
pub use source::{CounterSource, ProcNetDev};
