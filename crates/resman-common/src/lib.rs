//! # Resman Common
//!
//! Shared types and errors for the Resman resource dashboard.
//!
//! ## Core Types
//!
//! - [`AccessEvent`]: one recorded API access (category + wall-clock time)
//! - [`TimeBucket`]: one of the six 4-hour windows of a day
//! - [`CounterSample`]/[`RateSample`]: cumulative host network counters and
//!   the throughput derived from two of them
//! - [`MembershipRecord`]: an owner and the resource ids it references

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{ResmanError, Result};
pub use types::{
    access_event::{AccessEvent, TimeBucket},
    counter::{CounterSample, RateSample},
    membership::MembershipRecord,
};

/// Resman version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of time-of-day buckets in a histogram
pub const BUCKET_COUNT: usize = 6;

/// Width of a single time-of-day bucket in hours
pub const BUCKET_HOURS: u32 = 4;

/// Chart labels for each bucket, in index order
pub const BUCKET_LABELS: [&str; BUCKET_COUNT] = ["0-4", "4-8", "8-12", "12-16", "16-20", "20-24"];

/// Bytes-to-kilobits factor used by rate samples
pub const BITS_PER_BYTE: f64 = 8.0;

/// Bits per kilobit
pub const BITS_PER_KILOBIT: f64 = 1_000.0;
