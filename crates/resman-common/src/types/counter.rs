//! Host network counters and derived throughput
//!
//! A [`CounterSample`] is a snapshot of the host's cumulative byte counters.
//! A [`RateSample`] is the difference between two snapshots expressed in
//! kilobits. It is a raw interval delta: the bytes moved since the previous
//! snapshot, not a per-second rate. Callers polling at a fixed cadence can
//! read it as a rate; everyone else should use [`RateSample::per_second`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BITS_PER_BYTE, BITS_PER_KILOBIT};

/// Cumulative network byte counters at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSample {
    /// Bytes sent since boot (or since the counters were last reset)
    pub bytes_sent: u64,
    /// Bytes received since boot (or since the counters were last reset)
    pub bytes_received: u64,
    /// When the counters were read
    pub timestamp: DateTime<Utc>,
}

impl CounterSample {
    /// Snapshot stamped with the current time
    pub fn new(bytes_sent: u64, bytes_received: u64) -> Self {
        Self::at(bytes_sent, bytes_received, Utc::now())
    }

    pub fn at(bytes_sent: u64, bytes_received: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            bytes_sent,
            bytes_received,
            timestamp,
        }
    }

    /// True if either counter is lower than in `previous` (wraparound or reset)
    pub fn regressed_from(&self, previous: &CounterSample) -> bool {
        self.bytes_sent < previous.bytes_sent || self.bytes_received < previous.bytes_received
    }
}

/// Throughput between two consecutive counter samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSample {
    /// Kilobits sent during the interval
    pub sent_rate_kbps: f64,
    /// Kilobits received during the interval
    pub recv_rate_kbps: f64,
    /// Wall-clock length of the interval, if one was observed
    pub interval_ms: Option<i64>,
}

impl RateSample {
    /// Rate reported when no interval is observable (first sample, reset)
    pub fn zero() -> Self {
        Self {
            sent_rate_kbps: 0.0,
            recv_rate_kbps: 0.0,
            interval_ms: None,
        }
    }

    /// Delta between two samples, or `None` if `current` regressed
    pub fn between(previous: &CounterSample, current: &CounterSample) -> Option<Self> {
        if current.regressed_from(previous) {
            return None;
        }

        let sent = current.bytes_sent - previous.bytes_sent;
        let received = current.bytes_received - previous.bytes_received;
        let interval_ms = (current.timestamp - previous.timestamp).num_milliseconds();

        Some(Self {
            sent_rate_kbps: to_kilobits(sent),
            recv_rate_kbps: to_kilobits(received),
            interval_ms: Some(interval_ms),
        })
    }

    /// Normalize to kilobits per second using the observed interval.
    ///
    /// Returns `None` when there is no interval or it is not positive.
    pub fn per_second(&self) -> Option<(f64, f64)> {
        let ms = self.interval_ms.filter(|ms| *ms > 0)?;
        let secs = ms as f64 / 1_000.0;
        Some((self.sent_rate_kbps / secs, self.recv_rate_kbps / secs))
    }

    pub fn is_zero(&self) -> bool {
        self.sent_rate_kbps == 0.0 && self.recv_rate_kbps == 0.0
    }
}

impl Default for RateSample {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for RateSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sent {:.2} kbps, recv {:.2} kbps",
            self.sent_rate_kbps, self.recv_rate_kbps
        )
    }
}

fn to_kilobits(bytes: u64) -> f64 {
    bytes as f64 * BITS_PER_BYTE / BITS_PER_KILOBIT
}
