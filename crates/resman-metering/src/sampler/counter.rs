//! Network counter sampler
//!
//! Turns successive cumulative counter snapshots into [`RateSample`]s.
//! The read of the previous sample, the delta and the write of the new
//! baseline happen under one lock, so concurrent pollers never consume the
//! same delta twice.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use resman_common::{CounterSample, RateSample, Result};
use tracing::{debug, info};

use super::source::CounterSource;

/// Sampler metrics
#[derive(Debug, Default)]
pub struct SamplerMetrics {
    pub samples_taken: AtomicU64,
    pub rebaselines: AtomicU64,
}

/// Stateful throughput sampler for one host
#[derive(Debug, Default)]
pub struct CounterSampler {
    /// Last accepted snapshot, `None` until the first sample
    last: Mutex<Option<CounterSample>>,
    metrics: SamplerMetrics,
}

impl CounterSampler {
    /// Sampler with no baseline; the first sample reports zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Sampler seeded with a known baseline, so the first sample yields a rate
    pub fn with_baseline(baseline: CounterSample) -> Self {
        Self {
            last: Mutex::new(Some(baseline)),
            metrics: SamplerMetrics::default(),
        }
    }

    /// Record `current` and return the delta since the previous sample.
    ///
    /// The first call, and any call where a counter went backwards, stores
    /// `current` as the new baseline and returns a zero rate.
    pub fn sample(&self, current: CounterSample) -> RateSample {
        let mut last = self.last.lock();
        self.advance(&mut last, current)
    }

    /// Read `source` and sample it within the same critical section
    pub fn sample_from(&self, source: &dyn CounterSource) -> Result<RateSample> {
        let mut last = self.last.lock();
        let current = source.read()?;
        Ok(self.advance(&mut last, current))
    }

    /// Current baseline
    pub fn last_sample(&self) -> Option<CounterSample> {
        *self.last.lock()
    }

    /// Forget the baseline; the next sample reports zero
    pub fn reset(&self) {
        *self.last.lock() = None;
    }

    pub fn metrics(&self) -> &SamplerMetrics {
        &self.metrics
    }

    fn advance(&self, last: &mut Option<CounterSample>, current: CounterSample) -> RateSample {
        self.metrics.samples_taken.fetch_add(1, Ordering::Relaxed);

        let rate = match last.as_ref() {
            None => {
                debug!(
                    bytes_sent = current.bytes_sent,
                    bytes_received = current.bytes_received,
                    "Stored initial counter baseline"
                );
                RateSample::zero()
            }
            Some(previous) => match RateSample::between(previous, &current) {
                Some(rate) => rate,
                None => {
                    self.metrics.rebaselines.fetch_add(1, Ordering::Relaxed);
                    info!(
                        prev_sent = previous.bytes_sent,
                        prev_received = previous.bytes_received,
                        bytes_sent = current.bytes_sent,
                        bytes_received = current.bytes_received,
                        "Network counters went backwards, re-baselining"
                    );
                    RateSample::zero()
                }
            },
        };

        *last = Some(current);
        rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    #[test]
    fn test_documented_sequence() {
        let sampler = CounterSampler::new();

        let first = sampler.sample(CounterSample::new(1000, 2000));
        assert_eq!(first.sent_rate_kbps, 0.0);
        assert_eq!(first.recv_rate_kbps, 0.0);

        let second = sampler.sample(CounterSample::new(1500, 2800));
        assert_eq!(second.sent_rate_kbps, 4.0);
        assert_eq!(second.recv_rate_kbps, 6.4);
    }

    #[test]
    fn test_reset_rebaselines() {
        let sampler = CounterSampler::new();
        sampler.sample(CounterSample::new(10_000, 10_000));

        let after_reset = sampler.sample(CounterSample::new(100, 20_000));
        assert!(after_reset.is_zero());
        assert_eq!(sampler.last_sample().unwrap().bytes_sent, 100);
        assert_eq!(sampler.metrics().rebaselines.load(Ordering::Relaxed), 1);

        let next = sampler.sample(CounterSample::new(225, 20_125));
        assert_eq!(next.sent_rate_kbps, 1.0);
        assert_eq!(next.recv_rate_kbps, 1.0);
    }

    #[test]
    fn test_with_baseline_and_manual_reset() {
        let t0 = Utc::now();
        let sampler = CounterSampler::with_baseline(CounterSample::at(0, 0, t0));
        let rate = sampler.sample(CounterSample::at(125, 250, t0 + Duration::seconds(1)));
        assert_eq!(rate.sent_rate_kbps, 1.0);
        assert_eq!(rate.recv_rate_kbps, 2.0);
        assert_eq!(rate.interval_ms, Some(1000));

        sampler.reset();
        assert!(sampler.last_sample().is_none());
        assert!(sampler.sample(CounterSample::new(500, 500)).is_zero());
        assert_eq!(sampler.metrics().samples_taken.load(Ordering::Relaxed), 2);
    }

    proptest! {
        #[test]
        fn prop_increasing_counters_yield_exact_deltas(
            steps in prop::collection::vec((0u64..1_000_000, 0u64..1_000_000), 1..50)
        ) {
            let sampler = CounterSampler::new();
            let (mut sent, mut recv) = (0u64, 0u64);
            prop_assert!(sampler.sample(CounterSample::new(sent, recv)).is_zero());

            for (ds, dr) in steps {
                sent += ds;
                recv += dr;
                let rate = sampler.sample(CounterSample::new(sent, recv));
                prop_assert_eq!(rate.sent_rate_kbps, ds as f64 * 8.0 / 1000.0);
                prop_assert_eq!(rate.recv_rate_kbps, dr as f64 * 8.0 / 1000.0);
            }
        }

        #[test]
        fn prop_rates_never_negative(
            samples in prop::collection::vec((any::<u64>(), any::<u64>()), 1..50)
        ) {
            let sampler = CounterSampler::new();
            for (sent, recv) in samples {
                let rate = sampler.sample(CounterSample::new(sent, recv));
                prop_assert!(rate.sent_rate_kbps >= 0.0);
                prop_assert!(rate.recv_rate_kbps >= 0.0);
            }
        }
    }
}
