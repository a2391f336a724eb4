//! Time-of-day usage histogram
//!
//! Every category observed at least once gets exactly six counts, one per
//! [`TimeBucket`](resman_common::TimeBucket) in index order, zeros included.
//! Rows whose timestamp does not parse are dropped and counted, they never
//! abort the whole report.

use std::collections::BTreeMap;

use resman_common::{AccessEvent, BUCKET_COUNT, BUCKET_LABELS};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument, warn};

/// Per-bucket counts for one category
pub type Series = [u64; BUCKET_COUNT];

/// Category → six bucket counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    /// Counts per category, keyed in lexical order
    pub series: BTreeMap<String, Series>,
    /// Raw rows dropped because they could not be parsed
    pub skipped: usize,
}

impl Histogram {
    /// Counts for a category, if it was observed
    pub fn series(&self, category: &str) -> Option<&Series> {
        self.series.get(category)
    }

    /// Observed categories in lexical order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Total events recorded for a category (0 if unseen)
    pub fn total(&self, category: &str) -> u64 {
        self.series(category).map(|s| s.iter().sum()).unwrap_or(0)
    }

    /// Total events across all categories
    pub fn grand_total(&self) -> u64 {
        self.series.values().flat_map(|s| s.iter()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Copy where every listed category is present, all-zero when unseen
    pub fn zero_filled<I, S>(&self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filled = self.clone();
        for category in categories {
            filled
                .series
                .entry(category.into())
                .or_insert([0; BUCKET_COUNT]);
        }
        filled
    }

    /// `{"labels": [...], "data": {category: [counts]}}` for chart rendering
    pub fn to_chart_json(&self) -> serde_json::Value {
        json!({
            "labels": BUCKET_LABELS,
            "data": self.series,
        })
    }

    fn record(&mut self, event: &AccessEvent) {
        let series = self
            .series
            .entry(event.category.clone())
            .or_insert([0; BUCKET_COUNT]);
        series[event.bucket().index()] += 1;
    }
}

/// Histogram aggregator
///
/// Stateless; safe to share and call concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistogramAggregator;

impl HistogramAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate already-parsed events. Input order does not matter.
    #[instrument(skip_all)]
    pub fn aggregate<'a, I>(&self, events: I) -> Histogram
    where
        I: IntoIterator<Item = &'a AccessEvent>,
    {
        let mut histogram = Histogram::default();
        let mut count = 0usize;
        for event in events {
            histogram.record(event);
            count += 1;
        }
        debug!(
            events = count,
            categories = histogram.series.len(),
            "Aggregated access events"
        );
        histogram
    }

    /// Aggregate raw `(category, timestamp)` rows as fetched from the access log.
    ///
    /// Unparseable rows are dropped and counted in [`Histogram::skipped`].
    #[instrument(skip_all)]
    pub fn aggregate_rows<I, C, T>(&self, rows: I) -> Histogram
    where
        I: IntoIterator<Item = (C, T)>,
        C: AsRef<str>,
        T: AsRef<str>,
    {
        let mut histogram = Histogram::default();
        for (category, raw) in rows {
            match AccessEvent::parse(category.as_ref(), raw.as_ref()) {
                Ok(event) => histogram.record(&event),
                Err(e) => {
                    debug!(error = %e, "Dropping access-log row");
                    histogram.skipped += 1;
                }
            }
        }

        if histogram.skipped > 0 {
            warn!(
                skipped = histogram.skipped,
                "Dropped unparseable access-log rows"
            );
        }
        histogram
    }
}
