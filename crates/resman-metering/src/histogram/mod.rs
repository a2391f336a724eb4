//! Histogram module
//!
//! Buckets the access log into six 4-hour time-of-day windows per category:
//! - HistogramAggregator: builds histograms from typed events or raw rows
//! - Histogram: category → fixed 6-slot count series

pub mod aggregator;

pub use aggregator::{Histogram, HistogramAggregator, Series};
