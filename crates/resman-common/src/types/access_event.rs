//! AccessEvent - one recorded license/API access
//!
//! Events are appended by the access-log writer on every download or
//! license check and never mutated afterwards. Timestamps are wall-clock
//! times as the host saw them, so bucketing is by local hour of day.

use chrono::{DateTime, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{ResmanError, Result};
use crate::{BUCKET_COUNT, BUCKET_HOURS, BUCKET_LABELS};

/// Naive layouts accepted for stored access times (fractional seconds optional)
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// One of the six contiguous 4-hour windows of a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TimeBucket(u8);

impl TryFrom<u8> for TimeBucket {
    type Error = ResmanError;

    fn try_from(index: u8) -> Result<Self> {
        if (index as usize) < BUCKET_COUNT {
            Ok(TimeBucket(index))
        } else {
            Err(ResmanError::InvalidBucket(index))
        }
    }
}

impl From<TimeBucket> for u8 {
    fn from(bucket: TimeBucket) -> Self {
        bucket.0
    }
}

impl TimeBucket {
    /// All buckets in index order
    pub const ALL: [TimeBucket; BUCKET_COUNT] = [
        TimeBucket(0),
        TimeBucket(1),
        TimeBucket(2),
        TimeBucket(3),
        TimeBucket(4),
        TimeBucket(5),
    ];

    /// Bucket for an hour of day. Out-of-range hours clamp to the last bucket.
    pub fn from_hour(hour: u32) -> Self {
        let index = (hour / BUCKET_HOURS).min(BUCKET_COUNT as u32 - 1);
        TimeBucket(index as u8)
    }

    /// Bucket containing a timestamp
    pub fn of(timestamp: &NaiveDateTime) -> Self {
        Self::from_hour(timestamp.hour())
    }

    /// Position of this bucket in a histogram series
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Chart label, e.g. `"4-8"`
    pub fn label(self) -> &'static str {
        BUCKET_LABELS[self.index()]
    }

    /// First hour covered by this bucket
    pub fn start_hour(self) -> u32 {
        self.0 as u32 * BUCKET_HOURS
    }
}

/// A single categorized access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEvent {
    /// Access category, e.g. `download` or `check_license`
    pub category: String,
    /// Wall-clock time of the access
    pub timestamp: NaiveDateTime,
}

impl AccessEvent {
    pub fn new(category: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            category: category.into(),
            timestamp,
        }
    }

    /// Build an event from a raw access-log row.
    ///
    /// Accepts `YYYY-MM-DD HH:MM:SS`, the `T`-separated variant (both with
    /// optional fractional seconds) and RFC 3339. For RFC 3339 input the
    /// wall-clock time at the given offset is kept.
    pub fn parse(category: &str, raw_timestamp: &str) -> Result<Self> {
        let category = category.trim();
        if category.is_empty() {
            return Err(ResmanError::InvalidEvent("category is required".into()));
        }
        let timestamp = parse_timestamp(raw_timestamp)?;
        Ok(Self::new(category, timestamp))
    }

    /// Time-of-day bucket of this event
    pub fn bucket(&self) -> TimeBucket {
        TimeBucket::of(&self.timestamp)
    }
}

/// Parse a stored access time
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ResmanError::InvalidTimestamp {
            raw: raw.to_string(),
            reason: "empty timestamp".into(),
        });
    }

    let mut last_err = None;
    for format in NAIVE_FORMATS {
        match NaiveDateTime::parse_from_str(trimmed, format) {
            Ok(ts) => return Ok(ts),
            Err(e) => last_err = Some(e),
        }
    }

    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(ts) => Ok(ts.naive_local()),
        Err(_) => Err(ResmanError::InvalidTimestamp {
            raw: raw.to_string(),
            reason: last_err.map(|e| e.to_string()).unwrap_or_default(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 6, 6)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_parse_storage_format() {
        let event = AccessEvent::parse("download", "2023-06-06 04:24:00").unwrap();
        assert_eq!(event.category, "download");
        assert_eq!(event.timestamp, at(4, 24, 0));
        assert_eq!(event.bucket().index(), 1);
    }

    #[test]
    fn test_parse_iso_and_fractional() {
        let event = AccessEvent::parse("check_license", "2023-06-06T00:26:00").unwrap();
        assert_eq!(event.timestamp, at(0, 26, 0));

        let event = AccessEvent::parse("download", "2023-06-06 23:59:59.250").unwrap();
        assert_eq!(event.bucket().index(), 5);
    }

    #[test]
    fn test_parse_minute_precision() {
        let event = AccessEvent::parse("download", "2023-06-06 00:26").unwrap();
        assert_eq!(event.timestamp, at(0, 26, 0));

        let event = AccessEvent::parse("download", "2023-06-06T04:24").unwrap();
        assert_eq!(event.bucket().index(), 1);
    }

    #[test]
    fn test_parse_rfc3339_keeps_wall_clock() {
        let event = AccessEvent::parse("download", "2024-05-31T16:39:00+09:00").unwrap();
        assert_eq!(event.timestamp.hour(), 16);
        assert_eq!(event.bucket().label(), "16-20");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            AccessEvent::parse("download", "yesterday"),
            Err(ResmanError::InvalidTimestamp { .. })
        ));
        assert!(matches!(
            AccessEvent::parse("download", "   "),
            Err(ResmanError::InvalidTimestamp { .. })
        ));
        assert!(matches!(
            AccessEvent::parse("", "2023-06-06 00:26:00"),
            Err(ResmanError::InvalidEvent(_))
        ));
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(TimeBucket::of(&at(3, 59, 59)).index(), 0);
        assert_eq!(TimeBucket::of(&at(4, 0, 0)).index(), 1);
        assert_eq!(TimeBucket::of(&at(19, 59, 59)).index(), 4);
        assert_eq!(TimeBucket::of(&at(20, 0, 0)).index(), 5);
        assert_eq!(TimeBucket::from_hour(99).index(), 5);
    }

    #[test]
    fn test_bucket_labels() {
        let labels: Vec<_> = TimeBucket::ALL.iter().map(|b| b.label()).collect();
        assert_eq!(labels, BUCKET_LABELS.to_vec());
        assert_eq!(TimeBucket::ALL[3].start_hour(), 12);
    }

    #[test]
    fn test_bucket_deserialize_rejects_out_of_range() {
        let bucket: TimeBucket = serde_json::from_str("5").unwrap();
        assert_eq!(bucket.label(), "20-24");
        assert_eq!(serde_json::to_string(&bucket).unwrap(), "5");

        assert!(serde_json::from_str::<TimeBucket>("6").is_err());
        assert!(serde_json::from_str::<TimeBucket>("9").is_err());
        assert!(matches!(
            TimeBucket::try_from(200),
            Err(ResmanError::InvalidBucket(200))
        ));
    }

    proptest! {
        #[test]
        fn prop_bucket_matches_hour_window(h in 0u32..24, m in 0u32..60, s in 0u32..60) {
            let bucket = TimeBucket::of(&at(h, m, s));
            prop_assert_eq!(bucket.index() as u32, h / 4);
            prop_assert!(bucket.start_hour() <= h && h < bucket.start_hour() + BUCKET_HOURS);
        }

        #[test]
        fn prop_same_bucket_only_within_window(h1 in 0u32..24, h2 in 0u32..24) {
            let same = TimeBucket::from_hour(h1) == TimeBucket::from_hour(h2);
            prop_assert_eq!(same, h1 / 4 == h2 / 4);
        }
    }
}
