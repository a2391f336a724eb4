//! Membership usage summary
//!
//! One pass over the records builds a frequency map of member ids. A member
//! listed twice in the same record counts twice.

use std::collections::{BTreeMap, BTreeSet};

use resman_common::MembershipRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Member frequencies and owner totals across a set of membership records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    /// member id → number of occurrences across all records
    pub counts: BTreeMap<String, u64>,
    /// Number of unique owner ids
    pub distinct_owner_count: usize,
    /// Records that contributed to the summary
    pub record_count: usize,
    /// Raw rows skipped because their member list could not be decoded
    pub skipped: usize,
    /// Unique owner ids, kept so merges can union them
    #[serde(default)]
    owners: BTreeSet<String>,
}

impl UsageSummary {
    fn add_record(&mut self, record: &MembershipRecord) {
        for member in &record.member_ids {
            *self.counts.entry(member.clone()).or_insert(0) += 1;
        }
        if self.owners.insert(record.owner_id.clone()) {
            self.distinct_owner_count = self.owners.len();
        }
        self.record_count += 1;
    }

    /// Occurrences of a member (0 if never referenced)
    pub fn count(&self, member_id: &str) -> u64 {
        self.counts.get(member_id).copied().unwrap_or(0)
    }

    /// Number of distinct member ids
    pub fn distinct_members(&self) -> usize {
        self.counts.len()
    }

    /// Total member occurrences, duplicates included
    pub fn total_assignments(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Only the members referenced more than once
    pub fn duplicated_only(&self) -> BTreeMap<String, u64> {
        self.counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(member, count)| (member.clone(), *count))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Fold another summary into this one.
    ///
    /// Counts add up; owners are unioned, so an owner present in both is
    /// counted once. A summary without owner ids (e.g. decoded from an older
    /// payload) never lowers the owner count below what it reported.
    pub fn merge(&mut self, other: UsageSummary) {
        for (member, count) in other.counts {
            *self.counts.entry(member).or_insert(0) += count;
        }
        let floor = self.distinct_owner_count.max(other.distinct_owner_count);
        self.owners.extend(other.owners);
        self.distinct_owner_count = self.owners.len().max(floor);
        self.record_count += other.record_count;
        self.skipped += other.skipped;
    }
}

/// Usage summarizer
///
/// Stateless; safe to share and call concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageSummarizer;

impl UsageSummarizer {
    pub fn new() -> Self {
        Self
    }

    /// Summarize decoded membership records
    #[instrument(skip_all)]
    pub fn summarize<'a, I>(&self, records: I) -> UsageSummary
    where
        I: IntoIterator<Item = &'a MembershipRecord>,
    {
        let mut summary = UsageSummary::default();
        for record in records {
            summary.add_record(record);
        }
        debug!(
            records = summary.record_count,
            members = summary.distinct_members(),
            owners = summary.distinct_owner_count,
            "Summarized membership records"
        );
        summary
    }

    /// Summarize raw `(owner_id, json_member_list)` rows.
    ///
    /// Rows whose member list is not a JSON array of strings are skipped and
    /// counted in [`UsageSummary::skipped`].
    #[instrument(skip_all)]
    pub fn summarize_rows<I, O, P>(&self, rows: I) -> UsageSummary
    where
        I: IntoIterator<Item = (O, P)>,
        O: AsRef<str>,
        P: AsRef<str>,
    {
        let mut summary = UsageSummary::default();
        for (owner_id, payload) in rows {
            match MembershipRecord::from_json(owner_id.as_ref(), payload.as_ref()) {
                Ok(record) => summary.add_record(&record),
                Err(e) => {
                    warn!(error = %e, "Skipping membership row");
                    summary.skipped += 1;
                }
            }
        }
        summary
    }
}
