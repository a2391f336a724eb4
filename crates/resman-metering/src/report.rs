//! Dashboard report
//!
//! Bundles the headline numbers shown on the dashboard's front page.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use resman_common::RateSample;
use serde::{Deserialize, Serialize};

use crate::histogram::Histogram;
use crate::sampler::SystemPerformance;
use crate::usage::UsageSummary;

/// Serializable snapshot of everything the dashboard renders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Registered licenses (membership records accepted)
    pub license_count: usize,
    /// Distinct resources referenced by any license
    pub distinct_resources: usize,
    /// Resource assignments, duplicates included
    pub assigned_resources: u64,
    /// Distinct registrants
    pub distinct_owners: usize,
    /// Per-resource assignment counts
    pub resource_counts: BTreeMap<String, u64>,
    /// Resources assigned more than once
    pub contended_resources: BTreeMap<String, u64>,
    /// Access histogram in chart form (`labels` + `data`)
    pub access_chart: serde_json::Value,
    /// Access-log rows that could not be parsed
    pub skipped_access_rows: usize,
    /// Membership rows that could not be decoded
    pub skipped_membership_rows: usize,
    /// Network throughput since the previous poll
    pub network: RateSample,
    /// Host utilization, if it could be read
    pub performance: Option<SystemPerformance>,
    pub generated_at: DateTime<Utc>,
}

impl DashboardReport {
    pub fn build(
        histogram: &Histogram,
        summary: &UsageSummary,
        network: RateSample,
        performance: Option<SystemPerformance>,
    ) -> Self {
        Self {
            license_count: summary.record_count,
            distinct_resources: summary.distinct_members(),
            assigned_resources: summary.total_assignments(),
            distinct_owners: summary.distinct_owner_count,
            resource_counts: summary.counts.clone(),
            contended_resources: summary.duplicated_only(),
            access_chart: histogram.to_chart_json(),
            skipped_access_rows: histogram.skipped,
            skipped_membership_rows: summary.skipped,
            network,
            performance,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::HistogramAggregator;
    use crate::usage::UsageSummarizer;
    use resman_common::MembershipRecord;

    #[test]
    fn test_build_headline() {
        let histogram = HistogramAggregator::new()
            .aggregate_rows([("download", "2023-06-06 00:26:00"), ("download", "bad")]);
        let summary = UsageSummarizer::new().summarize(&[
            MembershipRecord::new("u1", ["m1", "m2"]),
            MembershipRecord::new("u2", ["m1"]),
        ]);

        let report = DashboardReport::build(&histogram, &summary, RateSample::zero(), None);

        assert_eq!(report.license_count, 2);
        assert_eq!(report.distinct_resources, 2);
        assert_eq!(report.assigned_resources, 3);
        assert_eq!(report.distinct_owners, 2);
        assert_eq!(report.contended_resources.get("m1"), Some(&2));
        assert_eq!(report.skipped_access_rows, 1);
        assert_eq!(report.access_chart["data"]["download"][0], 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["network"]["sent_rate_kbps"], 0.0);
        assert!(json["performance"].is_null());
    }
}
