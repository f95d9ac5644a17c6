//! Serializable dashboard views.
//!
//! Each view is plain data built from one table snapshot. The snapshot id
//! is carried along so a caller can tell which upload a view came from.

use crate::{
    member::Member,
    portfolio::ExecutiveSummary,
    risk::RiskCategory,
    roi::{DecayPoint, RoiResult},
    segment::{CategoryCounts, SegmentSummary},
    types::{ClusterId, GroupId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentView {
    pub summaries:       Vec<SegmentSummary>,
    pub shares:          BTreeMap<ClusterId, f64>,
    /// Active members only.
    pub risk_by_cluster: BTreeMap<ClusterId, CategoryCounts>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskView {
    /// Active member counts in IMMEDIATE, HIGH, MEDIUM, LOW order.
    pub distribution:          CategoryCounts,
    pub priority_members:      Vec<Member>,
    pub zero_engagement:       usize,
    pub new_members_at_risk:   usize,
    /// Share of lifetime value held by the top fifth of all members.
    pub revenue_concentration: f64,
    pub risk_by_group:         BTreeMap<GroupId, [f64; 4]>,
}

impl RiskView {
    pub fn count(&self, category: RiskCategory) -> usize {
        self.distribution[category.index()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiView {
    pub average_lifetime_value: f64,
    pub monthly_revenue:        f64,
    pub result:                 RoiResult,
    pub decay:                  Vec<DecayPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDetail {
    pub member:        Member,
    pub risk_category: RiskCategory,
    pub segment:       SegmentSummary,
}

/// Everything the dashboard shows, from a single snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub snapshot_id: String,
    pub executive:   ExecutiveSummary,
    pub segments:    SegmentView,
    pub risk:        RiskView,
    pub roi:         RoiView,
}

impl DashboardReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
