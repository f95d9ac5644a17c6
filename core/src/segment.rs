//! Segment aggregator: per-cluster rollups of the member table.
//!
//! Means are population means over every member ever assigned to the
//! cluster, active or cancelled. Values are returned at full precision;
//! rounding is the caller's concern.

use crate::{
    error::{EngineError, EngineResult},
    member::Member,
    types::{ClusterId, GroupId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub cluster:                  ClusterId,
    pub count:                    usize,
    pub mean_pets_covered:        f64,
    pub mean_tenure_days:         f64,
    pub mean_virtual_care_visits: f64,
    pub mean_monthly_premium:     f64,
    pub mean_lifetime_value:      f64,
    /// cancelled / count within the cluster.
    pub churn_fraction:           f64,
}

#[derive(Default)]
struct Accumulator {
    count:     usize,
    cancelled: usize,
    pets:      f64,
    tenure:    f64,
    visits:    f64,
    premium:   f64,
    ltv:       f64,
}

impl Accumulator {
    fn add(&mut self, m: &Member) {
        self.count += 1;
        if !m.is_active() {
            self.cancelled += 1;
        }
        self.pets += m.pets_covered as f64;
        self.tenure += m.tenure_days as f64;
        self.visits += m.virtual_care_visits as f64;
        self.premium += m.monthly_premium;
        self.ltv += m.lifetime_value;
    }

    fn finish(self, cluster: ClusterId) -> EngineResult<SegmentSummary> {
        if self.count == 0 {
            return Err(EngineError::EmptyDataset { operation: "segment means" });
        }
        let n = self.count as f64;
        Ok(SegmentSummary {
            cluster,
            count: self.count,
            mean_pets_covered: self.pets / n,
            mean_tenure_days: self.tenure / n,
            mean_virtual_care_visits: self.visits / n,
            mean_monthly_premium: self.premium / n,
            mean_lifetime_value: self.ltv / n,
            churn_fraction: self.cancelled as f64 / n,
        })
    }
}

/// One summary per cluster present in the input. Absent clusters get
/// no row; an empty input yields an empty map.
pub fn summarize<'a, I>(members: I) -> BTreeMap<ClusterId, SegmentSummary>
where
    I: IntoIterator<Item = &'a Member>,
{
    let mut acc: BTreeMap<ClusterId, Accumulator> = BTreeMap::new();
    for m in members {
        acc.entry(m.cluster).or_default().add(m);
    }
    acc.into_iter()
        .filter_map(|(cluster, a)| a.finish(cluster).ok().map(|s| (cluster, s)))
        .collect()
}

/// Summary for a single cluster. Fails with EmptyDataset when the
/// cluster has no members, rather than returning zero means.
pub fn summarize_cluster<'a, I>(members: I, cluster: ClusterId) -> EngineResult<SegmentSummary>
where
    I: IntoIterator<Item = &'a Member>,
{
    let mut acc = Accumulator::default();
    for m in members.into_iter().filter(|m| m.cluster == cluster) {
        acc.add(m);
    }
    acc.finish(cluster)
}

/// Fraction of the population in each present cluster.
pub fn cluster_shares<'a, I>(members: I) -> BTreeMap<ClusterId, f64>
where
    I: IntoIterator<Item = &'a Member>,
{
    let mut counts: BTreeMap<ClusterId, usize> = BTreeMap::new();
    let mut total = 0usize;
    for m in members {
        *counts.entry(m.cluster).or_default() += 1;
        total += 1;
    }
    counts
        .into_iter()
        .map(|(c, n)| (c, n as f64 / total as f64))
        .collect()
}

/// Per-category counts in `RiskCategory::ALL` order.
pub type CategoryCounts = [usize; 4];

/// Cluster × risk category count matrix. Every present cluster carries
/// all four categories, zero-filled.
pub fn risk_by_cluster<'a, I>(members: I) -> BTreeMap<ClusterId, CategoryCounts>
where
    I: IntoIterator<Item = &'a Member>,
{
    let mut matrix: BTreeMap<ClusterId, CategoryCounts> = BTreeMap::new();
    for m in members {
        matrix.entry(m.cluster).or_default()[m.risk_category().index()] += 1;
    }
    matrix
}

/// Group × risk category shares. Each group's four shares sum to 1.
pub fn risk_by_group<'a, I>(members: I) -> BTreeMap<GroupId, [f64; 4]>
where
    I: IntoIterator<Item = &'a Member>,
{
    let mut counts: BTreeMap<GroupId, CategoryCounts> = BTreeMap::new();
    for m in members {
        counts.entry(m.group_id.clone()).or_default()[m.risk_category().index()] += 1;
    }
    counts
        .into_iter()
        .map(|(group, row)| {
            let total: usize = row.iter().sum();
            let mut shares = [0.0; 4];
            for (share, n) in shares.iter_mut().zip(row) {
                *share = n as f64 / total as f64;
            }
            (group, shares)
        })
        .collect()
}
