//! Portfolio metrics: top-level KPIs over a member slice.
//!
//! Every query is an independent pure reduction. Callers pre-filter
//! (active only, a cluster, a risk band) by passing a narrower iterator.

use crate::{
    error::{EngineError, EngineResult},
    member::Member,
    risk::RiskCategory,
    segment::CategoryCounts,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub fn total_count<'a, I>(members: I) -> usize
where
    I: IntoIterator<Item = &'a Member>,
{
    members.into_iter().count()
}

pub fn active_count<'a, I>(members: I) -> usize
where
    I: IntoIterator<Item = &'a Member>,
{
    members.into_iter().filter(|m| m.is_active()).count()
}

/// cancelled / total. Defined as 0 for an empty slice.
pub fn churn_rate<'a, I>(members: I) -> f64
where
    I: IntoIterator<Item = &'a Member>,
{
    let (total, cancelled) = members.into_iter().fold((0usize, 0usize), |(t, c), m| {
        (t + 1, c + usize::from(!m.is_active()))
    });
    if total == 0 {
        0.0
    } else {
        cancelled as f64 / total as f64
    }
}

/// Sum of lifetime value over members whose derived category is in `categories`.
pub fn revenue_at_risk<'a, I>(members: I, categories: &[RiskCategory]) -> f64
where
    I: IntoIterator<Item = &'a Member>,
{
    members
        .into_iter()
        .filter(|m| categories.contains(&m.risk_category()))
        .map(|m| m.lifetime_value)
        .sum()
}

/// Sum of monthly premium over active members.
pub fn monthly_recurring_revenue<'a, I>(members: I) -> f64
where
    I: IntoIterator<Item = &'a Member>,
{
    members
        .into_iter()
        .filter(|m| m.is_active())
        .map(|m| m.monthly_premium)
        .sum()
}

/// Sum of lifetime value over all members, cancelled included.
pub fn portfolio_value<'a, I>(members: I) -> f64
where
    I: IntoIterator<Item = &'a Member>,
{
    members.into_iter().map(|m| m.lifetime_value).sum()
}

pub fn active_value<'a, I>(members: I) -> f64
where
    I: IntoIterator<Item = &'a Member>,
{
    members
        .into_iter()
        .filter(|m| m.is_active())
        .map(|m| m.lifetime_value)
        .sum()
}

/// Mean lifetime value. Fails on an empty slice.
pub fn average_lifetime_value<'a, I>(members: I) -> EngineResult<f64>
where
    I: IntoIterator<Item = &'a Member>,
{
    mean(members.into_iter().map(|m| m.lifetime_value), "average_lifetime_value")
}

/// Mean virtual care visits per member. Fails on an empty slice.
pub fn engagement_rate<'a, I>(members: I) -> EngineResult<f64>
where
    I: IntoIterator<Item = &'a Member>,
{
    mean(
        members.into_iter().map(|m| m.virtual_care_visits as f64),
        "engagement_rate",
    )
}

fn mean<I: Iterator<Item = f64>>(values: I, operation: &'static str) -> EngineResult<f64> {
    let (n, sum) = values.fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
    if n == 0 {
        return Err(EngineError::EmptyDataset { operation });
    }
    Ok(sum / n as f64)
}

/// Member count per category, in `RiskCategory::ALL` order, zero-filled.
pub fn risk_distribution<'a, I>(members: I) -> CategoryCounts
where
    I: IntoIterator<Item = &'a Member>,
{
    let mut counts = [0usize; 4];
    for m in members {
        counts[m.risk_category().index()] += 1;
    }
    counts
}

pub fn at_risk_count<'a, I>(members: I) -> usize
where
    I: IntoIterator<Item = &'a Member>,
{
    members.into_iter().filter(|m| m.is_at_risk()).count()
}

/// at-risk / total. 0 for an empty slice.
pub fn at_risk_share<'a, I>(members: I) -> f64
where
    I: IntoIterator<Item = &'a Member>,
{
    let (total, at_risk) = members.into_iter().fold((0usize, 0usize), |(t, r), m| {
        (t + 1, r + usize::from(m.is_at_risk()))
    });
    if total == 0 {
        0.0
    } else {
        at_risk as f64 / total as f64
    }
}

pub fn distinct_groups<'a, I>(members: I) -> usize
where
    I: IntoIterator<Item = &'a Member>,
{
    members
        .into_iter()
        .map(|m| m.group_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Share of total lifetime value held by the top `floor(n * top_fraction)`
/// members ranked by lifetime value.
pub fn revenue_concentration<'a, I>(members: I, top_fraction: f64) -> EngineResult<f64>
where
    I: IntoIterator<Item = &'a Member>,
{
    if !(top_fraction > 0.0 && top_fraction <= 1.0) {
        return Err(EngineError::invalid_parameter(
            "top_fraction",
            format!("must be in (0, 1], got {top_fraction}"),
        ));
    }
    let mut values: Vec<f64> = members.into_iter().map(|m| m.lifetime_value).collect();
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Ok(0.0);
    }
    values.sort_by(|a, b| b.total_cmp(a));
    let top_n = (values.len() as f64 * top_fraction).floor() as usize;
    let top: f64 = values.iter().take(top_n).sum();
    Ok(top / total)
}

/// Headline numbers for the executive view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub total_members:             usize,
    pub active_members:            usize,
    pub distinct_groups:           usize,
    /// Active members in IMMEDIATE or HIGH.
    pub at_risk_members:           usize,
    /// at_risk_members / active_members.
    pub at_risk_share:             f64,
    /// Lifetime value of active IMMEDIATE + HIGH members.
    pub revenue_at_risk:           f64,
    pub average_lifetime_value:    f64,
    pub engagement_rate:           f64,
    pub churn_rate:                f64,
    pub monthly_recurring_revenue: f64,
    pub portfolio_value:           f64,
    pub active_value:              f64,
}

impl ExecutiveSummary {
    /// Fails with EmptyDataset on an empty slice (the averages need rows).
    ///
    /// Churn-timeline figures count active members only; cancelled
    /// members still contribute to the value totals and churn rate.
    pub fn build<'a, I>(members: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = &'a Member> + Clone,
    {
        let active: Vec<&Member> = members.clone().into_iter().filter(|m| m.is_active()).collect();
        Ok(Self {
            average_lifetime_value: average_lifetime_value(members.clone())?,
            engagement_rate: engagement_rate(members.clone())?,
            total_members: total_count(members.clone()),
            active_members: active_count(members.clone()),
            distinct_groups: distinct_groups(members.clone()),
            at_risk_members: at_risk_count(active.iter().copied()),
            at_risk_share: at_risk_share(active.iter().copied()),
            revenue_at_risk: revenue_at_risk(active.iter().copied(), &RiskCategory::AT_RISK),
            churn_rate: churn_rate(members.clone()),
            monthly_recurring_revenue: monthly_recurring_revenue(members.clone()),
            portfolio_value: portfolio_value(members.clone()),
            active_value: active_value(members),
        })
    }
}
