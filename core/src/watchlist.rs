//! Churn risk list: prioritised members, what-if thresholds, and
//! quick insight counts for the risk views.

use crate::{
    error::{EngineError, EngineResult},
    member::Member,
    risk::RiskCategory,
    segment::CategoryCounts,
};
use serde::{Deserialize, Serialize};

/// Members whose category is in `categories`, soonest churn first,
/// then highest lifetime value, then id. `limit` caps the result.
pub fn priority_members<'a, I>(
    members: I,
    categories: &[RiskCategory],
    limit: Option<usize>,
) -> Vec<&'a Member>
where
    I: IntoIterator<Item = &'a Member>,
{
    let mut out: Vec<&Member> = members
        .into_iter()
        .filter(|m| categories.contains(&m.risk_category()))
        .collect();
    out.sort_by(|a, b| {
        a.estimated_days_to_churn
            .cmp(&b.estimated_days_to_churn)
            .then_with(|| b.lifetime_value.total_cmp(&a.lifetime_value))
            .then_with(|| a.member_id.cmp(&b.member_id))
    });
    if let Some(n) = limit {
        out.truncate(n);
    }
    out
}

/// Alternative band edges for the settings preview. These never change
/// a member's derived category; they only answer "how many would move".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub immediate: u32,
    pub high:      u32,
    pub medium:    u32,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            immediate: crate::risk::IMMEDIATE_MAX_DAYS,
            high: crate::risk::HIGH_MAX_DAYS,
            medium: crate::risk::MEDIUM_MAX_DAYS,
        }
    }
}

impl RiskThresholds {
    pub fn validate(&self) -> EngineResult<()> {
        if self.immediate == 0 || self.immediate >= self.high || self.high >= self.medium {
            return Err(EngineError::invalid_parameter(
                "risk_thresholds",
                format!(
                    "need 0 < immediate < high < medium, got {}/{}/{}",
                    self.immediate, self.high, self.medium
                ),
            ));
        }
        Ok(())
    }

    pub fn bucket(&self, days: u32) -> RiskCategory {
        if days <= self.immediate {
            RiskCategory::Immediate
        } else if days <= self.high {
            RiskCategory::High
        } else if days <= self.medium {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        }
    }
}

/// Per-category counts under `thresholds`, in `RiskCategory::ALL` order.
pub fn preview_counts<'a, I>(members: I, thresholds: &RiskThresholds) -> EngineResult<CategoryCounts>
where
    I: IntoIterator<Item = &'a Member>,
{
    thresholds.validate()?;
    let mut counts = [0usize; 4];
    for m in members {
        counts[thresholds.bucket(m.estimated_days_to_churn).index()] += 1;
    }
    Ok(counts)
}

/// Members who have never used virtual care.
pub fn zero_engagement_count<'a, I>(members: I) -> usize
where
    I: IntoIterator<Item = &'a Member>,
{
    members
        .into_iter()
        .filter(|m| m.virtual_care_visits == 0)
        .count()
}

/// Members with tenure under `max_tenure_days` who are already IMMEDIATE or HIGH.
pub fn new_members_at_risk<'a, I>(members: I, max_tenure_days: u32) -> usize
where
    I: IntoIterator<Item = &'a Member>,
{
    members
        .into_iter()
        .filter(|m| m.tenure_days < max_tenure_days && m.is_at_risk())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_match_classifier() {
        let t = RiskThresholds::default();
        for days in 0..400 {
            assert_eq!(t.bucket(days), crate::risk::classify(days), "days={days}");
        }
    }

    #[test]
    fn thresholds_must_increase() {
        let bad = RiskThresholds { immediate: 60, high: 60, medium: 180 };
        assert!(bad.validate().is_err());
        let zero = RiskThresholds { immediate: 0, high: 60, medium: 180 };
        assert!(zero.validate().is_err());
    }
}
