use crate::{
    error::{EngineError, EngineResult},
    risk::{classify, RiskCategory},
    types::{ClusterId, GroupId, MemberId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Cancelled, // terminal
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl FromStr for MemberStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::invalid_input(format!(
                "unknown status '{other}' (expected active | cancelled)"
            ))),
        }
    }
}

/// One row of the member table.
///
/// The risk category is not a field: it is derived from
/// `estimated_days_to_churn` on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub member_id:               MemberId,
    pub group_id:                GroupId,
    pub status:                  MemberStatus,
    pub cluster:                 ClusterId,
    pub pets_covered:            u32,
    pub virtual_care_visits:     u32,
    pub tenure_days:             u32,
    pub estimated_days_to_churn: u32,
    pub monthly_premium:         f64,
    pub lifetime_value:          f64,
    pub industry:                String,
    pub location:                String,
    #[serde(default)]
    pub enrollment_date:         Option<NaiveDate>,
}

impl Member {
    pub fn risk_category(&self) -> RiskCategory {
        classify(self.estimated_days_to_churn)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_at_risk(&self) -> bool {
        RiskCategory::AT_RISK.contains(&self.risk_category())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(days: u32) -> Member {
        Member {
            member_id: "M0001".into(),
            group_id: "G1".into(),
            status: MemberStatus::Active,
            cluster: 0,
            pets_covered: 1,
            virtual_care_visits: 2,
            tenure_days: 400,
            estimated_days_to_churn: days,
            monthly_premium: 45.0,
            lifetime_value: 1200.0,
            industry: "Retail".into(),
            location: "Austin".into(),
            enrollment_date: None,
        }
    }

    #[test]
    fn risk_category_follows_days_to_churn() {
        let mut m = sample(200);
        assert_eq!(m.risk_category(), RiskCategory::Low);
        m.estimated_days_to_churn = 12;
        assert_eq!(m.risk_category(), RiskCategory::Immediate);
        assert!(m.is_at_risk());
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Cancelled".parse::<MemberStatus>().unwrap(), MemberStatus::Cancelled);
        assert!("churned".parse::<MemberStatus>().is_err());
    }
}
