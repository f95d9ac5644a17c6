//! Risk classifier: maps an estimated churn horizon to a risk bucket.
//!
//! Bands use inclusive upper bounds:
//!   days <= 30   → IMMEDIATE
//!   days <= 90   → HIGH
//!   days <= 180  → MEDIUM
//!   otherwise    → LOW

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const IMMEDIATE_MAX_DAYS: u32 = 30;
pub const HIGH_MAX_DAYS: u32 = 90;
pub const MEDIUM_MAX_DAYS: u32 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    Immediate,
    High,
    Medium,
    Low,
}

impl RiskCategory {
    /// All categories in severity order. Display order everywhere.
    pub const ALL: [RiskCategory; 4] = [
        RiskCategory::Immediate,
        RiskCategory::High,
        RiskCategory::Medium,
        RiskCategory::Low,
    ];

    /// The two categories counted as "at risk" by the executive views.
    pub const AT_RISK: [RiskCategory; 2] = [RiskCategory::Immediate, RiskCategory::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "IMMEDIATE",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    /// Position in `ALL`.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IMMEDIATE" => Ok(Self::Immediate),
            "HIGH" => Ok(Self::High),
            "MEDIUM" => Ok(Self::Medium),
            "LOW" => Ok(Self::Low),
            other => Err(EngineError::invalid_input(format!(
                "unknown risk category '{other}'"
            ))),
        }
    }
}

/// Classify a churn horizon. Total over all non-negative integers.
pub fn classify(days_to_churn: u32) -> RiskCategory {
    if days_to_churn <= IMMEDIATE_MAX_DAYS {
        RiskCategory::Immediate
    } else if days_to_churn <= HIGH_MAX_DAYS {
        RiskCategory::High
    } else if days_to_churn <= MEDIUM_MAX_DAYS {
        RiskCategory::Medium
    } else {
        RiskCategory::Low
    }
}

/// Checked entry point for untyped callers. Negative input is rejected.
pub fn classify_signed(days_to_churn: i64) -> EngineResult<RiskCategory> {
    let days = u32::try_from(days_to_churn).map_err(|_| {
        EngineError::invalid_input(format!(
            "estimated_days_to_churn must be a non-negative integer, got {days_to_churn}"
        ))
    })?;
    Ok(classify(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        assert_eq!(classify(0), RiskCategory::Immediate);
        assert_eq!(classify(30), RiskCategory::Immediate);
        assert_eq!(classify(31), RiskCategory::High);
        assert_eq!(classify(90), RiskCategory::High);
        assert_eq!(classify(91), RiskCategory::Medium);
        assert_eq!(classify(180), RiskCategory::Medium);
        assert_eq!(classify(181), RiskCategory::Low);
        assert_eq!(classify(u32::MAX), RiskCategory::Low);
    }

    #[test]
    fn bands_partition_without_gaps() {
        // Walking upward, the category only ever steps to the next band.
        let mut prev = classify(0);
        for days in 1..=400u32 {
            let cat = classify(days);
            assert!(
                cat == prev || cat.index() == prev.index() + 1,
                "non-monotone step at {days}: {prev} -> {cat}"
            );
            prev = cat;
        }
        assert_eq!(prev, RiskCategory::Low);
    }

    #[test]
    fn negative_input_is_rejected() {
        assert!(matches!(
            classify_signed(-1),
            Err(EngineError::InvalidInput(_))
        ));
        assert_eq!(classify_signed(45).unwrap(), RiskCategory::High);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("medium".parse::<RiskCategory>().unwrap(), RiskCategory::Medium);
        assert!("SEVERE".parse::<RiskCategory>().is_err());
    }
}
