//! Retention ROI projector.
//!
//! Two independent calculations:
//!   1. Scenario economics: cost of an intervention program against the
//!      lifetime value of the churns it prevents.
//!   2. Revenue decay: baseline monthly revenue compounded by a per-period
//!      multiplier, with and without the program.

use crate::{
    config::RoiConfig,
    error::{EngineError, EngineResult},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiScenario {
    /// Cost per targeted member. Must be > 0.
    pub intervention_cost: f64,
    /// Fraction of targeted members retained, in [0, 1].
    pub success_rate:      f64,
    /// Number of members the program targets. Must be > 0.
    pub target_members:    u32,
}

impl RoiScenario {
    pub fn from_config(config: &RoiConfig) -> Self {
        Self {
            intervention_cost: config.intervention_cost,
            success_rate: config.success_rate,
            target_members: config.target_members,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !(self.intervention_cost.is_finite() && self.intervention_cost > 0.0) {
            return Err(EngineError::invalid_parameter(
                "intervention_cost",
                format!("must be > 0, got {}", self.intervention_cost),
            ));
        }
        if !(0.0..=1.0).contains(&self.success_rate) {
            return Err(EngineError::invalid_parameter(
                "success_rate",
                format!("must be in [0, 1], got {}", self.success_rate),
            ));
        }
        if self.target_members == 0 {
            return Err(EngineError::invalid_parameter(
                "target_members",
                "must be > 0",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiResult {
    pub scenario:         RoiScenario,
    pub total_cost:       f64,
    /// Not rounded; may be fractional.
    pub prevented_churns: f64,
    pub revenue_saved:    f64,
    pub net_benefit:      f64,
    pub roi_ratio:        f64,
}

pub fn project(scenario: RoiScenario, avg_lifetime_value: f64) -> EngineResult<RoiResult> {
    scenario.validate()?;
    if !(avg_lifetime_value.is_finite() && avg_lifetime_value >= 0.0) {
        return Err(EngineError::invalid_parameter(
            "avg_lifetime_value",
            format!("must be a non-negative amount, got {avg_lifetime_value}"),
        ));
    }

    let targets = scenario.target_members as f64;
    let total_cost = scenario.intervention_cost * targets;
    let prevented_churns = targets * scenario.success_rate;
    let revenue_saved = prevented_churns * avg_lifetime_value;
    let net_benefit = revenue_saved - total_cost;
    let roi_ratio = if total_cost > 0.0 { net_benefit / total_cost } else { 0.0 };

    Ok(RoiResult {
        scenario,
        total_cost,
        prevented_churns,
        revenue_saved,
        net_benefit,
        roi_ratio,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayPoint {
    pub period:   u32,
    pub baseline: f64,
    pub retained: f64,
}

impl DecayPoint {
    /// Revenue preserved by the program in this period.
    pub fn uplift(&self) -> f64 {
        self.retained - self.baseline
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayParams {
    pub monthly_revenue: f64,
    pub decay_base:      f64,
    pub decay_retained:  f64,
    pub horizon:         u32,
}

impl DecayParams {
    pub fn from_config(monthly_revenue: f64, config: &RoiConfig) -> Self {
        Self {
            monthly_revenue,
            decay_base: config.decay_base,
            decay_retained: config.decay_retained,
            horizon: config.horizon,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !(self.monthly_revenue.is_finite() && self.monthly_revenue >= 0.0) {
            return Err(EngineError::invalid_parameter(
                "monthly_revenue",
                format!("must be a non-negative amount, got {}", self.monthly_revenue),
            ));
        }
        for (name, d) in [("decay_base", self.decay_base), ("decay_retained", self.decay_retained)] {
            if !(d > 0.0 && d <= 1.0) {
                return Err(EngineError::invalid_parameter(
                    name,
                    format!("must be in (0, 1], got {d}"),
                ));
            }
        }
        if self.horizon == 0 {
            return Err(EngineError::invalid_parameter("horizon", "must be at least 1"));
        }
        Ok(())
    }
}

/// `R * d^t` for t = 1..=horizon, under both multipliers.
pub fn decay_projection(params: DecayParams) -> EngineResult<Vec<DecayPoint>> {
    params.validate()?;
    let points = (1..=params.horizon)
        .map(|t| {
            let exp = t as i32;
            DecayPoint {
                period: t,
                baseline: params.monthly_revenue * params.decay_base.powi(exp),
                retained: params.monthly_revenue * params.decay_retained.powi(exp),
            }
        })
        .collect();
    Ok(points)
}
