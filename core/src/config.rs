use crate::{
    error::{EngineError, EngineResult},
    roi::{DecayParams, RoiScenario},
    watchlist::RiskThresholds,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "engine_config.json";

// ── Generator ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_member_count")]
    pub member_count: usize,
    #[serde(default = "default_group_count")]
    pub group_count: u32,
    /// Reference date; enrollment = as_of - tenure.
    #[serde(default = "default_as_of")]
    pub as_of: NaiveDate,
    #[serde(default = "default_max_tenure_days")]
    pub max_tenure_days: u32,
    /// Base probability that a generated member is already cancelled.
    /// Scaled up by the member's synthetic risk score.
    #[serde(default = "default_cancelled_base_rate")]
    pub cancelled_base_rate: f64,
    #[serde(default = "default_industries")]
    pub industries: Vec<String>,
    #[serde(default = "default_locations")]
    pub locations: Vec<String>,
}

fn default_member_count() -> usize { 500 }
fn default_group_count() -> u32 { 20 }
fn default_max_tenure_days() -> u32 { 1095 }
fn default_cancelled_base_rate() -> f64 { 0.08 }

fn default_as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
}

fn default_industries() -> Vec<String> {
    ["Technology", "Healthcare", "Retail", "Manufacturing", "Finance", "Education"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_locations() -> Vec<String> {
    ["Austin", "Denver", "Seattle", "Chicago", "Atlanta", "Boston", "Phoenix"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            member_count: default_member_count(),
            group_count: default_group_count(),
            as_of: default_as_of(),
            max_tenure_days: default_max_tenure_days(),
            cancelled_base_rate: default_cancelled_base_rate(),
            industries: default_industries(),
            locations: default_locations(),
        }
    }
}

// ── ROI calculator defaults ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiConfig {
    #[serde(default = "default_intervention_cost")]
    pub intervention_cost: f64,
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
    #[serde(default = "default_target_members")]
    pub target_members: u32,
    /// Per-period revenue multiplier with no retention program.
    #[serde(default = "default_decay_base")]
    pub decay_base: f64,
    /// Per-period revenue multiplier with the retention program.
    #[serde(default = "default_decay_retained")]
    pub decay_retained: f64,
    #[serde(default = "default_horizon")]
    pub horizon: u32,
}

fn default_intervention_cost() -> f64 { 75.0 }
fn default_success_rate() -> f64 { 0.65 }
fn default_target_members() -> u32 { 100 }
fn default_decay_base() -> f64 { 0.98 }
fn default_decay_retained() -> f64 { 0.995 }
fn default_horizon() -> u32 { 12 }

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            intervention_cost: default_intervention_cost(),
            success_rate: default_success_rate(),
            target_members: default_target_members(),
            decay_base: default_decay_base(),
            decay_retained: default_decay_retained(),
            horizon: default_horizon(),
        }
    }
}

// ── Top level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Valid cluster labels are 0..cluster_count.
    #[serde(default = "default_cluster_count")]
    pub cluster_count: u32,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub roi: RoiConfig,
    #[serde(default)]
    pub risk_preview: RiskThresholds,
}

fn default_cluster_count() -> u32 { 4 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cluster_count: default_cluster_count(),
            generator: GeneratorConfig::default(),
            roi: RoiConfig::default(),
            risk_preview: RiskThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Load from `{data_dir}/engine_config.json`.
    /// In tests, use EngineConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/{CONFIG_FILE}");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        log::info!(
            "config: loaded {path} (clusters={}, members={})",
            config.cluster_count,
            config.generator.member_count,
        );
        Ok(config)
    }

    /// Small, fast config for unit and integration tests.
    pub fn default_test() -> Self {
        Self {
            generator: GeneratorConfig {
                member_count: 50,
                group_count: 5,
                ..GeneratorConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.cluster_count == 0 {
            return Err(EngineError::invalid_parameter(
                "cluster_count",
                "must be at least 1",
            ));
        }
        if self.generator.member_count == 0 {
            return Err(EngineError::invalid_parameter(
                "generator.member_count",
                "must be at least 1",
            ));
        }
        if self.generator.group_count == 0 {
            return Err(EngineError::invalid_parameter(
                "generator.group_count",
                "must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.generator.cancelled_base_rate) {
            return Err(EngineError::invalid_parameter(
                "generator.cancelled_base_rate",
                format!("must be in [0, 1], got {}", self.generator.cancelled_base_rate),
            ));
        }
        RoiScenario::from_config(&self.roi).validate()?;
        DecayParams::from_config(0.0, &self.roi).validate()?;
        self.risk_preview.validate()?;
        Ok(())
    }
}
