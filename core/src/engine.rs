//! The analytics engine: a thin facade over the pure modules.
//!
//! RULES:
//!   - Every view reads exactly one snapshot of the member table.
//!   - Churn-timeline views (risk distribution, priority list, risk
//!     crosstabs, threshold preview) count active members only.
//!   - The engine never mutates a table; uploads replace it wholesale.
//!   - No ambient state: configuration is passed in at build time.

use crate::{
    config::EngineConfig,
    dataset::{DatasetHandle, MemberTable},
    error::EngineResult,
    generator,
    loader,
    portfolio::{self, ExecutiveSummary},
    report::{DashboardReport, MemberDetail, RiskView, RoiView, SegmentView},
    risk::RiskCategory,
    roi::{self, DecayParams, RoiScenario},
    segment::{self, CategoryCounts},
    watchlist::{self, RiskThresholds},
};
use std::path::Path;
use std::sync::Arc;

/// Tenure below which a member counts as "new" in the risk insights.
pub const NEW_MEMBER_TENURE_DAYS: u32 = 30;
/// Fraction of members used for the revenue concentration insight.
pub const CONCENTRATION_TOP_FRACTION: f64 = 0.2;
/// Default length of the priority member list.
pub const PRIORITY_LIST_LIMIT: usize = 25;

pub struct AnalyticsEngine {
    pub config: EngineConfig,
    dataset:    DatasetHandle,
}

impl AnalyticsEngine {
    pub fn new(config: EngineConfig, table: MemberTable) -> Self {
        Self { config, dataset: DatasetHandle::new(table) }
    }

    /// Build an engine over a freshly generated synthetic dataset.
    pub fn build(config: EngineConfig, seed: u64) -> EngineResult<Self> {
        config.validate()?;
        let table = generator::generate(&config.generator, config.cluster_count, seed)?;
        Ok(Self::new(config, table))
    }

    /// Small generated dataset with test defaults.
    pub fn build_test(seed: u64) -> EngineResult<Self> {
        Self::build(EngineConfig::default_test(), seed)
    }

    pub fn snapshot(&self) -> Arc<MemberTable> {
        self.dataset.snapshot()
    }

    /// Replace the dataset with the contents of a CSV file. On error the
    /// current dataset is left untouched.
    pub fn upload_csv(&self, path: impl AsRef<Path>) -> EngineResult<Arc<MemberTable>> {
        let table = loader::load_members(path, self.config.cluster_count)?;
        self.dataset.replace(table);
        Ok(self.snapshot())
    }

    /// Regenerate the dataset from a new seed.
    pub fn regenerate(&self, seed: u64) -> EngineResult<Arc<MemberTable>> {
        let table = generator::generate(&self.config.generator, self.config.cluster_count, seed)?;
        self.dataset.replace(table);
        Ok(self.snapshot())
    }

    // ── Views ──────────────────────────────────────────────────

    pub fn executive_summary(&self) -> EngineResult<ExecutiveSummary> {
        let table = self.snapshot();
        ExecutiveSummary::build(table.members())
    }

    pub fn segment_view(&self) -> SegmentView {
        segment_view(&self.snapshot())
    }

    pub fn risk_view(&self, limit: usize) -> EngineResult<RiskView> {
        risk_view(&self.snapshot(), limit)
    }

    /// ROI for `scenario`, valued at the current average lifetime value,
    /// with the decay projection seeded from current monthly recurring revenue.
    pub fn roi_view(&self, scenario: RoiScenario) -> EngineResult<RoiView> {
        roi_view(&self.snapshot(), scenario, &self.config)
    }

    pub fn member_detail(&self, member_id: &str) -> EngineResult<MemberDetail> {
        let table = self.snapshot();
        let member = table.require(member_id)?.clone();
        let segment = segment::summarize_cluster(table.members(), member.cluster)?;
        Ok(MemberDetail {
            risk_category: member.risk_category(),
            member,
            segment,
        })
    }

    pub fn threshold_preview(&self, thresholds: &RiskThresholds) -> EngineResult<CategoryCounts> {
        watchlist::preview_counts(self.snapshot().active(), thresholds)
    }

    /// All views from one snapshot, using the configured ROI scenario.
    pub fn report(&self) -> EngineResult<DashboardReport> {
        let table = self.snapshot();
        Ok(DashboardReport {
            snapshot_id: table.snapshot_id().to_string(),
            executive: ExecutiveSummary::build(table.members())?,
            segments: segment_view(&table),
            risk: risk_view(&table, PRIORITY_LIST_LIMIT)?,
            roi: roi_view(&table, RoiScenario::from_config(&self.config.roi), &self.config)?,
        })
    }
}

fn segment_view(table: &MemberTable) -> SegmentView {
    SegmentView {
        summaries: segment::summarize(table.members()).into_values().collect(),
        shares: segment::cluster_shares(table.members()),
        risk_by_cluster: segment::risk_by_cluster(table.active()),
    }
}

fn risk_view(table: &MemberTable, limit: usize) -> EngineResult<RiskView> {
    let active_members = table.active();
    let active = || active_members.iter().copied();
    Ok(RiskView {
        distribution: portfolio::risk_distribution(active()),
        priority_members: watchlist::priority_members(active(), &RiskCategory::AT_RISK, Some(limit))
            .into_iter()
            .cloned()
            .collect(),
        zero_engagement: watchlist::zero_engagement_count(active()),
        new_members_at_risk: watchlist::new_members_at_risk(active(), NEW_MEMBER_TENURE_DAYS),
        revenue_concentration: portfolio::revenue_concentration(
            table.members(),
            CONCENTRATION_TOP_FRACTION,
        )?,
        risk_by_group: segment::risk_by_group(active()),
    })
}

fn roi_view(table: &MemberTable, scenario: RoiScenario, config: &EngineConfig) -> EngineResult<RoiView> {
    let average_lifetime_value = portfolio::average_lifetime_value(table.members())?;
    let monthly_revenue = portfolio::monthly_recurring_revenue(table.members());
    let result = roi::project(scenario, average_lifetime_value)?;
    let decay = roi::decay_projection(DecayParams::from_config(monthly_revenue, &config.roi))?;
    Ok(RoiView {
        average_lifetime_value,
        monthly_revenue,
        result,
        decay,
    })
}
