//! Seeded synthetic member population.
//!
//! The churn horizon is drawn from a synthetic risk score, not a model:
//! low engagement, short tenure and low value push the score up, and the
//! score picks the band the horizon is drawn from.

use crate::{
    config::GeneratorConfig,
    dataset::MemberTable,
    error::{EngineError, EngineResult},
    member::{Member, MemberStatus},
    risk::{classify, RiskCategory},
    rng::{FieldRng, FieldSlot, RngBank},
    types::ClusterId,
};
use chrono::Duration;

pub const VISITS_LAMBDA: f64 = 3.0;
pub const LTV_MEAN: f64 = 1000.0;
pub const LTV_STD: f64 = 300.0;
pub const LTV_FLOOR: f64 = 100.0;

pub const CLUSTER_PREMIUM: ClusterId = 0;
pub const CLUSTER_AT_RISK: ClusterId = 1;
pub const CLUSTER_NEW: ClusterId = 2;
pub const CLUSTER_STANDARD: ClusterId = 3;

/// Generate a validated table of `config.member_count` members.
/// Same seed and config ⇒ identical rows.
pub fn generate(config: &GeneratorConfig, cluster_count: u32, seed: u64) -> EngineResult<MemberTable> {
    if config.member_count == 0 {
        return Err(EngineError::invalid_parameter("member_count", "must be at least 1"));
    }
    if config.group_count == 0 {
        return Err(EngineError::invalid_parameter("group_count", "must be at least 1"));
    }
    if cluster_count == 0 {
        return Err(EngineError::invalid_parameter("cluster_count", "must be at least 1"));
    }

    let bank = RngBank::new(seed);
    let mut group_rng = bank.for_field(FieldSlot::Group);
    let mut tenure_rng = bank.for_field(FieldSlot::Tenure);
    let mut engagement_rng = bank.for_field(FieldSlot::Engagement);
    let mut value_rng = bank.for_field(FieldSlot::Value);
    let mut risk_rng = bank.for_field(FieldSlot::Risk);
    let mut status_rng = bank.for_field(FieldSlot::Status);
    let mut profile_rng = bank.for_field(FieldSlot::Profile);
    log::debug!(
        "generator: seed={seed} streams=[{}]",
        [&group_rng, &tenure_rng, &engagement_rng, &value_rng, &risk_rng, &status_rng, &profile_rng]
            .map(|r| r.name)
            .join(", "),
    );

    let mut members = Vec::with_capacity(config.member_count);

    for i in 1..=config.member_count {
        let group = group_rng.next_u64_below(config.group_count as u64) + 1;

        let tenure_days = tenure_rng.next_u64_below(config.max_tenure_days.max(1) as u64) as u32;
        let enrollment_date = config
            .as_of
            .checked_sub_signed(Duration::days(tenure_days as i64));

        let virtual_care_visits = engagement_rng.poisson(VISITS_LAMBDA);
        let pets_covered = engagement_rng.range_inclusive(1, 3);

        let tenure_factor = tenure_days as f64 / 365.0;
        let visit_factor = virtual_care_visits as f64 / 5.0;
        let base_ltv = value_rng.normal(LTV_MEAN, LTV_STD);
        let lifetime_value = round_cents((base_ltv * (1.0 + tenure_factor + visit_factor)).max(LTV_FLOOR));
        let tenure_months = (tenure_days as f64 / 30.0).max(12.0);
        let monthly_premium = round_cents(lifetime_value / tenure_months);

        let risk_score = risk_score(&mut risk_rng, virtual_care_visits, tenure_days, lifetime_value);
        let estimated_days_to_churn = days_for_score(&mut risk_rng, risk_score);

        let status = if status_rng.chance(config.cancelled_base_rate * (1.0 + risk_score)) {
            MemberStatus::Cancelled
        } else {
            MemberStatus::Active
        };

        let cluster = assign_cluster(
            classify(estimated_days_to_churn),
            lifetime_value,
            virtual_care_visits,
            tenure_days,
        )
        .min(cluster_count - 1);

        let industry = profile_rng.choose(&config.industries).cloned().unwrap_or_default();
        let location = profile_rng.choose(&config.locations).cloned().unwrap_or_default();

        members.push(Member {
            member_id: format!("M{i:04}"),
            group_id: format!("G{group}"),
            status,
            cluster,
            pets_covered,
            virtual_care_visits,
            tenure_days,
            estimated_days_to_churn,
            monthly_premium,
            lifetime_value,
            industry,
            location,
            enrollment_date,
        });
    }

    let table = MemberTable::new(members, cluster_count)?;
    log::info!(
        "generator: {} members (seed={seed}, snapshot={})",
        table.len(),
        table.snapshot_id(),
    );
    Ok(table)
}

fn risk_score(rng: &mut FieldRng, visits: u32, tenure_days: u32, ltv: f64) -> f64 {
    let mut score = rng.next_f64();
    if visits == 0 {
        score += 0.3;
    }
    if tenure_days < 90 {
        score += 0.2;
    }
    if ltv < 500.0 {
        score += 0.1;
    }
    score.min(1.0)
}

fn days_for_score(rng: &mut FieldRng, score: f64) -> u32 {
    if score > 0.8 {
        rng.range_inclusive(0, 30)
    } else if score > 0.6 {
        rng.range_inclusive(31, 90)
    } else if score > 0.4 {
        rng.range_inclusive(91, 180)
    } else {
        rng.range_inclusive(181, 364)
    }
}

fn assign_cluster(category: RiskCategory, ltv: f64, visits: u32, tenure_days: u32) -> ClusterId {
    if ltv > 1500.0 && visits > 5 {
        CLUSTER_PREMIUM
    } else if RiskCategory::AT_RISK.contains(&category) {
        CLUSTER_AT_RISK
    } else if tenure_days < 90 {
        CLUSTER_NEW
    } else {
        CLUSTER_STANDARD
    }
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
