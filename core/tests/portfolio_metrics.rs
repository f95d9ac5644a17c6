use churnwatch_core::{
    member::{Member, MemberStatus},
    portfolio::{self, ExecutiveSummary},
    risk::RiskCategory,
    EngineError,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn member(id: &str, status: MemberStatus, days: u32, premium: f64, ltv: f64) -> Member {
    Member {
        member_id: id.into(),
        group_id: format!("G{}", id.len()),
        status,
        cluster: 0,
        pets_covered: 2,
        virtual_care_visits: 4,
        tenure_days: 365,
        estimated_days_to_churn: days,
        monthly_premium: premium,
        lifetime_value: ltv,
        industry: "Technology".into(),
        location: "Denver".into(),
        enrollment_date: None,
    }
}

/// One member per category, LTV 100 / 200 / 300 / 400.
fn one_per_category() -> Vec<Member> {
    vec![
        member("I", MemberStatus::Active, 10, 10.0, 100.0),
        member("H", MemberStatus::Active, 60, 20.0, 200.0),
        member("M", MemberStatus::Active, 120, 30.0, 300.0),
        member("L", MemberStatus::Cancelled, 250, 40.0, 400.0),
    ]
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// No cancellations means a churn rate of exactly zero.
#[test]
fn churn_rate_zero_when_all_active() {
    let members = vec![
        member("A", MemberStatus::Active, 100, 10.0, 100.0),
        member("B", MemberStatus::Active, 200, 10.0, 100.0),
    ];
    assert_eq!(portfolio::churn_rate(&members), 0.0);
}

/// Empty input yields zero rather than NaN.
#[test]
fn churn_rate_zero_on_empty() {
    let members: Vec<Member> = Vec::new();
    let rate = portfolio::churn_rate(&members);
    assert_eq!(rate, 0.0, "got {rate}");
}

/// Averages over nothing are an explicit error.
#[test]
fn averages_over_empty_input_fail() {
    let members: Vec<Member> = Vec::new();
    assert!(matches!(
        portfolio::average_lifetime_value(&members),
        Err(EngineError::EmptyDataset { .. })
    ));
    assert!(matches!(
        portfolio::engagement_rate(&members),
        Err(EngineError::EmptyDataset { .. })
    ));
    assert!(ExecutiveSummary::build(&members).is_err());
}

/// Revenue at risk picks up only the requested categories.
#[test]
fn revenue_at_risk_by_category_set() {
    let members = one_per_category();
    assert_eq!(portfolio::revenue_at_risk(&members, &RiskCategory::AT_RISK), 300.0);
    assert_eq!(portfolio::revenue_at_risk(&members, &[RiskCategory::Low]), 400.0);
    assert_eq!(portfolio::revenue_at_risk(&members, &[]), 0.0);
    assert_eq!(portfolio::revenue_at_risk(&members, &RiskCategory::ALL), 1000.0);
}

/// MRR counts active members only; portfolio value counts everyone.
#[test]
fn mrr_excludes_cancelled_but_portfolio_value_does_not() {
    let members = one_per_category();
    assert_eq!(portfolio::monthly_recurring_revenue(&members), 60.0);
    assert_eq!(portfolio::portfolio_value(&members), 1000.0);
    assert_eq!(portfolio::active_value(&members), 600.0);
}

/// A quarter of the table cancelled gives a churn rate of 0.25.
#[test]
fn churn_rate_counts_cancelled_share() {
    let members = one_per_category();
    assert!((portfolio::churn_rate(&members) - 0.25).abs() < 1e-12);
}

/// The distribution always carries all four categories.
#[test]
fn distribution_and_at_risk_share() {
    let members = one_per_category();
    assert_eq!(portfolio::risk_distribution(&members), [1, 1, 1, 1]);
    assert_eq!(portfolio::at_risk_count(&members), 2);
    assert!((portfolio::at_risk_share(&members) - 0.5).abs() < 1e-12);
}

/// The top quarter of four members is the single 400 LTV member.
#[test]
fn revenue_concentration_top_quarter() {
    let members = one_per_category();
    let share = portfolio::revenue_concentration(&members, 0.25).unwrap();
    assert!((share - 0.4).abs() < 1e-12, "got {share}");
    assert!(portfolio::revenue_concentration(&members, 0.0).is_err());
    assert!(portfolio::revenue_concentration(&members, 1.5).is_err());
}

/// The executive summary agrees with the individual reductions.
#[test]
fn executive_summary_matches_reductions() {
    let members = one_per_category();
    let e = ExecutiveSummary::build(&members).unwrap();

    assert_eq!(e.total_members, 4);
    assert_eq!(e.active_members, 3);
    assert_eq!(e.at_risk_members, 2);
    assert_eq!(e.revenue_at_risk, 300.0);
    assert!((e.average_lifetime_value - 250.0).abs() < 1e-9);
    assert!((e.engagement_rate - 4.0).abs() < 1e-9);
    assert_eq!(e.monthly_recurring_revenue, 60.0);
}
