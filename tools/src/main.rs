//! churnwatch-runner: headless dashboard runner.
//!
//! Usage:
//!   churnwatch-runner --seed 42 --members 500
//!   churnwatch-runner --csv members.csv --json
//!   churnwatch-runner --data-dir ./data --export-dir ./out
//!   churnwatch-runner --cost 75 --success-rate 0.65 --targets 100

use anyhow::{Context, Result};
use churnwatch_core::{
    config::EngineConfig,
    engine::{AnalyticsEngine, PRIORITY_LIST_LIMIT},
    generator,
    loader,
    member::Member,
    report::{DashboardReport, RoiView},
    risk::RiskCategory,
    segment::SegmentSummary,
};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let json_mode = args.iter().any(|a| a == "--json");
    let csv_path = string_arg(&args, "--csv");
    let data_dir = string_arg(&args, "--data-dir");
    let export_dir = string_arg(&args, "--export-dir");

    let mut config = match data_dir {
        Some(dir) => EngineConfig::load(dir)?,
        None => EngineConfig::default(),
    };
    config.generator.member_count = parse_arg(&args, "--members", config.generator.member_count);
    config.roi.intervention_cost = parse_arg(&args, "--cost", config.roi.intervention_cost);
    config.roi.success_rate = parse_arg(&args, "--success-rate", config.roi.success_rate);
    config.roi.target_members = parse_arg(&args, "--targets", config.roi.target_members);
    config.validate()?;

    let table = match csv_path {
        Some(path) => loader::load_members(path, config.cluster_count)
            .with_context(|| format!("loading {path}"))?,
        None => generator::generate(&config.generator, config.cluster_count, seed)?,
    };
    let engine = AnalyticsEngine::new(config, table);
    let report = engine.report()?;

    if json_mode {
        println!("{}", report.to_json()?);
    } else {
        print_report(&engine, &report, csv_path, seed);
    }

    if let Some(dir) = export_dir {
        export(&engine, &report, Path::new(dir))?;
    }

    Ok(())
}

fn print_report(engine: &AnalyticsEngine, report: &DashboardReport, csv_path: Option<&str>, seed: u64) {
    let e = &report.executive;

    println!("churnwatch: member risk & revenue analytics");
    match csv_path {
        Some(path) => println!("  source:    {path}"),
        None => println!("  source:    generated (seed {seed})"),
    }
    println!(
        "  snapshot:  {} ({} clusters)",
        report.snapshot_id,
        engine.snapshot().cluster_count(),
    );
    println!();

    println!("=== EXECUTIVE SUMMARY ===");
    println!("  members:          {} ({} active) across {} groups", e.total_members, e.active_members, e.distinct_groups);
    println!("  at risk:          {} ({:.1}% of total)", e.at_risk_members, e.at_risk_share * 100.0);
    println!("  revenue at risk:  ${:.0}", e.revenue_at_risk);
    println!("  avg member value: ${:.0}", e.average_lifetime_value);
    println!("  engagement:       {:.1} visits/member", e.engagement_rate);
    println!("  churn rate:       {:.1}%", e.churn_rate * 100.0);
    println!("  MRR:              ${:.0}", e.monthly_recurring_revenue);
    println!("  portfolio value:  ${:.0} (active ${:.0})", e.portfolio_value, e.active_value);
    println!();

    println!("=== RISK DISTRIBUTION ===");
    for category in RiskCategory::ALL {
        println!("  {:<10} {}", category.as_str(), report.risk.count(category));
    }
    println!("  never used virtual care: {}", report.risk.zero_engagement);
    println!("  new members at risk:     {}", report.risk.new_members_at_risk);
    println!("  top 20% hold {:.0}% of lifetime value", report.risk.revenue_concentration * 100.0);
    if let Ok(preview) = engine.threshold_preview(&engine.config.risk_preview) {
        println!(
            "  preview @ {}/{}/{} days: {:?}",
            engine.config.risk_preview.immediate,
            engine.config.risk_preview.high,
            engine.config.risk_preview.medium,
            preview,
        );
    }
    println!();

    println!("=== SEGMENTS ===");
    println!("  cluster  members  avg_ltv  avg_visits  avg_tenure  churned");
    for s in &report.segments.summaries {
        println!(
            "  {:>7}  {:>7}  {:>7.0}  {:>10.1}  {:>10.0}  {:>6.1}%",
            s.cluster, s.count, s.mean_lifetime_value, s.mean_virtual_care_visits,
            s.mean_tenure_days, s.churn_fraction * 100.0,
        );
    }
    println!();

    println!("=== PRIORITY MEMBERS (top {}) ===", report.risk.priority_members.len().min(10));
    for m in report.risk.priority_members.iter().take(10) {
        println!(
            "  {}  {:<9} {:>3} days  ${:.0}  {}",
            m.member_id, m.risk_category().as_str(), m.estimated_days_to_churn, m.lifetime_value, m.group_id,
        );
    }
    println!();

    print_roi(&report.roi);
}

fn print_roi(roi: &RoiView) {
    let r = &roi.result;
    println!("=== RETENTION ROI ===");
    println!(
        "  scenario: ${:.2}/member, {:.0}% success, {} members",
        r.scenario.intervention_cost, r.scenario.success_rate * 100.0, r.scenario.target_members,
    );
    println!("  investment:       ${:.0}", r.total_cost);
    println!("  prevented churns: {:.1}", r.prevented_churns);
    println!("  revenue saved:    ${:.0}", r.revenue_saved);
    println!("  net benefit:      ${:.0}", r.net_benefit);
    println!("  ROI:              {:.2}x", r.roi_ratio);
    println!();
    println!("  period  baseline  retained  uplift");
    for p in &roi.decay {
        println!("  {:>6}  {:>8.0}  {:>8.0}  {:>6.0}", p.period, p.baseline, p.retained, p.uplift());
    }
}

// ── Export ─────────────────────────────────────────────────────────

fn export(engine: &AnalyticsEngine, report: &DashboardReport, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let table = engine.snapshot();

    write_members(&dir.join("members.csv"), table.members().iter())?;
    write_members(&dir.join("priority_members.csv"), report.risk.priority_members.iter())?;
    write_segments(&dir.join("segments.csv"), &report.segments.summaries)?;

    log::info!(
        "export: wrote members, priority_members (limit {PRIORITY_LIST_LIMIT}) and segments to {}",
        dir.display()
    );
    Ok(())
}

fn write_members<'a, I>(path: &Path, members: I) -> Result<()>
where
    I: Iterator<Item = &'a Member>,
{
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    loader::write_members(file, members)?;
    Ok(())
}

fn write_segments(path: &Path, summaries: &[SegmentSummary]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for s in summaries {
        wtr.serialize(s)?;
    }
    wtr.flush()?;
    Ok(())
}

// ── Args ───────────────────────────────────────────────────────────

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
