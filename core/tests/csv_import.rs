use churnwatch_core::{
    config::EngineConfig,
    generator,
    loader::{load_members, load_members_from_reader, write_members},
    member::MemberStatus,
    risk::RiskCategory,
    EngineError,
};
use chrono::NaiveDate;
use std::path::PathBuf;

// ── Helpers ──────────────────────────────────────────────────────────────────

const HEADER: &str = "member_id,group_id,status,cluster,pets_covered,virtual_care_visits,\
tenure_days,estimated_days_to_churn,monthly_premium,lifetime_value,industry,location";

fn csv_with(rows: &[&str]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out
}

fn temp_csv(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("churnwatch-{}-{name}.csv", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

fn invalid_input_message<T: std::fmt::Debug>(result: Result<T, EngineError>) -> String {
    match result {
        Err(EngineError::InvalidInput(msg)) => msg,
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// A well-formed file loads every row with the declared values.
#[test]
fn loads_valid_file_from_disk() {
    let path = temp_csv(
        "valid",
        &csv_with(&[
            "M1,G1,active,0,2,5,400,20,45.50,1800.00,Healthcare,Seattle",
            "M2,G2,cancelled,3,1,0,60,250,30.00,600.00,Retail,Austin",
        ]),
    );
    let table = load_members(&path, 4).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(table.len(), 2);
    let m1 = table.get("M1").unwrap();
    assert_eq!(m1.status, MemberStatus::Active);
    assert_eq!(m1.risk_category(), RiskCategory::Immediate);
    assert_eq!(m1.monthly_premium, 45.5);

    let m2 = table.get("M2").unwrap();
    assert_eq!(m2.status, MemberStatus::Cancelled);
    assert_eq!(m2.risk_category(), RiskCategory::Low);
}

/// A missing file surfaces as an I/O error.
#[test]
fn missing_file_is_io_error() {
    let path = std::env::temp_dir().join("churnwatch-does-not-exist.csv");
    assert!(matches!(load_members(&path, 4), Err(EngineError::Io(_))));
}

/// Columns may come in any order and unknown columns are ignored.
#[test]
fn column_order_and_extra_columns() {
    let csv = "notes,location,industry,lifetime_value,monthly_premium,estimated_days_to_churn,\
tenure_days,virtual_care_visits,pets_covered,cluster,status,group_id,member_id\n\
vip,Boston,Finance,2500,80,45,700,9,3,0,active,G7,M9\n";
    let table = load_members_from_reader(csv.as_bytes(), 4).unwrap();
    let m = table.get("M9").unwrap();
    assert_eq!(m.group_id, "G7");
    assert_eq!(m.risk_category(), RiskCategory::High);
    assert_eq!(m.location, "Boston");
}

/// A stated risk_category that agrees with the horizon is accepted.
#[test]
fn agreeing_risk_category_accepted() {
    let csv = format!(
        "{HEADER},risk_category\nM1,G1,active,0,1,2,30,90,40,900,Retail,Austin,high\n"
    );
    let table = load_members_from_reader(csv.as_bytes(), 4).unwrap();
    assert_eq!(table.get("M1").unwrap().risk_category(), RiskCategory::High);
}

/// A stated risk_category that disagrees rejects the whole file.
#[test]
fn disagreeing_risk_category_rejected() {
    let csv = format!(
        "{HEADER},risk_category\n\
M1,G1,active,0,1,2,30,10,40,900,Retail,Austin,IMMEDIATE\n\
M2,G1,active,0,1,2,30,91,40,900,Retail,Austin,HIGH\n"
    );
    let msg = invalid_input_message(load_members_from_reader(csv.as_bytes(), 4));
    assert!(msg.contains("row 3") && msg.contains("disagrees"), "{msg}");
}

/// Clusters must lie inside the configured cluster count.
#[test]
fn unknown_cluster_rejected() {
    let csv = csv_with(&["M1,G1,active,7,1,2,30,40,40,900,Retail,Austin"]);
    let msg = invalid_input_message(load_members_from_reader(csv.as_bytes(), 4));
    assert!(msg.contains("cluster 7"), "{msg}");
}

/// Member ids are unique within a table.
#[test]
fn duplicate_member_rejected() {
    let csv = csv_with(&[
        "M1,G1,active,0,1,2,30,40,40,900,Retail,Austin",
        "M1,G2,active,1,1,2,30,40,40,900,Retail,Austin",
    ]);
    let msg = invalid_input_message(load_members_from_reader(csv.as_bytes(), 4));
    assert!(msg.contains("duplicate"), "{msg}");
}

/// Unknown status values are an input error naming the row.
#[test]
fn unknown_status_rejected() {
    let csv = csv_with(&["M1,G1,paused,0,1,2,30,40,40,900,Retail,Austin"]);
    let msg = invalid_input_message(load_members_from_reader(csv.as_bytes(), 4));
    assert!(msg.contains("row 2") && msg.contains("status"), "{msg}");
}

/// Negative money is rejected rather than clamped.
#[test]
fn negative_lifetime_value_rejected() {
    let csv = csv_with(&["M1,G1,active,0,1,2,30,40,40,-900,Retail,Austin"]);
    let msg = invalid_input_message(load_members_from_reader(csv.as_bytes(), 4));
    assert!(msg.contains("lifetime_value"), "{msg}");
}

/// enrollment_date is optional; when present it must be YYYY-MM-DD.
#[test]
fn enrollment_date_parsed_when_present() {
    let csv = format!(
        "{HEADER},enrollment_date\n\
M1,G1,active,0,1,2,30,40,40,900,Retail,Austin,2024-03-15\n\
M2,G1,active,0,1,2,30,40,40,900,Retail,Austin,\n"
    );
    let table = load_members_from_reader(csv.as_bytes(), 4).unwrap();
    assert_eq!(
        table.get("M1").unwrap().enrollment_date,
        NaiveDate::from_ymd_opt(2024, 3, 15)
    );
    assert_eq!(table.get("M2").unwrap().enrollment_date, None);

    let bad = format!("{HEADER},enrollment_date\nM1,G1,active,0,1,2,30,40,40,900,Retail,Austin,15/03/2024\n");
    let msg = invalid_input_message(load_members_from_reader(bad.as_bytes(), 4));
    assert!(msg.contains("enrollment_date"), "{msg}");
}

/// A header-only file is a valid, empty table.
#[test]
fn header_only_file_is_empty_table() {
    let csv = csv_with(&[]);
    let table = load_members_from_reader(csv.as_bytes(), 4).unwrap();
    assert!(table.is_empty());
}

/// A row with too few fields is an input error naming the row.
#[test]
fn short_row_rejected_with_row_number() {
    let csv = csv_with(&[
        "M1,G1,active,0,1,2,30,40,40,900,Retail,Austin",
        "M2,G1,active,0,1,2,30,40",
    ]);
    let msg = invalid_input_message(load_members_from_reader(csv.as_bytes(), 4));
    assert!(msg.contains("row 3"), "{msg}");
}

/// Bytes that are not UTF-8 are an input error, not a CSV failure.
#[test]
fn invalid_utf8_rejected_as_input_error() {
    let mut bytes = csv_with(&[]).into_bytes();
    bytes.extend_from_slice(b"M1,G1,active,0,1,2,30,40,40,900,Retail,\xff\xfe\n");
    let msg = invalid_input_message(load_members_from_reader(bytes.as_slice(), 4));
    assert!(msg.contains("row 2"), "{msg}");
}

/// Exported tables, risk_category column included, load back unchanged.
#[test]
fn export_loads_back_identically() {
    let config = EngineConfig::default_test();
    let original = generator::generate(&config.generator, config.cluster_count, 31).unwrap();

    let mut buf = Vec::new();
    write_members(&mut buf, original.members()).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.lines().next().unwrap().ends_with("enrollment_date,risk_category"));

    let reloaded = load_members_from_reader(text.as_bytes(), config.cluster_count).unwrap();
    assert_eq!(reloaded.members(), original.members());
    assert_ne!(reloaded.snapshot_id(), original.snapshot_id());
}
