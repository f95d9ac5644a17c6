//! CSV import and export of member tables.
//!
//! RULE: Nothing is silently defaulted. A missing required column, an
//! unparseable cell, or a risk_category that disagrees with
//! estimated_days_to_churn rejects the whole file.

use crate::{
    dataset::MemberTable,
    error::{EngineError, EngineResult},
    member::{Member, MemberStatus},
    risk::{classify_signed, RiskCategory},
};
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

pub const REQUIRED_COLUMNS: [&str; 12] = [
    "member_id",
    "group_id",
    "status",
    "cluster",
    "pets_covered",
    "virtual_care_visits",
    "tenure_days",
    "estimated_days_to_churn",
    "monthly_premium",
    "lifetime_value",
    "industry",
    "location",
];

pub const OPTIONAL_COLUMNS: [&str; 2] = ["enrollment_date", "risk_category"];

pub fn load_members(path: impl AsRef<Path>, cluster_count: u32) -> EngineResult<MemberTable> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let table = load_members_from_reader(file, cluster_count)?;
    log::info!(
        "loader: {} members from {} (snapshot={})",
        table.len(),
        path.display(),
        table.snapshot_id(),
    );
    Ok(table)
}

pub fn load_members_from_reader<R: Read>(reader: R, cluster_count: u32) -> EngineResult<MemberTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| malformed(e, "header"))?;
    let columns = ColumnIndex::from_headers(headers)?;

    let mut members = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        // Header is line 1; first data row is row 2.
        let row = i + 2;
        let record = record.map_err(|e| malformed(e, &format!("row {row}")))?;
        members.push(columns.parse_row(&record, row)?);
    }
    log::debug!("loader: parsed {} rows", members.len());

    MemberTable::new(members, cluster_count)
}

/// Write members with the required columns followed by the optional
/// ones. The output loads back through `load_members_from_reader`.
pub fn write_members<'a, W, I>(writer: W, members: I) -> EngineResult<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Member>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(REQUIRED_COLUMNS.iter().chain(OPTIONAL_COLUMNS.iter()).copied())?;

    for m in members {
        wtr.write_record([
            m.member_id.clone(),
            m.group_id.clone(),
            m.status.as_str().to_string(),
            m.cluster.to_string(),
            m.pets_covered.to_string(),
            m.virtual_care_visits.to_string(),
            m.tenure_days.to_string(),
            m.estimated_days_to_churn.to_string(),
            format!("{:.2}", m.monthly_premium),
            format!("{:.2}", m.lifetime_value),
            m.industry.clone(),
            m.location.clone(),
            m.enrollment_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            m.risk_category().as_str().to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Ragged rows and bad encoding are input errors; read failures stay I/O.
fn malformed(err: csv::Error, location: &str) -> EngineError {
    if err.is_io_error() {
        return EngineError::Csv(err);
    }
    EngineError::invalid_input(format!("{location}: {err}"))
}

struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> EngineResult<Self> {
        let mut positions = HashMap::new();
        for name in REQUIRED_COLUMNS.iter().chain(OPTIONAL_COLUMNS.iter()) {
            if let Some(pos) = headers.iter().position(|h| h.eq_ignore_ascii_case(name)) {
                positions.insert(*name, pos);
            }
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !positions.contains_key(*c))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::invalid_input(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }
        Ok(Self { positions })
    }

    fn cell<'r>(&self, record: &'r StringRecord, column: &'static str) -> Option<&'r str> {
        self.positions
            .get(column)
            .and_then(|&pos| record.get(pos))
            .filter(|v| !v.is_empty())
    }

    fn required<'r>(&self, record: &'r StringRecord, column: &'static str, row: usize) -> EngineResult<&'r str> {
        self.cell(record, column).ok_or_else(|| {
            EngineError::invalid_input(format!("row {row}, column {column}: value is missing"))
        })
    }

    fn count(&self, record: &StringRecord, column: &'static str, row: usize) -> EngineResult<u32> {
        let raw = self.required(record, column, row)?;
        let value: i64 = raw.parse().map_err(|_| {
            EngineError::invalid_input(format!("row {row}, column {column}: '{raw}' is not an integer"))
        })?;
        u32::try_from(value).map_err(|_| {
            EngineError::invalid_input(format!(
                "row {row}, column {column}: {value} must be a non-negative integer"
            ))
        })
    }

    fn amount(&self, record: &StringRecord, column: &'static str, row: usize) -> EngineResult<f64> {
        let raw = self.required(record, column, row)?;
        let value: f64 = raw.parse().map_err(|_| {
            EngineError::invalid_input(format!("row {row}, column {column}: '{raw}' is not a number"))
        })?;
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::invalid_input(format!(
                "row {row}, column {column}: {value} must be a non-negative amount"
            )));
        }
        Ok(value)
    }

    fn parse_row(&self, record: &StringRecord, row: usize) -> EngineResult<Member> {
        let status: MemberStatus = self
            .required(record, "status", row)?
            .parse()
            .map_err(|e| EngineError::invalid_input(format!("row {row}, column status: {e}")))?;

        let days_raw = self.required(record, "estimated_days_to_churn", row)?;
        let days: i64 = days_raw.parse().map_err(|_| {
            EngineError::invalid_input(format!(
                "row {row}, column estimated_days_to_churn: '{days_raw}' is not an integer"
            ))
        })?;
        let derived = classify_signed(days)
            .map_err(|e| EngineError::invalid_input(format!("row {row}: {e}")))?;

        if let Some(stated) = self.cell(record, "risk_category") {
            let stated: RiskCategory = stated
                .parse()
                .map_err(|e| EngineError::invalid_input(format!("row {row}, column risk_category: {e}")))?;
            if stated != derived {
                return Err(EngineError::invalid_input(format!(
                    "row {row}: risk_category {stated} disagrees with estimated_days_to_churn {days} ({derived})"
                )));
            }
        }

        let enrollment_date = match self.cell(record, "enrollment_date") {
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                EngineError::invalid_input(format!(
                    "row {row}, column enrollment_date: '{raw}' is not a YYYY-MM-DD date"
                ))
            })?),
            None => None,
        };

        Ok(Member {
            member_id: self.required(record, "member_id", row)?.to_string(),
            group_id: self.required(record, "group_id", row)?.to_string(),
            status,
            cluster: self.count(record, "cluster", row)?,
            pets_covered: self.count(record, "pets_covered", row)?,
            virtual_care_visits: self.count(record, "virtual_care_visits", row)?,
            tenure_days: self.count(record, "tenure_days", row)?,
            // classify_signed already proved the value fits.
            estimated_days_to_churn: days as u32,
            monthly_premium: self.amount(record, "monthly_premium", row)?,
            lifetime_value: self.amount(record, "lifetime_value", row)?,
            industry: self.required(record, "industry", row)?.to_string(),
            location: self.required(record, "location", row)?.to_string(),
            enrollment_date,
        })
    }
}
