//! Member table snapshots.
//!
//! RULE: A MemberTable is validated once at construction and never
//! mutated afterwards. An upload builds a new table and swaps it into
//! the DatasetHandle; readers holding the old Arc keep a consistent view.

use crate::{
    error::{EngineError, EngineResult},
    member::Member,
    types::ClusterId,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct MemberTable {
    snapshot_id:   String,
    cluster_count: u32,
    members:       Vec<Member>,
    index:         HashMap<String, usize>,
}

impl MemberTable {
    /// Validate and wrap a set of members.
    ///
    /// Rejects empty or duplicate ids, clusters outside `0..cluster_count`,
    /// and money fields that are negative or not finite.
    pub fn new(members: Vec<Member>, cluster_count: u32) -> EngineResult<Self> {
        let mut index = HashMap::with_capacity(members.len());

        for (i, m) in members.iter().enumerate() {
            if m.member_id.trim().is_empty() {
                return Err(EngineError::invalid_input(format!(
                    "row {}: member_id is empty",
                    i + 1
                )));
            }
            if m.cluster >= cluster_count {
                return Err(EngineError::invalid_input(format!(
                    "member {}: unknown cluster {} (valid: 0..{cluster_count})",
                    m.member_id, m.cluster
                )));
            }
            check_amount(&m.member_id, "monthly_premium", m.monthly_premium)?;
            check_amount(&m.member_id, "lifetime_value", m.lifetime_value)?;

            if index.insert(m.member_id.clone(), i).is_some() {
                return Err(EngineError::invalid_input(format!(
                    "duplicate member_id '{}'",
                    m.member_id
                )));
            }
        }

        Ok(Self {
            snapshot_id: Uuid::new_v4().to_string(),
            cluster_count,
            members,
            index,
        })
    }

    pub fn snapshot_id(&self) -> &str { &self.snapshot_id }
    pub fn cluster_count(&self) -> u32 { self.cluster_count }
    pub fn members(&self) -> &[Member] { &self.members }
    pub fn len(&self) -> usize { self.members.len() }
    pub fn is_empty(&self) -> bool { self.members.is_empty() }

    pub fn get(&self, member_id: &str) -> Option<&Member> {
        self.index.get(member_id).map(|&i| &self.members[i])
    }

    /// Like `get`, but an unknown id is an input error.
    pub fn require(&self, member_id: &str) -> EngineResult<&Member> {
        self.get(member_id).ok_or_else(|| {
            EngineError::invalid_input(format!("unknown member_id '{member_id}'"))
        })
    }

    // ── Filters ────────────────────────────────────────────────

    pub fn filter<F>(&self, pred: F) -> Vec<&Member>
    where
        F: Fn(&Member) -> bool,
    {
        self.members.iter().filter(|m| pred(m)).collect()
    }

    pub fn active(&self) -> Vec<&Member> {
        self.filter(|m| m.is_active())
    }

    pub fn in_cluster(&self, cluster: ClusterId) -> Vec<&Member> {
        self.filter(|m| m.cluster == cluster)
    }
}

fn check_amount(member_id: &str, field: &str, value: f64) -> EngineResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::invalid_input(format!(
            "member {member_id}: {field} must be a non-negative amount, got {value}"
        )));
    }
    Ok(())
}

/// Shared, swappable reference to the current member table.
///
/// Each request should call `snapshot()` once and compute against that
/// Arc so it never observes a half-replaced dataset.
pub struct DatasetHandle {
    current: RwLock<Arc<MemberTable>>,
}

impl DatasetHandle {
    pub fn new(table: MemberTable) -> Self {
        Self { current: RwLock::new(Arc::new(table)) }
    }

    pub fn snapshot(&self) -> Arc<MemberTable> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Swap in a new table. Returns the snapshot it replaced.
    pub fn replace(&self, table: MemberTable) -> Arc<MemberTable> {
        let next = Arc::new(table);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let previous = std::mem::replace(&mut *guard, next);
        log::info!(
            "dataset: snapshot {} replaced by {} ({} members)",
            previous.snapshot_id(),
            guard.snapshot_id(),
            guard.len(),
        );
        previous
    }
}
