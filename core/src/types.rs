//! Shared primitive types used across the engine.

/// A stable, unique identifier for a member.
pub type MemberId = String;

/// A billing/account group identifier.
pub type GroupId = String;

/// A pre-assigned segment label. Small and fixed per dataset.
pub type ClusterId = u32;
