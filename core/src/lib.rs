//! churnwatch-core: member risk and revenue analytics.
//!
//! Pipeline: generator/loader → MemberTable → {segment, portfolio,
//! watchlist} → roi. Every analytic is a pure function of its inputs.

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod generator;
pub mod loader;
pub mod member;
pub mod portfolio;
pub mod report;
pub mod risk;
pub mod rng;
pub mod roi;
pub mod segment;
pub mod types;
pub mod watchlist;

pub use error::{EngineError, EngineResult};
pub use member::{Member, MemberStatus};
pub use risk::{classify, RiskCategory};
