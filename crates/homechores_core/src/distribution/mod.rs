//! Chore distribution algorithm.
//!
//! # Responsibility
//! - Expand recurring templates into one instance per required weekday.
//! - Pick one assignee per instance: age filter, capacity score, then the
//!   fairness ranking by pending load.
//!
//! # Invariants
//! - Fully deterministic: templates in creation order, weekdays in canonical
//!   order, candidates in family join order before ranking.
//!
//! Flow per run: authorize -> load members -> for each pending template ->
//! for each weekday -> eligible x capacity -> rank -> persist instance.

pub mod capacity;
pub mod eligibility;
pub mod expander;
pub mod fairness;
pub mod orchestrator;
pub mod report;

pub use orchestrator::{run_cleanup, run_distribution, DistributionError, Stores};
pub use report::{
    AssignedInstance, AssignmentFailure, CleanupReport, DistributionOutcome, DistributionReport,
    FailureReason,
};
