//! Core domain logic for HomeChores.
//! This crate is the single source of truth for household and chore invariants.

pub mod db;
pub mod distribution;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use distribution::{
    AssignedInstance, AssignmentFailure, CleanupReport, DistributionError, DistributionOutcome,
    DistributionReport, FailureReason,
};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::availability::{AvailabilityBlock, AvailabilityBlockId};
pub use model::family::{Family, FamilyId};
pub use model::member::{Member, MemberId, Profile};
pub use model::task::{TaskId, TaskInstance, TaskStatus, TaskTemplate};
pub use model::weekday::{Weekday, WeekdayParseError, WeekdaySet};
pub use model::ValidationError;
pub use repo::{RepoError, RepoResult};
pub use service::availability_service::AvailabilityService;
pub use service::distribution_service::DistributionService;
pub use service::family_service::{FamilyService, FamilyServiceError};
pub use service::member_service::{MemberService, MemberServiceError};
pub use service::task_service::{NewTemplate, TaskService, TaskServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
