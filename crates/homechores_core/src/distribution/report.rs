//! Run summaries returned to callers.

use crate::model::family::FamilyId;
use crate::model::member::MemberId;
use crate::model::task::TaskId;
use crate::model::weekday::Weekday;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Why a (template, weekday) pair got no instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Every member is below the template's minimum age.
    NoMemberOldEnough,
    /// Some members are old enough but none has enough free time that day.
    NoMemberAvailable,
}

/// Non-fatal failure for one (template, weekday) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentFailure {
    pub template_uuid: TaskId,
    pub template_name: String,
    pub weekday: Weekday,
    pub required_minutes: u32,
    pub min_age: Option<u32>,
    pub reason: FailureReason,
}

impl Display for AssignmentFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.reason {
            FailureReason::NoMemberOldEnough => write!(
                f,
                "{} ({}): no member is at least {} years old",
                self.template_name,
                self.weekday,
                self.min_age.unwrap_or_default()
            ),
            FailureReason::NoMemberAvailable => write!(
                f,
                "{} ({}): no eligible member has {} free minutes that day",
                self.template_name, self.weekday, self.required_minutes
            ),
        }
    }
}

/// Instance created by a distribution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedInstance {
    pub task_uuid: TaskId,
    pub template_uuid: TaskId,
    pub name: String,
    pub weekday: Weekday,
    pub assignee_uuid: MemberId,
    pub capacity: u32,
    pub load_before: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionOutcome {
    /// At least one pending template was processed.
    Completed,
    /// The family had no pending templates.
    NothingToDistribute,
}

/// Summary of one distribution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionReport {
    pub family_uuid: FamilyId,
    pub outcome: DistributionOutcome,
    pub templates_processed: usize,
    pub assigned: Vec<AssignedInstance>,
    pub failures: Vec<AssignmentFailure>,
}

impl DistributionReport {
    pub(crate) fn empty(family_uuid: FamilyId) -> Self {
        Self {
            family_uuid,
            outcome: DistributionOutcome::NothingToDistribute,
            templates_processed: 0,
            assigned: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }

    /// Human-readable failure lines, one per unassignable pair.
    pub fn failure_messages(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }
}

/// Summary of one cleanup run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub family_uuid: FamilyId,
    pub day_filter: Option<Weekday>,
    pub deleted_count: usize,
    pub reset_template_count: usize,
}

#[cfg(test)]
mod tests {
    use super::{AssignmentFailure, FailureReason};
    use crate::model::weekday::Weekday;
    use uuid::Uuid;

    #[test]
    fn failure_messages_name_template_day_and_cause() {
        let mut failure = AssignmentFailure {
            template_uuid: Uuid::nil(),
            template_name: "Dishes".to_string(),
            weekday: Weekday::Wednesday,
            required_minutes: 30,
            min_age: Some(8),
            reason: FailureReason::NoMemberAvailable,
        };
        assert_eq!(
            failure.to_string(),
            "Dishes (WED): no eligible member has 30 free minutes that day"
        );

        failure.reason = FailureReason::NoMemberOldEnough;
        assert_eq!(
            failure.to_string(),
            "Dishes (WED): no member is at least 8 years old"
        );
    }
}
