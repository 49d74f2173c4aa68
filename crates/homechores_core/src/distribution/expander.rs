//! Template expansion into per-weekday instances.
//!
//! # Responsibility
//! - Enumerate the weekdays a template requires, in canonical order.
//! - For one (template, weekday) pair, filter members by age, score their
//!   capacity, rank them, and persist the winner's instance.
//!
//! # Invariants
//! - Each weekday is resolved independently; one failing day never blocks
//!   another.
//! - No instance is written for a pair without a winner.

use crate::distribution::capacity::capacity;
use crate::distribution::eligibility::is_eligible;
use crate::distribution::fairness::{pick_winner, Candidate};
use crate::distribution::orchestrator::Stores;
use crate::distribution::report::{AssignedInstance, AssignmentFailure, FailureReason};
use crate::model::member::Member;
use crate::model::task::TaskTemplate;
use crate::model::weekday::Weekday;
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::debug;

/// Result of resolving one (template, weekday) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayOutcome {
    Assigned(AssignedInstance),
    Failed(AssignmentFailure),
}

/// Weekdays required by `template`, Monday first.
pub fn expand(template: &TaskTemplate) -> Vec<Weekday> {
    template.weekdays.iter().collect()
}

/// Resolves and persists the instance of `template` on `weekday`.
///
/// `members` is the candidate pool in family join order.
pub fn assign_weekday(
    stores: &Stores<'_>,
    members: &[Member],
    template: &TaskTemplate,
    weekday: Weekday,
    today: NaiveDate,
) -> RepoResult<DayOutcome> {
    let mut any_old_enough = false;
    let mut candidates = Vec::new();

    for member in members {
        if !is_eligible(member, template, today) {
            continue;
        }
        any_old_enough = true;

        let score = capacity(
            stores.availability,
            member.uuid,
            weekday,
            template.required_minutes,
        )?;
        if score == 0 {
            continue;
        }

        let load = stores.tasks.count_pending_instances_for(member.uuid)?;
        candidates.push(Candidate {
            member_uuid: member.uuid,
            capacity: score,
            load,
        });
    }

    debug!(
        "event=distribution_candidates module=distribution template_id={} weekday={} candidates={}",
        template.uuid,
        weekday,
        candidates.len()
    );

    let Some(winner) = pick_winner(candidates) else {
        let reason = if any_old_enough {
            FailureReason::NoMemberAvailable
        } else {
            FailureReason::NoMemberOldEnough
        };
        return Ok(DayOutcome::Failed(AssignmentFailure {
            template_uuid: template.uuid,
            template_name: template.name.clone(),
            weekday,
            required_minutes: template.required_minutes,
            min_age: template.min_age,
            reason,
        }));
    };

    let instance = template.instantiate(weekday, winner.member_uuid);
    stores.tasks.create_instance(&instance)?;

    Ok(DayOutcome::Assigned(AssignedInstance {
        task_uuid: instance.uuid,
        template_uuid: template.uuid,
        name: instance.name,
        weekday,
        assignee_uuid: winner.member_uuid,
        capacity: winner.capacity,
        load_before: winner.load,
    }))
}
