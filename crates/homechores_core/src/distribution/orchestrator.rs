//! Distribution and cleanup runs over repository contracts.
//!
//! # Responsibility
//! - Authorize the acting member against the family owner.
//! - Walk pending templates in creation order and expand each one.
//! - Purge pending instances and re-arm templates for the next cycle.
//!
//! # Invariants
//! - Authorization and the member check happen before any write.
//! - Repository errors abort the run; the caller owns the transaction and
//!   rolls it back. Per-day assignment failures are report data.
//! - A processed template is marked done; cleanup sets it back to pending.

use crate::distribution::expander::{assign_weekday, expand, DayOutcome};
use crate::distribution::report::{CleanupReport, DistributionOutcome, DistributionReport};
use crate::model::family::{Family, FamilyId};
use crate::model::member::MemberId;
use crate::model::task::TaskStatus;
use crate::model::weekday::Weekday;
use crate::repo::availability_repo::AvailabilityRepository;
use crate::repo::family_repo::FamilyRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Repositories a run reads from and writes to, all bound to one
/// transaction by the caller.
pub struct Stores<'a> {
    pub families: &'a dyn FamilyRepository,
    pub availability: &'a dyn AvailabilityRepository,
    pub tasks: &'a dyn TaskRepository,
}

/// Fatal errors of distribution and cleanup runs.
#[derive(Debug)]
pub enum DistributionError {
    /// Acting member is not the family owner.
    Unauthorized { family: FamilyId, actor: MemberId },
    FamilyNotFound(FamilyId),
    /// The family member set is empty.
    NoMembers(FamilyId),
    /// Store failure; nothing from the run is kept.
    Repo(RepoError),
}

impl Display for DistributionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized { family, actor } => write!(
                f,
                "member {actor} is not the owner of family {family}"
            ),
            Self::FamilyNotFound(id) => write!(f, "family not found: {id}"),
            Self::NoMembers(id) => write!(f, "family {id} has no members to assign chores to"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DistributionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DistributionError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for DistributionError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Loads `family_id` and checks that `actor` owns it.
pub fn authorize_owner(
    families: &dyn FamilyRepository,
    family_id: FamilyId,
    actor: MemberId,
) -> Result<Family, DistributionError> {
    let family = families
        .get_family(family_id)?
        .ok_or(DistributionError::FamilyNotFound(family_id))?;
    if !family.is_owned_by(actor) {
        warn!(
            "event=authorize module=distribution status=denied family_id={} actor_id={}",
            family_id, actor
        );
        return Err(DistributionError::Unauthorized {
            family: family_id,
            actor,
        });
    }
    Ok(family)
}

/// Assigns every pending template of a family for the coming week.
pub fn run_distribution(
    stores: &Stores<'_>,
    family_id: FamilyId,
    actor: MemberId,
    today: NaiveDate,
) -> Result<DistributionReport, DistributionError> {
    authorize_owner(stores.families, family_id, actor)?;

    let members = stores.families.list_members(family_id)?;
    if members.is_empty() {
        warn!(
            "event=distribute module=distribution status=aborted family_id={} error_code=no_members",
            family_id
        );
        return Err(DistributionError::NoMembers(family_id));
    }

    let templates = stores
        .tasks
        .list_templates(family_id, Some(TaskStatus::Pending))?;
    let mut report = DistributionReport::empty(family_id);
    if templates.is_empty() {
        info!(
            "event=distribute module=distribution status=ok family_id={} outcome=nothing_to_distribute",
            family_id
        );
        return Ok(report);
    }

    report.outcome = DistributionOutcome::Completed;
    for template in &templates {
        for weekday in expand(template) {
            match assign_weekday(stores, &members, template, weekday, today)? {
                DayOutcome::Assigned(assigned) => report.assigned.push(assigned),
                DayOutcome::Failed(failure) => {
                    warn!(
                        "event=distribute_day module=distribution status=unassigned template_id={} weekday={} reason={:?}",
                        template.uuid, weekday, failure.reason
                    );
                    report.failures.push(failure);
                }
            }
        }
        stores.tasks.set_status(template.uuid, TaskStatus::Done)?;
        report.templates_processed += 1;
    }

    info!(
        "event=distribute module=distribution status=ok family_id={} templates={} members={} assigned={} failures={}",
        family_id,
        report.templates_processed,
        members.len(),
        report.assigned_count(),
        report.failures.len()
    );
    Ok(report)
}

/// Deletes pending instances (optionally one weekday's) and resets all
/// templates of the family to pending.
pub fn run_cleanup(
    stores: &Stores<'_>,
    family_id: FamilyId,
    actor: MemberId,
    day_filter: Option<Weekday>,
) -> Result<CleanupReport, DistributionError> {
    authorize_owner(stores.families, family_id, actor)?;

    let deleted_count = stores.tasks.delete_pending_instances(family_id, day_filter)?;
    let reset_template_count = stores.tasks.reset_templates(family_id)?;

    info!(
        "event=cleanup module=distribution status=ok family_id={} day_filter={} deleted={} templates_reset={}",
        family_id,
        day_filter.map_or("all", Weekday::code),
        deleted_count,
        reset_template_count
    );
    Ok(CleanupReport {
        family_uuid: family_id,
        day_filter,
        deleted_count,
        reset_template_count,
    })
}
