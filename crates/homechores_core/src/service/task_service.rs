//! Chore template and completion use-cases.
//!
//! # Invariants
//! - Only the family owner defines templates.
//! - Status toggles are allowed for the family owner, and for the assignee
//!   of an instance.

use crate::model::family::FamilyId;
use crate::model::member::MemberId;
use crate::model::task::{TaskId, TaskInstance, TaskStatus, TaskTemplate};
use crate::model::weekday::WeekdaySet;
use crate::repo::family_repo::FamilyRepository;
use crate::repo::task_repo::{InstanceListQuery, TaskRecord, TaskRepository};
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum TaskServiceError {
    FamilyNotFound(FamilyId),
    TaskNotFound(TaskId),
    NotOwner { family: FamilyId, actor: MemberId },
    /// Actor is neither the owner nor the instance assignee.
    NotAllowed { task: TaskId, actor: MemberId },
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FamilyNotFound(id) => write!(f, "family not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::NotOwner { family, actor } => {
                write!(f, "member {actor} is not the owner of family {family}")
            }
            Self::NotAllowed { task, actor } => {
                write!(f, "member {actor} may not change task {task}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Input for a new recurring chore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTemplate {
    pub family_uuid: FamilyId,
    pub name: String,
    pub required_minutes: u32,
    pub min_age: Option<u32>,
    pub weekdays: WeekdaySet,
}

pub struct TaskService<F: FamilyRepository, T: TaskRepository> {
    families: F,
    tasks: T,
}

impl<F: FamilyRepository, T: TaskRepository> TaskService<F, T> {
    pub fn new(families: F, tasks: T) -> Self {
        Self { families, tasks }
    }

    /// Creates a pending template. `actor` must own the family.
    pub fn create_template(
        &self,
        actor: MemberId,
        request: NewTemplate,
    ) -> Result<TaskTemplate, TaskServiceError> {
        self.require_owner(request.family_uuid, actor)?;

        let template = TaskTemplate::new(
            request.family_uuid,
            request.name,
            request.required_minutes,
            request.min_age,
            request.weekdays,
        );
        let id = self.tasks.create_template(&template)?;
        info!(
            "event=template_create module=service status=ok family_id={} task_id={} weekdays={}",
            template.family_uuid,
            id,
            template.weekdays.len()
        );

        match self.tasks.get_task(id)? {
            Some(TaskRecord::Template(stored)) => Ok(stored),
            _ => Err(TaskServiceError::TaskNotFound(id)),
        }
    }

    /// Templates of a family in creation order.
    pub fn list_templates(&self, family: FamilyId) -> Result<Vec<TaskTemplate>, TaskServiceError> {
        Ok(self.tasks.list_templates(family, None)?)
    }

    pub fn list_instances(
        &self,
        query: &InstanceListQuery,
    ) -> Result<Vec<TaskInstance>, TaskServiceError> {
        Ok(self.tasks.list_instances(query)?)
    }

    /// Flips a task between pending and done; returns the new status.
    pub fn toggle_status(
        &self,
        actor: MemberId,
        task: TaskId,
    ) -> Result<TaskStatus, TaskServiceError> {
        let record = self
            .tasks
            .get_task(task)?
            .ok_or(TaskServiceError::TaskNotFound(task))?;
        let family = self
            .families
            .get_family(record.family_uuid())?
            .ok_or(TaskServiceError::FamilyNotFound(record.family_uuid()))?;

        let allowed = family.is_owned_by(actor)
            || matches!(&record, TaskRecord::Instance(instance) if instance.assignee_uuid == Some(actor));
        if !allowed {
            return Err(TaskServiceError::NotAllowed { task, actor });
        }

        let next = record.status().toggled();
        self.tasks.set_status(task, next)?;
        info!("event=task_toggle module=service status=ok task_id={task} new_status={next:?}");
        Ok(next)
    }

    fn require_owner(&self, family: FamilyId, actor: MemberId) -> Result<(), TaskServiceError> {
        let found = self
            .families
            .get_family(family)?
            .ok_or(TaskServiceError::FamilyNotFound(family))?;
        if !found.is_owned_by(actor) {
            return Err(TaskServiceError::NotOwner { family, actor });
        }
        Ok(())
    }
}
