//! Chore templates and chore instances.
//!
//! # Responsibility
//! - Model recurring chore definitions (templates) and the concrete,
//!   assignable occurrences generated from them (instances).
//! - Own the instance naming scheme that embeds the weekday tag.
//!
//! # Invariants
//! - Templates carry a weekday set; instances carry exactly one weekday.
//! - Instances are snapshots: minutes and minimum age are copied from the
//!   template at creation and never follow later template edits.
//! - Instance names end with ` (CODE)`, e.g. `Dishes (MON)`.

use crate::model::family::FamilyId;
use crate::model::member::MemberId;
use crate::model::weekday::{Weekday, WeekdaySet};
use crate::model::{require_text, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;

static WEEKDAY_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([A-Za-z]{3})\)\s*$").expect("valid weekday tag regex"));

/// Lifecycle state shared by templates and instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Done,
}

impl TaskStatus {
    /// Pending <-> done.
    pub fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Done,
            Self::Done => Self::Pending,
        }
    }
}

/// Recurring chore definition. Not assignable by itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub uuid: TaskId,
    pub family_uuid: FamilyId,
    pub name: String,
    pub required_minutes: u32,
    pub min_age: Option<u32>,
    pub weekdays: WeekdaySet,
    pub status: TaskStatus,
    /// Epoch ms, assigned by storage.
    pub created_at: i64,
}

impl TaskTemplate {
    /// Creates a pending template with a generated ID.
    pub fn new(
        family_uuid: FamilyId,
        name: impl Into<String>,
        required_minutes: u32,
        min_age: Option<u32>,
        weekdays: WeekdaySet,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            family_uuid,
            name: name.into().trim().to_string(),
            required_minutes,
            min_age,
            weekdays,
            status: TaskStatus::Pending,
            created_at: 0,
        }
    }

    /// Checks write-time rules.
    ///
    /// An empty weekday set is allowed; such a template never yields
    /// instances.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("task name", &self.name)?;
        if self.required_minutes == 0 {
            return Err(ValidationError::NonPositiveMinutes(0));
        }
        if self.min_age == Some(0) {
            return Err(ValidationError::NonPositiveMinimumAge(0));
        }
        Ok(())
    }

    /// Builds the pending instance for `weekday`, assigned to `assignee`.
    pub fn instantiate(&self, weekday: Weekday, assignee: MemberId) -> TaskInstance {
        TaskInstance {
            uuid: Uuid::new_v4(),
            family_uuid: self.family_uuid,
            template_uuid: Some(self.uuid),
            name: instance_name(&self.name, weekday),
            weekday,
            assignee_uuid: Some(assignee),
            required_minutes: self.required_minutes,
            min_age: self.min_age,
            status: TaskStatus::Pending,
            created_at: 0,
        }
    }
}

/// One concrete occurrence of a template on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInstance {
    pub uuid: TaskId,
    pub family_uuid: FamilyId,
    /// Originating template; `None` once the template row is gone.
    pub template_uuid: Option<TaskId>,
    pub name: String,
    /// Parsed from the name tag on read.
    pub weekday: Weekday,
    /// `None` means unassigned.
    pub assignee_uuid: Option<MemberId>,
    pub required_minutes: u32,
    pub min_age: Option<u32>,
    pub status: TaskStatus,
    /// Epoch ms, assigned by storage.
    pub created_at: i64,
}

/// Formats `"{template} ({CODE})"`.
pub fn instance_name(template_name: &str, weekday: Weekday) -> String {
    format!("{} ({})", template_name.trim(), weekday.code())
}

/// Suffix that identifies instances of `weekday` by name.
pub fn weekday_tag(weekday: Weekday) -> String {
    format!("({})", weekday.code())
}

/// Extracts the trailing weekday tag from an instance name.
pub fn parse_weekday_tag(name: &str) -> Option<Weekday> {
    let captures = WEEKDAY_TAG_RE.captures(name)?;
    Weekday::parse_code(captures.get(1)?.as_str()).ok()
}

#[cfg(test)]
mod tests {
    use super::{instance_name, parse_weekday_tag, TaskStatus, TaskTemplate};
    use crate::model::weekday::{Weekday, WeekdaySet};
    use uuid::Uuid;

    #[test]
    fn instance_name_round_trips_through_tag_parser() {
        let name = instance_name(" Dishes ", Weekday::Wednesday);
        assert_eq!(name, "Dishes (WED)");
        assert_eq!(parse_weekday_tag(&name), Some(Weekday::Wednesday));
    }

    #[test]
    fn tag_parser_ignores_untagged_and_unknown_suffixes() {
        assert_eq!(parse_weekday_tag("Dishes"), None);
        assert_eq!(parse_weekday_tag("Dishes (XYZ)"), None);
        assert_eq!(parse_weekday_tag("Laundry (sat) "), Some(Weekday::Saturday));
    }

    #[test]
    fn instantiate_copies_template_snapshot() {
        let weekdays = WeekdaySet::parse_delimited("MON,WED").unwrap();
        let template = TaskTemplate::new(Uuid::new_v4(), "Trash", 15, Some(10), weekdays);
        let assignee = Uuid::new_v4();

        let instance = template.instantiate(Weekday::Monday, assignee);
        assert_eq!(instance.name, "Trash (MON)");
        assert_eq!(instance.required_minutes, 15);
        assert_eq!(instance.min_age, Some(10));
        assert_eq!(instance.assignee_uuid, Some(assignee));
        assert_eq!(instance.template_uuid, Some(template.uuid));
        assert_eq!(instance.status, TaskStatus::Pending);
    }

    #[test]
    fn validate_rejects_zero_minutes_and_zero_min_age() {
        let family = Uuid::new_v4();
        let zero_minutes = TaskTemplate::new(family, "Mop", 0, None, WeekdaySet::new());
        let zero_age = TaskTemplate::new(family, "Mop", 20, Some(0), WeekdaySet::new());
        assert!(zero_minutes.validate().is_err());
        assert!(zero_age.validate().is_err());
        assert!(TaskTemplate::new(family, "Mop", 20, None, WeekdaySet::new())
            .validate()
            .is_ok());
    }
}
