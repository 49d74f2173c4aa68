//! Chore repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist templates and instances in the shared `tasks` table.
//! - Provide the bulk filters used by distribution and cleanup.
//!
//! # Invariants
//! - `kind` decides template vs instance; instances always store an empty
//!   `recurrence`.
//! - Template listing is ordered by creation: `created_at ASC, rowid ASC`.
//! - Load counts only pending instances; templates never count.

use crate::model::family::FamilyId;
use crate::model::member::MemberId;
use crate::model::task::{
    parse_weekday_tag, weekday_tag, TaskId, TaskInstance, TaskStatus, TaskTemplate,
};
use crate::model::weekday::{Weekday, WeekdaySet};
use crate::repo::{
    ensure_schema_ready, parse_u32, parse_optional_uuid, parse_uuid, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    family_uuid,
    kind,
    template_uuid,
    name,
    recurrence,
    assignee_uuid,
    required_minutes,
    min_age,
    status,
    created_at
FROM tasks";

const KIND_TEMPLATE: &str = "template";
const KIND_INSTANCE: &str = "instance";

/// One row of the `tasks` table in its typed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRecord {
    Template(TaskTemplate),
    Instance(TaskInstance),
}

impl TaskRecord {
    pub fn family_uuid(&self) -> FamilyId {
        match self {
            Self::Template(template) => template.family_uuid,
            Self::Instance(instance) => instance.family_uuid,
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self {
            Self::Template(template) => template.status,
            Self::Instance(instance) => instance.status,
        }
    }
}

/// Filter options for listing instances of one family.
#[derive(Debug, Clone)]
pub struct InstanceListQuery {
    pub family_uuid: FamilyId,
    pub status: Option<TaskStatus>,
    pub assignee_uuid: Option<MemberId>,
    pub weekday: Option<Weekday>,
}

impl InstanceListQuery {
    pub fn for_family(family_uuid: FamilyId) -> Self {
        Self {
            family_uuid,
            status: None,
            assignee_uuid: None,
            weekday: None,
        }
    }
}

/// Repository interface for chore templates and instances.
pub trait TaskRepository {
    fn create_template(&self, template: &TaskTemplate) -> RepoResult<TaskId>;
    fn create_instance(&self, instance: &TaskInstance) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<TaskRecord>>;
    /// Templates of one family in creation order, optionally by status.
    fn list_templates(
        &self,
        family: FamilyId,
        status: Option<TaskStatus>,
    ) -> RepoResult<Vec<TaskTemplate>>;
    fn list_instances(&self, query: &InstanceListQuery) -> RepoResult<Vec<TaskInstance>>;
    fn set_status(&self, id: TaskId, status: TaskStatus) -> RepoResult<()>;
    /// Pending instances assigned to `member`, across all families.
    fn count_pending_instances_for(&self, member: MemberId) -> RepoResult<u32>;
    /// Deletes pending instances of a family, optionally only those tagged
    /// with `weekday`. Returns the number of deleted rows.
    fn delete_pending_instances(
        &self,
        family: FamilyId,
        weekday: Option<Weekday>,
    ) -> RepoResult<usize>;
    /// Sets every template of a family back to pending. Returns the number
    /// of templates touched.
    fn reset_templates(&self, family: FamilyId) -> RepoResult<usize>;
}

/// SQLite-backed chore repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, "tasks")?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_template(&self, template: &TaskTemplate) -> RepoResult<TaskId> {
        template.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                family_uuid,
                kind,
                template_uuid,
                name,
                recurrence,
                assignee_uuid,
                required_minutes,
                min_age,
                status
            ) VALUES (?1, ?2, ?3, NULL, ?4, ?5, NULL, ?6, ?7, ?8);",
            params![
                template.uuid.to_string(),
                template.family_uuid.to_string(),
                KIND_TEMPLATE,
                template.name.as_str(),
                template.weekdays.to_delimited(),
                template.required_minutes,
                template.min_age,
                task_status_to_db(template.status),
            ],
        )?;

        Ok(template.uuid)
    }

    fn create_instance(&self, instance: &TaskInstance) -> RepoResult<TaskId> {
        if parse_weekday_tag(&instance.name) != Some(instance.weekday) {
            return Err(RepoError::InvalidData(format!(
                "instance {} name does not carry its weekday tag {}",
                instance.uuid,
                weekday_tag(instance.weekday)
            )));
        }

        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                family_uuid,
                kind,
                template_uuid,
                name,
                recurrence,
                assignee_uuid,
                required_minutes,
                min_age,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, '', ?6, ?7, ?8, ?9);",
            params![
                instance.uuid.to_string(),
                instance.family_uuid.to_string(),
                KIND_INSTANCE,
                instance.template_uuid.map(|id| id.to_string()),
                instance.name.as_str(),
                instance.assignee_uuid.map(|id| id.to_string()),
                instance.required_minutes,
                instance.min_age,
                task_status_to_db(instance.status),
            ],
        )?;

        Ok(instance.uuid)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<TaskRecord>> {
        self.conn
            .query_row(
                &format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                |row| Ok(parse_task_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_templates(
        &self,
        family: FamilyId,
        status: Option<TaskStatus>,
    ) -> RepoResult<Vec<TaskTemplate>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE kind = ? AND family_uuid = ?");
        let mut bind_values = vec![
            Value::Text(KIND_TEMPLATE.to_string()),
            Value::Text(family.to_string()),
        ];
        if let Some(status) = status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(task_status_to_db(status).to_string()));
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut templates = Vec::new();
        for record in self.query_tasks(&sql, bind_values)? {
            match record {
                TaskRecord::Template(template) => templates.push(template),
                TaskRecord::Instance(instance) => {
                    return Err(RepoError::InvalidData(format!(
                        "task {} listed as template but parsed as instance",
                        instance.uuid
                    )));
                }
            }
        }
        Ok(templates)
    }

    fn list_instances(&self, query: &InstanceListQuery) -> RepoResult<Vec<TaskInstance>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE kind = ? AND family_uuid = ?");
        let mut bind_values = vec![
            Value::Text(KIND_INSTANCE.to_string()),
            Value::Text(query.family_uuid.to_string()),
        ];
        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(task_status_to_db(status).to_string()));
        }
        if let Some(assignee) = query.assignee_uuid {
            sql.push_str(" AND assignee_uuid = ?");
            bind_values.push(Value::Text(assignee.to_string()));
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut instances = Vec::new();
        for record in self.query_tasks(&sql, bind_values)? {
            match record {
                TaskRecord::Instance(instance) => {
                    if query.weekday.is_some_and(|day| day != instance.weekday) {
                        continue;
                    }
                    instances.push(instance);
                }
                TaskRecord::Template(template) => {
                    return Err(RepoError::InvalidData(format!(
                        "task {} listed as instance but parsed as template",
                        template.uuid
                    )));
                }
            }
        }
        Ok(instances)
    }

    fn set_status(&self, id: TaskId, status: TaskStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET status = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), task_status_to_db(status)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "task", id });
        }
        Ok(())
    }

    fn count_pending_instances_for(&self, member: MemberId) -> RepoResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM tasks
             WHERE kind = 'instance'
               AND status = 'pending'
               AND assignee_uuid = ?1;",
            [member.to_string()],
            |row| row.get(0),
        )?;
        parse_u32(count, "COUNT(tasks)")
    }

    fn delete_pending_instances(
        &self,
        family: FamilyId,
        weekday: Option<Weekday>,
    ) -> RepoResult<usize> {
        let deleted = match weekday {
            Some(day) => self.conn.execute(
                "DELETE FROM tasks
                 WHERE kind = 'instance'
                   AND status = 'pending'
                   AND family_uuid = ?1
                   AND name LIKE ?2;",
                params![family.to_string(), format!("%{}", weekday_tag(day))],
            )?,
            None => self.conn.execute(
                "DELETE FROM tasks
                 WHERE kind = 'instance'
                   AND status = 'pending'
                   AND family_uuid = ?1;",
                [family.to_string()],
            )?,
        };
        Ok(deleted)
    }

    fn reset_templates(&self, family: FamilyId) -> RepoResult<usize> {
        let touched = self.conn.execute(
            "UPDATE tasks
             SET status = 'pending',
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE kind = 'template'
               AND family_uuid = ?1;",
            [family.to_string()],
        )?;
        Ok(touched)
    }
}

impl SqliteTaskRepository<'_> {
    fn query_tasks(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<TaskRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_task_row(row)?);
        }
        Ok(records)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<TaskRecord> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "tasks.uuid")?;
    let family_text: String = row.get("family_uuid")?;
    let family_uuid = parse_uuid(&family_text, "tasks.family_uuid")?;
    let name: String = row.get("name")?;
    let required_minutes = parse_u32(row.get("required_minutes")?, "tasks.required_minutes")?;
    let min_age = row
        .get::<_, Option<i64>>("min_age")?
        .map(|value| parse_u32(value, "tasks.min_age"))
        .transpose()?;
    let status_text: String = row.get("status")?;
    let status = parse_task_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;
    let created_at: i64 = row.get("created_at")?;
    let kind: String = row.get("kind")?;

    match kind.as_str() {
        KIND_TEMPLATE => {
            let recurrence: String = row.get("recurrence")?;
            let weekdays = WeekdaySet::parse_delimited(&recurrence).map_err(|err| {
                RepoError::InvalidData(format!("{err} in tasks.recurrence of task {uuid}"))
            })?;
            Ok(TaskRecord::Template(TaskTemplate {
                uuid,
                family_uuid,
                name,
                required_minutes,
                min_age,
                weekdays,
                status,
                created_at,
            }))
        }
        KIND_INSTANCE => {
            let weekday = parse_weekday_tag(&name).ok_or_else(|| {
                RepoError::InvalidData(format!("instance {uuid} name has no weekday tag"))
            })?;
            Ok(TaskRecord::Instance(TaskInstance {
                uuid,
                family_uuid,
                template_uuid: parse_optional_uuid(row.get("template_uuid")?, "tasks.template_uuid")?,
                name,
                weekday,
                assignee_uuid: parse_optional_uuid(row.get("assignee_uuid")?, "tasks.assignee_uuid")?,
                required_minutes,
                min_age,
                status,
                created_at,
            }))
        }
        other => Err(RepoError::InvalidData(format!(
            "invalid task kind `{other}` in tasks.kind"
        ))),
    }
}

fn task_status_to_db(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::Done => "done",
    }
}

fn parse_task_status(value: &str) -> Option<TaskStatus> {
    match value {
        "pending" => Some(TaskStatus::Pending),
        "done" => Some(TaskStatus::Done),
        _ => None,
    }
}
