//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define the data-access contracts the household services and the
//!   distribution run depend on.
//! - Isolate SQL details and storage encodings (delimited weekdays, ISO
//!   dates, `HH:MM` times) from business orchestration.
//!
//! # Invariants
//! - Write paths validate domain records before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::ValidationError;
use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod availability_repo;
pub mod family_repo;
pub mod member_repo;
pub mod task_repo;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all household repositories.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound { entity: &'static str, id: Uuid },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_optional_uuid(value: Option<String>, column: &str) -> RepoResult<Option<Uuid>> {
    value.map(|text| parse_uuid(&text, column)).transpose()
}

pub(crate) fn date_to_db(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in {column}")))
}

pub(crate) fn time_to_db(value: NaiveTime) -> String {
    value.format(TIME_FORMAT).to_string()
}

pub(crate) fn parse_time(value: &str, column: &str) -> RepoResult<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid time `{value}` in {column}")))
}

pub(crate) fn parse_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn parse_u32(value: i64, column: &str) -> RepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid non-negative integer `{value}` in {column}")))
}

/// Rejects connections that were not opened through `db::open_*`.
pub(crate) fn ensure_schema_ready(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let expected = crate::db::migrations::latest_version();
    let actual = crate::db::migrations::current_user_version(conn)?;
    if actual != expected {
        return Err(RepoError::InvalidData(format!(
            "repository for `{table}` requires schema version {expected}, got {actual}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_bool, parse_date, parse_time, time_to_db, RepoError};
    use chrono::NaiveTime;

    #[test]
    fn parse_helpers_reject_garbage() {
        assert!(matches!(
            parse_date("2024-13-01", "profiles.birth_date"),
            Err(RepoError::InvalidData(_))
        ));
        assert!(matches!(
            parse_time("25:00", "availability_blocks.start_time"),
            Err(RepoError::InvalidData(_))
        ));
        assert!(matches!(
            parse_bool(2, "availability_blocks.is_active"),
            Err(RepoError::InvalidData(_))
        ));
    }

    #[test]
    fn time_storage_format_is_hours_and_minutes() {
        let time = NaiveTime::from_hms_opt(7, 5, 0).unwrap();
        assert_eq!(time_to_db(time), "07:05");
        assert_eq!(parse_time("07:05", "t").unwrap(), time);
    }
}
