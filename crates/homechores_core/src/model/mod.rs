//! Household domain model.
//!
//! # Responsibility
//! - Define members, families, availability blocks and chores.
//! - Hold write-time validation rules shared by repositories and services.
//!
//! # Invariants
//! - Every domain record is identified by a stable UUID.
//! - Delimited weekday strings exist only at the storage boundary.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod availability;
pub mod family;
pub mod member;
pub mod task;
pub mod weekday;

/// Write-time validation failure for domain records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is blank after trim.
    BlankField(&'static str),
    /// Availability block ends at or before its start.
    InvertedTimeRange { start: String, end: String },
    /// Chore duration must be positive.
    NonPositiveMinutes(i64),
    /// Minimum age, when present, must be positive.
    NonPositiveMinimumAge(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::InvertedTimeRange { start, end } => write!(
                f,
                "availability must end after it starts (start {start}, end {end}); \
                 blocks crossing midnight must be split per day"
            ),
            Self::NonPositiveMinutes(value) => {
                write!(f, "required minutes must be positive, got {value}")
            }
            Self::NonPositiveMinimumAge(value) => {
                write!(f, "minimum age must be positive when set, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}
