//! Member and profile model.
//!
//! # Invariants
//! - A `Member` never exists without its `Profile`; both are constructed
//!   together and persisted in one transaction.
//! - Age is counted in whole years by month/day comparison.

use crate::model::{require_text, ValidationError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MemberId = Uuid;

/// Per-member profile data used by chore eligibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unknown birth dates count as age 0.
    pub birth_date: Option<NaiveDate>,
}

impl Profile {
    /// Whole years lived as of `today`. Missing or future birth dates give 0.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        self.birth_date
            .map_or(0, |birth_date| whole_years_between(birth_date, today))
    }
}

/// Household member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub uuid: MemberId,
    pub username: String,
    pub profile: Profile,
    /// Epoch ms, assigned by storage.
    pub created_at: i64,
}

impl Member {
    /// Builds a member together with its profile.
    pub fn new(username: impl Into<String>, birth_date: Option<NaiveDate>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            username: username.into().trim().to_string(),
            profile: Profile { birth_date },
            created_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("username", &self.username)
    }

    pub fn age_on(&self, today: NaiveDate) -> u32 {
        self.profile.age_on(today)
    }
}

fn whole_years_between(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}
