//! Weekday codes and weekday sets.
//!
//! # Responsibility
//! - Define the seven canonical weekday codes used by schedules and chores.
//! - Convert between the delimited storage form and a typed set.
//!
//! # Invariants
//! - Iteration order is canonical: Monday first, Sunday last.
//! - Parsing is case-insensitive, ignores blanks and collapses duplicates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Day of the week, ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "MON")]
    Monday,
    #[serde(rename = "TUE")]
    Tuesday,
    #[serde(rename = "WED")]
    Wednesday,
    #[serde(rename = "THU")]
    Thursday,
    #[serde(rename = "FRI")]
    Friday,
    #[serde(rename = "SAT")]
    Saturday,
    #[serde(rename = "SUN")]
    Sunday,
}

impl Weekday {
    /// All weekdays in canonical order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Three-letter upper-case code, e.g. `MON`.
    pub fn code(self) -> &'static str {
        match self {
            Self::Monday => "MON",
            Self::Tuesday => "TUE",
            Self::Wednesday => "WED",
            Self::Thursday => "THU",
            Self::Friday => "FRI",
            Self::Saturday => "SAT",
            Self::Sunday => "SUN",
        }
    }

    /// Parses one weekday code. Surrounding whitespace and case are ignored.
    pub fn parse_code(value: &str) -> Result<Self, WeekdayParseError> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|day| day.code() == normalized)
            .ok_or_else(|| WeekdayParseError(value.trim().to_string()))
    }
}

impl Display for Weekday {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Weekday {
    type Err = WeekdayParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_code(s)
    }
}

/// Unknown weekday code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekdayParseError(pub String);

impl Display for WeekdayParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown weekday code `{}`; expected one of MON|TUE|WED|THU|FRI|SAT|SUN",
            self.0
        )
    }
}

impl Error for WeekdayParseError {}

/// Ordered, duplicate-free set of weekdays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdaySet(BTreeSet<Weekday>);

impl WeekdaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-delimited list such as `"mon, WED,,mon"`.
    ///
    /// Blank entries are skipped; the first unknown code fails the parse.
    pub fn parse_delimited(value: &str) -> Result<Self, WeekdayParseError> {
        let mut days = BTreeSet::new();
        for part in value.split(',') {
            if part.trim().is_empty() {
                continue;
            }
            days.insert(Weekday::parse_code(part)?);
        }
        Ok(Self(days))
    }

    /// Storage form: codes in canonical order joined by `,`.
    pub fn to_delimited(&self) -> String {
        self.0
            .iter()
            .map(|day| day.code())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn insert(&mut self, day: Weekday) -> bool {
        self.0.insert(day)
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0.contains(&day)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
