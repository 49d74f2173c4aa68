use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use homechores_core::{TaskStatus, Weekday, WeekdaySet};
use std::path::PathBuf;
use uuid::Uuid;

/// Household chore planner.
///
/// Members publish weekly availability; family owners define recurring
/// chores and distribute them across the family for the week.
#[derive(Parser, Debug)]
#[command(name = "homechores", version, about = "Household chore planner")]
pub struct CliArgs {
    /// SQLite database file
    #[arg(long, env = "HOMECHORES_DB", default_value = "homechores.db")]
    pub db: PathBuf,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, env = "HOMECHORES_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for rotated log files (file logging is off when unset)
    #[arg(long, env = "HOMECHORES_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register members and edit profiles
    #[command(subcommand)]
    Member(MemberCommand),

    /// Create families and manage membership
    #[command(subcommand)]
    Family(FamilyCommand),

    /// Weekly availability blocks
    #[command(subcommand)]
    Availability(AvailabilityCommand),

    /// Recurring chore templates
    #[command(subcommand)]
    Template(TemplateCommand),

    /// Assigned chore instances
    #[command(subcommand)]
    Task(TaskCommand),

    /// Assign every pending template of a family for the week
    Distribute {
        /// Family name
        #[arg(long)]
        family: String,

        /// Acting member (must own the family)
        #[arg(long = "as", value_name = "USERNAME")]
        actor: String,
    },

    /// Delete pending instances and reset templates to pending
    Cleanup {
        /// Family name
        #[arg(long)]
        family: String,

        /// Acting member (must own the family)
        #[arg(long = "as", value_name = "USERNAME")]
        actor: String,

        /// Only delete instances of this weekday (MON..SUN)
        #[arg(long, value_parser = parse_weekday)]
        day: Option<Weekday>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MemberCommand {
    Add {
        username: String,

        /// Birth date as YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        birth_date: Option<NaiveDate>,
    },
    Show {
        username: String,
    },
    /// Replace the birth date; omit --birth-date to clear it
    SetBirthDate {
        username: String,

        #[arg(long, value_parser = parse_date)]
        birth_date: Option<NaiveDate>,
    },
}

#[derive(Subcommand, Debug)]
pub enum FamilyCommand {
    Create {
        name: String,

        #[arg(long = "as", value_name = "USERNAME")]
        owner: String,
    },
    Join {
        name: String,

        #[arg(long = "as", value_name = "USERNAME")]
        member: String,
    },
    RemoveMember {
        name: String,

        /// Member to remove
        username: String,

        #[arg(long = "as", value_name = "USERNAME")]
        actor: String,
    },
    /// List members in join order
    Members {
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AvailabilityCommand {
    Add {
        username: String,

        #[arg(value_parser = parse_weekday)]
        day: Weekday,

        /// Start time as HH:MM
        #[arg(value_parser = parse_clock)]
        start: NaiveTime,

        /// End time as HH:MM, after start
        #[arg(value_parser = parse_clock)]
        end: NaiveTime,
    },
    List {
        username: String,
    },
    Enable {
        id: Uuid,
    },
    Disable {
        id: Uuid,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    Add {
        name: String,

        #[arg(long)]
        family: String,

        #[arg(long = "as", value_name = "USERNAME")]
        actor: String,

        /// Minutes of free time the chore needs
        #[arg(long)]
        minutes: u32,

        /// Minimum member age in whole years
        #[arg(long)]
        min_age: Option<u32>,

        /// Comma-separated weekday codes, e.g. MON,WED
        #[arg(long, value_parser = parse_weekdays, default_value = "")]
        days: WeekdaySet,
    },
    List {
        #[arg(long)]
        family: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    List {
        #[arg(long)]
        family: String,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Only tasks assigned to this member
        #[arg(long, value_name = "USERNAME")]
        assignee: Option<String>,

        #[arg(long, value_parser = parse_weekday)]
        day: Option<Weekday>,
    },
    /// Flip a task between pending and done
    Toggle {
        id: Uuid,

        #[arg(long = "as", value_name = "USERNAME")]
        actor: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum StatusArg {
    Pending,
    Done,
}

impl From<StatusArg> for TaskStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => TaskStatus::Pending,
            StatusArg::Done => TaskStatus::Done,
        }
    }
}

fn parse_weekday(value: &str) -> Result<Weekday, String> {
    Weekday::parse_code(value).map_err(|err| err.to_string())
}

fn parse_weekdays(value: &str) -> Result<WeekdaySet, String> {
    WeekdaySet::parse_delimited(value).map_err(|err| err.to_string())
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

fn parse_clock(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|err| format!("expected HH:MM: {err}"))
}
