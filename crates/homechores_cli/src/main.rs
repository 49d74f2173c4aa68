//! `homechores` command line entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging, and open the database.
//! - Map each subcommand onto one core service call and print the result.

mod cli;
mod config;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use homechores_core::repo::availability_repo::SqliteAvailabilityRepository;
use homechores_core::repo::family_repo::SqliteFamilyRepository;
use homechores_core::repo::member_repo::SqliteMemberRepository;
use homechores_core::repo::task_repo::{InstanceListQuery, SqliteTaskRepository};
use homechores_core::{
    init_logging, open_db, AvailabilityService, CleanupReport, DistributionOutcome,
    DistributionReport, DistributionService, Family, FamilyService, Member, MemberService,
    NewTemplate, TaskService,
};
use log::info;
use rusqlite::Connection;
use serde::Serialize;

use crate::cli::{
    AvailabilityCommand, CliArgs, Command, FamilyCommand, MemberCommand, TaskCommand,
    TemplateCommand,
};
use crate::config::AppConfig;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = AppConfig::from_args(&args)?;

    if let Some(settings) = &config.log {
        init_logging(settings).context("failed to start logging")?;
    }

    let mut conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open database `{}`", config.db_path.display()))?;
    info!("event=cli_start module=cli status=ok");

    match args.command {
        Command::Member(cmd) => run_member(&conn, &config, cmd),
        Command::Family(cmd) => run_family(&conn, &config, cmd),
        Command::Availability(cmd) => run_availability(&conn, &config, cmd),
        Command::Template(cmd) => run_template(&conn, &config, cmd),
        Command::Task(cmd) => run_task(&conn, &config, cmd),
        Command::Distribute { family, actor } => {
            let family = family_named(&conn, &family)?;
            let actor = member_named(&conn, &actor)?;
            let report = DistributionService::new(&mut conn)
                .distribute(family.uuid, actor.uuid)
                .context("distribution failed")?;
            print_distribution(&config, &report)
        }
        Command::Cleanup { family, actor, day } => {
            let family = family_named(&conn, &family)?;
            let actor = member_named(&conn, &actor)?;
            let report = DistributionService::new(&mut conn)
                .cleanup(family.uuid, actor.uuid, day)
                .context("cleanup failed")?;
            print_cleanup(&config, &report)
        }
    }
}

fn run_member(conn: &Connection, config: &AppConfig, cmd: MemberCommand) -> Result<()> {
    let service = MemberService::new(SqliteMemberRepository::try_new(conn)?);
    match cmd {
        MemberCommand::Add {
            username,
            birth_date,
        } => {
            let member = service.register_member(&username, birth_date)?;
            emit(config, &member, || format!("registered {} ({})", member.username, member.uuid))
        }
        MemberCommand::Show { username } => {
            let member = member_named(conn, &username)?;
            emit(config, &member, || {
                let birth = member
                    .profile
                    .birth_date
                    .map_or_else(|| "unknown".to_string(), |date| date.to_string());
                format!("{} ({}) born {}", member.username, member.uuid, birth)
            })
        }
        MemberCommand::SetBirthDate {
            username,
            birth_date,
        } => {
            let member = member_named(conn, &username)?;
            service.update_birth_date(member.uuid, birth_date)?;
            println!("updated birth date of {}", member.username);
            Ok(())
        }
    }
}

fn run_family(conn: &Connection, config: &AppConfig, cmd: FamilyCommand) -> Result<()> {
    let service = FamilyService::new(
        SqliteFamilyRepository::try_new(conn)?,
        SqliteMemberRepository::try_new(conn)?,
    );
    match cmd {
        FamilyCommand::Create { name, owner } => {
            let owner = member_named(conn, &owner)?;
            let family = service.create_family(owner.uuid, &name)?;
            emit(config, &family, || format!("created family {} ({})", family.name, family.uuid))
        }
        FamilyCommand::Join { name, member } => {
            let family = family_named(conn, &name)?;
            let member = member_named(conn, &member)?;
            service.join_family(family.uuid, member.uuid)?;
            println!("{} joined {}", member.username, family.name);
            Ok(())
        }
        FamilyCommand::RemoveMember {
            name,
            username,
            actor,
        } => {
            let family = family_named(conn, &name)?;
            let member = member_named(conn, &username)?;
            let actor = member_named(conn, &actor)?;
            service.remove_member(actor.uuid, family.uuid, member.uuid)?;
            println!("{} removed from {}", member.username, family.name);
            Ok(())
        }
        FamilyCommand::Members { name } => {
            let family = family_named(conn, &name)?;
            let members = service.list_members(family.uuid)?;
            emit(config, &members, || {
                members
                    .iter()
                    .map(|member| format!("{}\t{}", member.uuid, member.username))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
    }
}

fn run_availability(conn: &Connection, config: &AppConfig, cmd: AvailabilityCommand) -> Result<()> {
    let service = AvailabilityService::new(SqliteAvailabilityRepository::try_new(conn)?);
    match cmd {
        AvailabilityCommand::Add {
            username,
            day,
            start,
            end,
        } => {
            let member = member_named(conn, &username)?;
            let block = service.add_block(member.uuid, day, start, end)?;
            emit(config, &block, || {
                format!(
                    "added {} {}-{} for {} ({})",
                    block.weekday,
                    block.start.format("%H:%M"),
                    block.end.format("%H:%M"),
                    member.username,
                    block.uuid
                )
            })
        }
        AvailabilityCommand::List { username } => {
            let member = member_named(conn, &username)?;
            let blocks = service.list_blocks(member.uuid)?;
            emit(config, &blocks, || {
                blocks
                    .iter()
                    .map(|block| {
                        format!(
                            "{}\t{}\t{}-{}\t{}",
                            block.uuid,
                            block.weekday,
                            block.start.format("%H:%M"),
                            block.end.format("%H:%M"),
                            if block.is_active { "active" } else { "inactive" }
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        AvailabilityCommand::Enable { id } => {
            service.set_block_active(id, true)?;
            println!("enabled {id}");
            Ok(())
        }
        AvailabilityCommand::Disable { id } => {
            service.set_block_active(id, false)?;
            println!("disabled {id}");
            Ok(())
        }
        AvailabilityCommand::Delete { id } => {
            service.delete_block(id)?;
            println!("deleted {id}");
            Ok(())
        }
    }
}

fn run_template(conn: &Connection, config: &AppConfig, cmd: TemplateCommand) -> Result<()> {
    let service = TaskService::new(
        SqliteFamilyRepository::try_new(conn)?,
        SqliteTaskRepository::try_new(conn)?,
    );
    match cmd {
        TemplateCommand::Add {
            name,
            family,
            actor,
            minutes,
            min_age,
            days,
        } => {
            let family = family_named(conn, &family)?;
            let actor = member_named(conn, &actor)?;
            let template = service.create_template(
                actor.uuid,
                NewTemplate {
                    family_uuid: family.uuid,
                    name,
                    required_minutes: minutes,
                    min_age,
                    weekdays: days,
                },
            )?;
            emit(config, &template, || {
                format!("created template {} ({})", template.name, template.uuid)
            })
        }
        TemplateCommand::List { family } => {
            let family = family_named(conn, &family)?;
            let templates = service.list_templates(family.uuid)?;
            emit(config, &templates, || {
                templates
                    .iter()
                    .map(|template| {
                        format!(
                            "{}\t{}\t{}min\tage>={}\t{}\t{:?}",
                            template.uuid,
                            template.name,
                            template.required_minutes,
                            template.min_age.unwrap_or_default(),
                            template.weekdays.to_delimited(),
                            template.status
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
    }
}

fn run_task(conn: &Connection, config: &AppConfig, cmd: TaskCommand) -> Result<()> {
    let service = TaskService::new(
        SqliteFamilyRepository::try_new(conn)?,
        SqliteTaskRepository::try_new(conn)?,
    );
    match cmd {
        TaskCommand::List {
            family,
            status,
            assignee,
            day,
        } => {
            let family = family_named(conn, &family)?;
            let mut query = InstanceListQuery::for_family(family.uuid);
            query.status = status.map(Into::into);
            query.weekday = day;
            if let Some(username) = assignee {
                query.assignee_uuid = Some(member_named(conn, &username)?.uuid);
            }
            let instances = service.list_instances(&query)?;
            emit(config, &instances, || {
                instances
                    .iter()
                    .map(|instance| {
                        let assignee = instance
                            .assignee_uuid
                            .map_or_else(|| "-".to_string(), |id| id.to_string());
                        format!(
                            "{}\t{}\t{}\t{:?}",
                            instance.uuid, instance.name, assignee, instance.status
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        TaskCommand::Toggle { id, actor } => {
            let actor = member_named(conn, &actor)?;
            let status = service.toggle_status(actor.uuid, id)?;
            println!("{id} is now {status:?}");
            Ok(())
        }
    }
}

fn member_named(conn: &Connection, username: &str) -> Result<Member> {
    MemberService::new(SqliteMemberRepository::try_new(conn)?)
        .find_by_username(username.trim())?
        .ok_or_else(|| anyhow!("unknown member `{username}`"))
}

fn family_named(conn: &Connection, name: &str) -> Result<Family> {
    FamilyService::new(
        SqliteFamilyRepository::try_new(conn)?,
        SqliteMemberRepository::try_new(conn)?,
    )
    .find_by_name(name)?
    .ok_or_else(|| anyhow!("unknown family `{name}`"))
}

fn emit<T: Serialize>(config: &AppConfig, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if config.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        let text = text();
        if !text.is_empty() {
            println!("{text}");
        }
    }
    Ok(())
}

fn print_distribution(config: &AppConfig, report: &DistributionReport) -> Result<()> {
    if config.json {
        return emit(config, report, String::new);
    }
    if report.outcome == DistributionOutcome::NothingToDistribute {
        println!("nothing to distribute: no pending templates");
        return Ok(());
    }
    println!(
        "templates processed: {}, assigned: {}, failures: {}",
        report.templates_processed,
        report.assigned_count(),
        report.failures.len()
    );
    for assigned in &report.assigned {
        println!("  {} -> {}", assigned.name, assigned.assignee_uuid);
    }
    for message in report.failure_messages() {
        println!("  unassigned: {message}");
    }
    Ok(())
}

fn print_cleanup(config: &AppConfig, report: &CleanupReport) -> Result<()> {
    if config.json {
        return emit(config, report, String::new);
    }
    println!(
        "deleted {} pending tasks, reset {} templates",
        report.deleted_count, report.reset_template_count
    );
    Ok(())
}
