//! Transactional entry points for distribution and cleanup.
//!
//! # Invariants
//! - Each call runs in one IMMEDIATE transaction: every write of the run is
//!   committed together or rolled back together.
//! - Two concurrent runs for the same family are serialized only by the
//!   SQLite write lock this transaction takes; there is no extra
//!   application-level lock.

use crate::distribution::{
    run_cleanup, run_distribution, CleanupReport, DistributionError, DistributionReport, Stores,
};
use crate::model::family::FamilyId;
use crate::model::member::MemberId;
use crate::model::weekday::Weekday;
use crate::repo::availability_repo::SqliteAvailabilityRepository;
use crate::repo::family_repo::SqliteFamilyRepository;
use crate::repo::task_repo::SqliteTaskRepository;
use chrono::{Local, NaiveDate};
use log::error;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;

pub struct DistributionService<'conn> {
    conn: &'conn mut Connection,
    today: NaiveDate,
}

impl<'conn> DistributionService<'conn> {
    /// Uses the local calendar date for age checks.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self::with_today(conn, Local::now().date_naive())
    }

    /// Uses a fixed date for age checks.
    pub fn with_today(conn: &'conn mut Connection, today: NaiveDate) -> Self {
        Self { conn, today }
    }

    /// Distributes all pending templates of `family`. `actor` must own it.
    pub fn distribute(
        &mut self,
        family: FamilyId,
        actor: MemberId,
    ) -> Result<DistributionReport, DistributionError> {
        let today = self.today;
        self.in_transaction("distribute", |stores| {
            run_distribution(stores, family, actor, today)
        })
    }

    /// Deletes pending instances (optionally one weekday's) and resets the
    /// family's templates to pending. `actor` must own the family.
    pub fn cleanup(
        &mut self,
        family: FamilyId,
        actor: MemberId,
        day_filter: Option<Weekday>,
    ) -> Result<CleanupReport, DistributionError> {
        self.in_transaction("cleanup", |stores| {
            run_cleanup(stores, family, actor, day_filter)
        })
    }

    fn in_transaction<T>(
        &mut self,
        operation: &'static str,
        run: impl FnOnce(&Stores<'_>) -> Result<T, DistributionError>,
    ) -> Result<T, DistributionError> {
        let started_at = Instant::now();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let outcome = run_with_stores(&tx, run);
        match outcome {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                // Dropping the transaction rolls back every write of the run.
                if matches!(err, DistributionError::Repo(_)) {
                    error!(
                        "event={} module=service status=rolled_back duration_ms={} error={}",
                        operation,
                        started_at.elapsed().as_millis(),
                        err
                    );
                }
                Err(err)
            }
        }
    }
}

fn run_with_stores<T>(
    tx: &Transaction<'_>,
    run: impl FnOnce(&Stores<'_>) -> Result<T, DistributionError>,
) -> Result<T, DistributionError> {
    let families = SqliteFamilyRepository::try_new(tx)?;
    let availability = SqliteAvailabilityRepository::try_new(tx)?;
    let tasks = SqliteTaskRepository::try_new(tx)?;
    let stores = Stores {
        families: &families,
        availability: &availability,
        tasks: &tasks,
    };
    run(&stores)
}
