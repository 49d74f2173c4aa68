//! Availability block repository contracts and SQLite implementation.

use crate::model::availability::{AvailabilityBlock, AvailabilityBlockId};
use crate::model::member::MemberId;
use crate::model::weekday::Weekday;
use crate::repo::{
    bool_to_int, ensure_schema_ready, parse_bool, parse_time, parse_uuid, time_to_db, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const BLOCK_SELECT_SQL: &str = "SELECT
    uuid,
    member_uuid,
    weekday,
    start_time,
    end_time,
    is_active
FROM availability_blocks";

/// Repository interface for weekly availability.
pub trait AvailabilityRepository {
    fn create_block(&self, block: &AvailabilityBlock) -> RepoResult<AvailabilityBlockId>;
    fn get_block(&self, id: AvailabilityBlockId) -> RepoResult<Option<AvailabilityBlock>>;
    fn set_block_active(&self, id: AvailabilityBlockId, is_active: bool) -> RepoResult<()>;
    fn delete_block(&self, id: AvailabilityBlockId) -> RepoResult<()>;
    /// All blocks of one member, active or not.
    fn list_blocks(&self, member: MemberId) -> RepoResult<Vec<AvailabilityBlock>>;
    /// Active blocks of one member on one weekday only.
    fn list_active_blocks_on(
        &self,
        member: MemberId,
        weekday: Weekday,
    ) -> RepoResult<Vec<AvailabilityBlock>>;
}

/// SQLite-backed availability repository.
pub struct SqliteAvailabilityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAvailabilityRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, "availability_blocks")?;
        Ok(Self { conn })
    }

    fn query_blocks(
        &self,
        sql: &str,
        args: impl rusqlite::Params,
    ) -> RepoResult<Vec<AvailabilityBlock>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(args)?;
        let mut blocks = Vec::new();
        while let Some(row) = rows.next()? {
            blocks.push(parse_block_row(row)?);
        }
        Ok(blocks)
    }
}

impl AvailabilityRepository for SqliteAvailabilityRepository<'_> {
    fn create_block(&self, block: &AvailabilityBlock) -> RepoResult<AvailabilityBlockId> {
        block.validate()?;

        self.conn.execute(
            "INSERT INTO availability_blocks (
                uuid,
                member_uuid,
                weekday,
                start_time,
                end_time,
                is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                block.uuid.to_string(),
                block.member_uuid.to_string(),
                block.weekday.code(),
                time_to_db(block.start),
                time_to_db(block.end),
                bool_to_int(block.is_active),
            ],
        )?;

        Ok(block.uuid)
    }

    fn get_block(&self, id: AvailabilityBlockId) -> RepoResult<Option<AvailabilityBlock>> {
        self.conn
            .query_row(
                &format!("{BLOCK_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                |row| Ok(parse_block_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn set_block_active(&self, id: AvailabilityBlockId, is_active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE availability_blocks SET is_active = ?2 WHERE uuid = ?1;",
            params![id.to_string(), bool_to_int(is_active)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "availability block",
                id,
            });
        }
        Ok(())
    }

    fn delete_block(&self, id: AvailabilityBlockId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM availability_blocks WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "availability block",
                id,
            });
        }
        Ok(())
    }

    fn list_blocks(&self, member: MemberId) -> RepoResult<Vec<AvailabilityBlock>> {
        self.query_blocks(
            &format!(
                "{BLOCK_SELECT_SQL}
                 WHERE member_uuid = ?1
                 ORDER BY CASE weekday
                     WHEN 'MON' THEN 1 WHEN 'TUE' THEN 2 WHEN 'WED' THEN 3
                     WHEN 'THU' THEN 4 WHEN 'FRI' THEN 5 WHEN 'SAT' THEN 6
                     ELSE 7 END,
                     start_time ASC,
                     uuid ASC;"
            ),
            [member.to_string()],
        )
    }

    fn list_active_blocks_on(
        &self,
        member: MemberId,
        weekday: Weekday,
    ) -> RepoResult<Vec<AvailabilityBlock>> {
        self.query_blocks(
            &format!(
                "{BLOCK_SELECT_SQL}
                 WHERE member_uuid = ?1
                   AND weekday = ?2
                   AND is_active = 1
                 ORDER BY start_time ASC, uuid ASC;"
            ),
            params![member.to_string(), weekday.code()],
        )
    }
}

fn parse_block_row(row: &Row<'_>) -> RepoResult<AvailabilityBlock> {
    let uuid_text: String = row.get("uuid")?;
    let member_text: String = row.get("member_uuid")?;
    let weekday_text: String = row.get("weekday")?;
    let start_text: String = row.get("start_time")?;
    let end_text: String = row.get("end_time")?;

    let weekday = Weekday::parse_code(&weekday_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid weekday `{weekday_text}` in availability_blocks.weekday"
        ))
    })?;

    let block = AvailabilityBlock {
        uuid: parse_uuid(&uuid_text, "availability_blocks.uuid")?,
        member_uuid: parse_uuid(&member_text, "availability_blocks.member_uuid")?,
        weekday,
        start: parse_time(&start_text, "availability_blocks.start_time")?,
        end: parse_time(&end_text, "availability_blocks.end_time")?,
        is_active: parse_bool(row.get("is_active")?, "availability_blocks.is_active")?,
    };
    block
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("availability block {}: {err}", block.uuid)))?;
    Ok(block)
}
