//! Member repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `create_member` writes the member row and its profile row in one
//!   transaction; a member is never visible without a profile.
//! - Reads fail with `InvalidData` when a profile row is missing.

use crate::model::member::{Member, MemberId, Profile};
use crate::repo::{
    date_to_db, ensure_schema_ready, parse_date, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

pub(crate) const MEMBER_SELECT_SQL: &str = "SELECT
    m.uuid AS uuid,
    m.username AS username,
    m.created_at AS created_at,
    p.member_uuid AS profile_member_uuid,
    p.birth_date AS birth_date
FROM members m
LEFT JOIN profiles p ON p.member_uuid = m.uuid";

/// Repository interface for member lookups and registration.
pub trait MemberRepository {
    /// Persists a member together with its profile.
    fn create_member(&self, member: &Member) -> RepoResult<MemberId>;
    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>>;
    fn find_by_username(&self, username: &str) -> RepoResult<Option<Member>>;
    fn update_profile(&self, id: MemberId, profile: &Profile) -> RepoResult<()>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, "members")?;
        Ok(Self { conn })
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn create_member(&self, member: &Member) -> RepoResult<MemberId> {
        member.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO members (uuid, username) VALUES (?1, ?2);",
            params![member.uuid.to_string(), member.username.as_str()],
        )?;
        tx.execute(
            "INSERT INTO profiles (member_uuid, birth_date) VALUES (?1, ?2);",
            params![
                member.uuid.to_string(),
                member.profile.birth_date.map(date_to_db),
            ],
        )?;
        tx.commit()?;

        Ok(member.uuid)
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        self.conn
            .query_row(
                &format!("{MEMBER_SELECT_SQL} WHERE m.uuid = ?1;"),
                [id.to_string()],
                |row| Ok(parse_member_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<Member>> {
        self.conn
            .query_row(
                &format!("{MEMBER_SELECT_SQL} WHERE m.username = ?1;"),
                [username.trim()],
                |row| Ok(parse_member_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn update_profile(&self, id: MemberId, profile: &Profile) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE profiles SET birth_date = ?2 WHERE member_uuid = ?1;",
            params![id.to_string(), profile.birth_date.map(date_to_db)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "member",
                id,
            });
        }
        Ok(())
    }
}

pub(crate) fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "members.uuid")?;

    if row.get::<_, Option<String>>("profile_member_uuid")?.is_none() {
        return Err(RepoError::InvalidData(format!(
            "member {uuid} has no profile row"
        )));
    }

    let birth_date = match row.get::<_, Option<String>>("birth_date")? {
        Some(value) => Some(parse_date(&value, "profiles.birth_date")?),
        None => None,
    };

    Ok(Member {
        uuid,
        username: row.get("username")?,
        profile: Profile { birth_date },
        created_at: row.get("created_at")?,
    })
}
