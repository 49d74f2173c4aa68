//! Family repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `create_family` inserts the family and the owner's membership row in
//!   one transaction.
//! - Member listing is deterministic: `joined_at ASC, rowid ASC`.

use crate::model::family::{Family, FamilyId};
use crate::model::member::{Member, MemberId};
use crate::repo::member_repo::{parse_member_row, MEMBER_SELECT_SQL};
use crate::repo::{ensure_schema_ready, parse_uuid, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const FAMILY_SELECT_SQL: &str = "SELECT uuid, name, owner_uuid, created_at FROM families";

/// Repository interface for families and their member sets.
pub trait FamilyRepository {
    /// Persists a family and enrolls its owner as a member.
    fn create_family(&self, family: &Family) -> RepoResult<FamilyId>;
    fn get_family(&self, id: FamilyId) -> RepoResult<Option<Family>>;
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Family>>;
    /// Family owned by `member`, if any.
    fn family_owned_by(&self, member: MemberId) -> RepoResult<Option<Family>>;
    /// Families where `member` is in the member set, owned ones included.
    fn families_of_member(&self, member: MemberId) -> RepoResult<Vec<Family>>;
    fn is_member(&self, family: FamilyId, member: MemberId) -> RepoResult<bool>;
    fn add_member(&self, family: FamilyId, member: MemberId) -> RepoResult<()>;
    /// Returns whether a membership row was removed.
    fn remove_member(&self, family: FamilyId, member: MemberId) -> RepoResult<bool>;
    /// Members in join order.
    fn list_members(&self, family: FamilyId) -> RepoResult<Vec<Member>>;
}

/// SQLite-backed family repository.
pub struct SqliteFamilyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFamilyRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, "families")?;
        Ok(Self { conn })
    }
}

impl FamilyRepository for SqliteFamilyRepository<'_> {
    fn create_family(&self, family: &Family) -> RepoResult<FamilyId> {
        family.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO families (uuid, name, owner_uuid) VALUES (?1, ?2, ?3);",
            params![
                family.uuid.to_string(),
                family.name.as_str(),
                family.owner_uuid.to_string(),
            ],
        )?;
        tx.execute(
            "INSERT INTO family_members (family_uuid, member_uuid) VALUES (?1, ?2);",
            params![family.uuid.to_string(), family.owner_uuid.to_string()],
        )?;
        tx.commit()?;

        Ok(family.uuid)
    }

    fn get_family(&self, id: FamilyId) -> RepoResult<Option<Family>> {
        self.query_one(&format!("{FAMILY_SELECT_SQL} WHERE uuid = ?1;"), &id.to_string())
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Family>> {
        self.query_one(&format!("{FAMILY_SELECT_SQL} WHERE name = ?1;"), name.trim())
    }

    fn family_owned_by(&self, member: MemberId) -> RepoResult<Option<Family>> {
        self.query_one(
            &format!("{FAMILY_SELECT_SQL} WHERE owner_uuid = ?1;"),
            &member.to_string(),
        )
    }

    fn families_of_member(&self, member: MemberId) -> RepoResult<Vec<Family>> {
        let mut stmt = self.conn.prepare(
            "SELECT f.uuid, f.name, f.owner_uuid, f.created_at
             FROM families f
             JOIN family_members fm ON fm.family_uuid = f.uuid
             WHERE fm.member_uuid = ?1
             ORDER BY fm.joined_at ASC, fm.rowid ASC;",
        )?;
        let mut rows = stmt.query([member.to_string()])?;
        let mut families = Vec::new();
        while let Some(row) = rows.next()? {
            families.push(parse_family_row(row)?);
        }
        Ok(families)
    }

    fn is_member(&self, family: FamilyId, member: MemberId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM family_members
                WHERE family_uuid = ?1 AND member_uuid = ?2
            );",
            params![family.to_string(), member.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn add_member(&self, family: FamilyId, member: MemberId) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO family_members (family_uuid, member_uuid) VALUES (?1, ?2);",
            params![family.to_string(), member.to_string()],
        )?;
        Ok(())
    }

    fn remove_member(&self, family: FamilyId, member: MemberId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM family_members WHERE family_uuid = ?1 AND member_uuid = ?2;",
            params![family.to_string(), member.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn list_members(&self, family: FamilyId) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBER_SELECT_SQL}
             JOIN family_members fm ON fm.member_uuid = m.uuid
             WHERE fm.family_uuid = ?1
             ORDER BY fm.joined_at ASC, fm.rowid ASC;"
        ))?;
        let mut rows = stmt.query([family.to_string()])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }
}

impl SqliteFamilyRepository<'_> {
    fn query_one(&self, sql: &str, key: &str) -> RepoResult<Option<Family>> {
        self.conn
            .query_row(sql, [key], |row| Ok(parse_family_row(row)))
            .optional()?
            .transpose()
    }
}

fn parse_family_row(row: &Row<'_>) -> RepoResult<Family> {
    let uuid_text: String = row.get("uuid")?;
    let owner_text: String = row.get("owner_uuid")?;
    Ok(Family {
        uuid: parse_uuid(&uuid_text, "families.uuid")?,
        name: row.get("name")?,
        owner_uuid: parse_uuid(&owner_text, "families.owner_uuid")?,
        created_at: row.get("created_at")?,
    })
}
