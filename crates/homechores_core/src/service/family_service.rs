//! Family creation and membership use-cases.
//!
//! # Invariants
//! - A member owns at most one family.
//! - An owner is never a regular member of a family they do not own. This
//!   is checked both when joining and when creating a family.
//! - Joining a family twice is rejected.
//! - Only the owner removes other members; anyone may remove themselves.
//!   An owner who removes themselves keeps ownership but leaves the
//!   assignee pool.

use crate::model::family::{Family, FamilyId};
use crate::model::member::{Member, MemberId};
use crate::repo::family_repo::FamilyRepository;
use crate::repo::member_repo::MemberRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum FamilyServiceError {
    MemberNotFound(MemberId),
    FamilyNotFound(FamilyId),
    FamilyNameTaken(String),
    /// The member already owns a family.
    AlreadyOwnsFamily { member: MemberId, family: FamilyId },
    /// Owners may not be regular members of other families.
    OwnerOfOtherFamily { member: MemberId, owned: FamilyId },
    /// Creating a family while being a regular member elsewhere.
    MemberOfOtherFamily { member: MemberId, family: FamilyId },
    AlreadyMember { family: FamilyId, member: MemberId },
    NotAMember { family: FamilyId, member: MemberId },
    NotOwner { family: FamilyId, actor: MemberId },
    Repo(RepoError),
}

impl Display for FamilyServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemberNotFound(id) => write!(f, "member not found: {id}"),
            Self::FamilyNotFound(id) => write!(f, "family not found: {id}"),
            Self::FamilyNameTaken(name) => write!(f, "family name already in use: `{name}`"),
            Self::AlreadyOwnsFamily { member, family } => {
                write!(f, "member {member} already owns family {family}")
            }
            Self::OwnerOfOtherFamily { member, owned } => write!(
                f,
                "member {member} owns family {owned} and cannot join another family"
            ),
            Self::MemberOfOtherFamily { member, family } => write!(
                f,
                "member {member} belongs to family {family} and cannot own another family"
            ),
            Self::AlreadyMember { family, member } => {
                write!(f, "member {member} already belongs to family {family}")
            }
            Self::NotAMember { family, member } => {
                write!(f, "member {member} does not belong to family {family}")
            }
            Self::NotOwner { family, actor } => {
                write!(f, "member {actor} is not the owner of family {family}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FamilyServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for FamilyServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct FamilyService<F: FamilyRepository, M: MemberRepository> {
    families: F,
    members: M,
}

impl<F: FamilyRepository, M: MemberRepository> FamilyService<F, M> {
    pub fn new(families: F, members: M) -> Self {
        Self { families, members }
    }

    /// Creates a family owned by `owner`, who also becomes its first member.
    pub fn create_family(
        &self,
        owner: MemberId,
        name: &str,
    ) -> Result<Family, FamilyServiceError> {
        self.ensure_member_exists(owner)?;

        if let Some(existing) = self.families.family_owned_by(owner)? {
            return Err(FamilyServiceError::AlreadyOwnsFamily {
                member: owner,
                family: existing.uuid,
            });
        }
        if let Some(other) = self.families.families_of_member(owner)?.into_iter().next() {
            return Err(FamilyServiceError::MemberOfOtherFamily {
                member: owner,
                family: other.uuid,
            });
        }

        let family = Family::new(name, owner);
        if self.families.find_by_name(&family.name)?.is_some() {
            return Err(FamilyServiceError::FamilyNameTaken(family.name));
        }

        let id = self.families.create_family(&family)?;
        info!("event=family_create module=service status=ok family_id={id} owner_id={owner}");
        self.families
            .get_family(id)?
            .ok_or(FamilyServiceError::FamilyNotFound(id))
    }

    /// Adds `member` to `family` as a regular member.
    pub fn join_family(
        &self,
        family: FamilyId,
        member: MemberId,
    ) -> Result<(), FamilyServiceError> {
        self.require_family(family)?;
        self.ensure_member_exists(member)?;

        if self.families.is_member(family, member)? {
            return Err(FamilyServiceError::AlreadyMember { family, member });
        }
        if let Some(owned) = self.families.family_owned_by(member)? {
            // Owner re-joining their own family after leaving the pool.
            if owned.uuid != family {
                return Err(FamilyServiceError::OwnerOfOtherFamily {
                    member,
                    owned: owned.uuid,
                });
            }
        }

        self.families.add_member(family, member)?;
        info!("event=family_join module=service status=ok family_id={family} member_id={member}");
        Ok(())
    }

    /// Removes `member` from `family`.
    pub fn remove_member(
        &self,
        actor: MemberId,
        family: FamilyId,
        member: MemberId,
    ) -> Result<(), FamilyServiceError> {
        let found = self.require_family(family)?;
        if actor != member && !found.is_owned_by(actor) {
            return Err(FamilyServiceError::NotOwner { family, actor });
        }
        if !self.families.remove_member(family, member)? {
            return Err(FamilyServiceError::NotAMember { family, member });
        }
        info!(
            "event=family_remove_member module=service status=ok family_id={family} member_id={member}"
        );
        Ok(())
    }

    pub fn get_family(&self, family: FamilyId) -> Result<Option<Family>, FamilyServiceError> {
        Ok(self.families.get_family(family)?)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Family>, FamilyServiceError> {
        Ok(self.families.find_by_name(name.trim())?)
    }

    /// Members in join order.
    pub fn list_members(&self, family: FamilyId) -> Result<Vec<Member>, FamilyServiceError> {
        self.require_family(family)?;
        Ok(self.families.list_members(family)?)
    }

    fn require_family(&self, family: FamilyId) -> Result<Family, FamilyServiceError> {
        self.families
            .get_family(family)?
            .ok_or(FamilyServiceError::FamilyNotFound(family))
    }

    fn ensure_member_exists(&self, member: MemberId) -> Result<(), FamilyServiceError> {
        self.members
            .get_member(member)?
            .map(|_| ())
            .ok_or(FamilyServiceError::MemberNotFound(member))
    }
}
