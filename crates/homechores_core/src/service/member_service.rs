//! Member registration and profile use-cases.
//!
//! # Invariants
//! - Registration always produces a profile; there is no profile-less path.
//! - Usernames are unique after trim.

use crate::model::member::{Member, MemberId, Profile};
use crate::repo::member_repo::MemberRepository;
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum MemberServiceError {
    UsernameTaken(String),
    MemberNotFound(MemberId),
    Repo(RepoError),
}

impl Display for MemberServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsernameTaken(name) => write!(f, "username already registered: `{name}`"),
            Self::MemberNotFound(id) => write!(f, "member not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MemberServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for MemberServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::MemberNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct MemberService<R: MemberRepository> {
    repo: R,
}

impl<R: MemberRepository> MemberService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a member and its profile.
    pub fn register_member(
        &self,
        username: &str,
        birth_date: Option<NaiveDate>,
    ) -> Result<Member, MemberServiceError> {
        let member = Member::new(username, birth_date);
        if self.repo.find_by_username(&member.username)?.is_some() {
            return Err(MemberServiceError::UsernameTaken(member.username));
        }

        let id = self.repo.create_member(&member)?;
        info!("event=member_register module=service status=ok member_id={id}");
        self.repo
            .get_member(id)?
            .ok_or(MemberServiceError::MemberNotFound(id))
    }

    pub fn get_member(&self, id: MemberId) -> Result<Option<Member>, MemberServiceError> {
        Ok(self.repo.get_member(id)?)
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<Member>, MemberServiceError> {
        Ok(self.repo.find_by_username(username)?)
    }

    /// Replaces the birth date; `None` makes the age unknown (treated as 0).
    pub fn update_birth_date(
        &self,
        id: MemberId,
        birth_date: Option<NaiveDate>,
    ) -> Result<(), MemberServiceError> {
        self.repo.update_profile(id, &Profile { birth_date })?;
        Ok(())
    }
}
