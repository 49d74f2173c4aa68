//! Weekly availability use-cases.
//!
//! Thin wrapper over the repository; validation happens on write.

use crate::model::availability::{AvailabilityBlock, AvailabilityBlockId};
use crate::model::member::MemberId;
use crate::model::weekday::Weekday;
use crate::repo::availability_repo::AvailabilityRepository;
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveTime;

pub struct AvailabilityService<R: AvailabilityRepository> {
    repo: R,
}

impl<R: AvailabilityRepository> AvailabilityService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds an active block. Blocks ending at or before their start are
    /// rejected; split midnight-crossing windows into two days.
    pub fn add_block(
        &self,
        member: MemberId,
        weekday: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    ) -> RepoResult<AvailabilityBlock> {
        let block = AvailabilityBlock::new(member, weekday, start, end);
        self.repo.create_block(&block)?;
        Ok(block)
    }

    pub fn set_block_active(&self, id: AvailabilityBlockId, is_active: bool) -> RepoResult<()> {
        self.repo.set_block_active(id, is_active)
    }

    pub fn delete_block(&self, id: AvailabilityBlockId) -> RepoResult<()> {
        self.repo.delete_block(id)
    }

    pub fn get_block(&self, id: AvailabilityBlockId) -> RepoResult<AvailabilityBlock> {
        self.repo.get_block(id)?.ok_or(RepoError::NotFound {
            entity: "availability block",
            id,
        })
    }

    pub fn list_blocks(&self, member: MemberId) -> RepoResult<Vec<AvailabilityBlock>> {
        self.repo.list_blocks(member)
    }
}
