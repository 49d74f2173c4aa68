//! Per-day capacity scoring.
//!
//! # Invariants
//! - Only active blocks on the requested weekday count.
//! - A score of 0 disqualifies the member for that day; any other score is
//!   the total free minutes (higher means more slack).
//! - Overlapping blocks are summed without deduplication.

use crate::model::availability::AvailabilityBlock;
use crate::model::member::MemberId;
use crate::model::weekday::Weekday;
use crate::repo::availability_repo::AvailabilityRepository;
use crate::repo::RepoResult;

/// Sums free minutes of the active `blocks` that fall on `weekday`.
pub fn available_minutes(blocks: &[AvailabilityBlock], weekday: Weekday) -> u32 {
    blocks
        .iter()
        .filter(|block| block.is_active && block.weekday == weekday)
        .map(AvailabilityBlock::duration_minutes)
        .sum()
}

/// Turns free minutes into a score: 0 when short of `required_minutes`.
pub fn capacity_score(available: u32, required_minutes: u32) -> u32 {
    if available == 0 || available < required_minutes {
        return 0;
    }
    available
}

/// Loads `member`'s active blocks for `weekday` and scores them.
pub fn capacity<A>(
    availability: &A,
    member: MemberId,
    weekday: Weekday,
    required_minutes: u32,
) -> RepoResult<u32>
where
    A: AvailabilityRepository + ?Sized,
{
    let blocks = availability.list_active_blocks_on(member, weekday)?;
    if blocks.is_empty() {
        return Ok(0);
    }
    Ok(capacity_score(
        available_minutes(&blocks, weekday),
        required_minutes,
    ))
}
