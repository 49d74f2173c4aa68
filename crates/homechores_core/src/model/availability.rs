//! Weekly availability blocks.
//!
//! # Invariants
//! - A block covers one clock interval inside a single day: `end > start`.
//! - Blocks are not checked for overlap; overlapping blocks on the same day
//!   are summed as-is.

use crate::model::member::MemberId;
use crate::model::weekday::Weekday;
use crate::model::ValidationError;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AvailabilityBlockId = Uuid;

/// Time window in which a member can take on chores, repeated weekly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityBlock {
    pub uuid: AvailabilityBlockId,
    pub member_uuid: MemberId,
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub is_active: bool,
}

impl AvailabilityBlock {
    /// Creates an active block with a generated ID.
    pub fn new(member_uuid: MemberId, weekday: Weekday, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            member_uuid,
            weekday,
            start,
            end,
            is_active: true,
        }
    }

    /// Rejects blocks whose end is not later than their start.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.end <= self.start {
            return Err(ValidationError::InvertedTimeRange {
                start: self.start.format("%H:%M").to_string(),
                end: self.end.format("%H:%M").to_string(),
            });
        }
        Ok(())
    }

    /// Length of the block in whole minutes.
    pub fn duration_minutes(&self) -> u32 {
        u32::try_from((self.end - self.start).num_minutes()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::AvailabilityBlock;
    use crate::model::weekday::Weekday;
    use chrono::NaiveTime;
    use uuid::Uuid;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn duration_is_measured_in_minutes() {
        let block = AvailabilityBlock::new(Uuid::new_v4(), Weekday::Monday, time(8, 15), time(9, 45));
        assert!(block.validate().is_ok());
        assert_eq!(block.duration_minutes(), 90);
    }

    #[test]
    fn midnight_crossing_and_empty_blocks_are_rejected() {
        let member = Uuid::new_v4();
        let crossing = AvailabilityBlock::new(member, Weekday::Friday, time(22, 0), time(1, 0));
        let empty = AvailabilityBlock::new(member, Weekday::Friday, time(7, 0), time(7, 0));
        assert!(crossing.validate().is_err());
        assert!(empty.validate().is_err());
    }
}
