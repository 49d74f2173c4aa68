//! Family (household) model.

use crate::model::member::MemberId;
use crate::model::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type FamilyId = Uuid;

/// Household group with exactly one owner.
///
/// The owner is placed in the member set when the family is created and may
/// later be removed from it, which takes them out of chore assignment
/// without giving up ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub uuid: FamilyId,
    pub name: String,
    pub owner_uuid: MemberId,
    /// Epoch ms, assigned by storage.
    pub created_at: i64,
}

impl Family {
    pub fn new(name: impl Into<String>, owner_uuid: MemberId) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            owner_uuid,
            created_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("family name", &self.name)
    }

    pub fn is_owned_by(&self, member_uuid: MemberId) -> bool {
        self.owner_uuid == member_uuid
    }
}
