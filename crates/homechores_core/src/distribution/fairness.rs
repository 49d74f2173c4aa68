//! Winner selection among qualified candidates.
//!
//! # Invariants
//! - Lower pending load always wins; capacity only breaks load ties.
//! - The sort is stable, so full ties keep the caller's order.

use crate::model::member::MemberId;
use serde::Serialize;

/// One member qualified for one (template, weekday) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub member_uuid: MemberId,
    /// Free minutes on the day; always positive for a qualified candidate.
    pub capacity: u32,
    /// Pending instances currently assigned to the member.
    pub load: u32,
}

/// Orders candidates by `(load asc, capacity desc)`.
pub fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|left, right| {
        left.load
            .cmp(&right.load)
            .then_with(|| right.capacity.cmp(&left.capacity))
    });
}

/// Returns the best candidate, or `None` when nobody qualified.
pub fn pick_winner(mut candidates: Vec<Candidate>) -> Option<Candidate> {
    rank(&mut candidates);
    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::{pick_winner, rank, Candidate};
    use uuid::Uuid;

    fn candidate(capacity: u32, load: u32) -> Candidate {
        Candidate {
            member_uuid: Uuid::new_v4(),
            capacity,
            load,
        }
    }

    #[test]
    fn lower_load_beats_higher_capacity() {
        let busy = candidate(240, 3);
        let idle = candidate(30, 0);
        assert_eq!(pick_winner(vec![busy, idle]), Some(idle));
    }

    #[test]
    fn equal_load_prefers_more_capacity() {
        let short = candidate(30, 1);
        let long = candidate(90, 1);
        assert_eq!(pick_winner(vec![short, long]), Some(long));
    }

    #[test]
    fn full_ties_keep_input_order() {
        let first = candidate(60, 2);
        let second = candidate(60, 2);
        let mut ranked = vec![first, second];
        rank(&mut ranked);
        assert_eq!(ranked, vec![first, second]);
    }

    #[test]
    fn empty_pool_has_no_winner() {
        assert_eq!(pick_winner(Vec::new()), None);
    }
}
