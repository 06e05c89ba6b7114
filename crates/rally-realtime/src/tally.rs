//! Vote completeness for poker plans.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use rally_core::types::UserId;
use rally_entity::Participant;
use rally_entity::poker::Vote;

/// Completeness of the votes on one plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    /// The voters are exactly the eligible participants.
    pub all_voted: bool,
    /// Distinct voters.
    pub voted: usize,
    /// Active, non-spectator, non-abandoned participants.
    pub eligible: usize,
}

/// Compare the set of voters against the set of eligible participants.
/// Nobody eligible means nobody has voted yet.
pub fn tally(votes: &[Vote], participants: &[Participant]) -> Tally {
    let voters: HashSet<UserId> = votes.iter().map(|v| v.user_id).collect();
    let eligible: HashSet<UserId> = participants
        .iter()
        .filter(|p| p.is_eligible_voter())
        .map(|p| p.user_id)
        .collect();

    Tally {
        all_voted: !eligible.is_empty() && voters == eligible,
        voted: voters.len(),
        eligible: eligible.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(user_id: UserId) -> Participant {
        let mut p = Participant::new(user_id, "member");
        p.active = true;
        p
    }

    fn vote(user_id: UserId) -> Vote {
        Vote {
            user_id,
            value: Some("5".to_string()),
        }
    }

    #[test]
    fn test_all_voted_only_when_sets_match() {
        let (u1, u2) = (UserId::new(), UserId::new());
        let roster = vec![active(u1), active(u2)];

        assert!(!tally(&[vote(u1)], &roster).all_voted);
        let t = tally(&[vote(u1), vote(u2)], &roster);
        assert!(t.all_voted);
        assert_eq!((t.voted, t.eligible), (2, 2));
    }

    #[test]
    fn test_spectators_and_inactive_are_ignored() {
        let (u1, u2, u3) = (UserId::new(), UserId::new(), UserId::new());
        let mut spectator = active(u2);
        spectator.spectator = true;
        let mut away = active(u3);
        away.active = false;

        let t = tally(&[vote(u1)], &[active(u1), spectator, away]);
        assert!(t.all_voted);
        assert_eq!(t.eligible, 1);
    }

    #[test]
    fn test_vote_from_ineligible_user_breaks_equality() {
        let (u1, gone) = (UserId::new(), UserId::new());
        let t = tally(&[vote(u1), vote(gone)], &[active(u1)]);
        assert!(!t.all_voted);
    }

    #[test]
    fn test_empty_room_is_never_complete() {
        assert!(!tally(&[], &[]).all_voted);
    }
}
