//! Planning-poker plans and votes.

use serde::{Deserialize, Serialize};

use rally_core::types::{PlanId, UserId};

/// One participant's estimate for a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    /// Voter.
    pub user_id: UserId,
    /// Estimate; `None` when redacted for broadcast.
    pub value: Option<String>,
}

/// A story to estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Plan ID.
    pub id: PlanId,
    /// Title.
    pub name: String,
    /// Optional tracker link.
    pub link: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Recorded votes, one per user.
    pub votes: Vec<Vote>,
    /// Currently open for estimation.
    pub active: bool,
    /// Skipped by the facilitator.
    pub skipped: bool,
    /// Final agreed estimate.
    pub points: Option<String>,
}

impl Plan {
    /// A new, inactive plan with no votes.
    pub fn new(name: impl Into<String>, link: Option<String>, description: Option<String>) -> Self {
        Self {
            id: PlanId::new(),
            name: name.into(),
            link,
            description,
            votes: Vec::new(),
            active: false,
            skipped: false,
            points: None,
        }
    }

    /// Copy with every vote value stripped; voter IDs are kept.
    pub fn without_vote_values(&self) -> Self {
        let mut plan = self.clone();
        for vote in &mut plan.votes {
            vote.value = None;
        }
        plan
    }
}

/// Poker board content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokerBoard {
    /// Plans in creation order.
    pub plans: Vec<Plan>,
    /// Plan currently open for estimation.
    pub active_plan_id: Option<PlanId>,
    /// Voting ended on the active plan.
    pub voting_locked: bool,
}

impl PokerBoard {
    /// Whether votes are currently being collected.
    pub fn voting_open(&self) -> bool {
        self.active_plan_id.is_some() && !self.voting_locked
    }
}
