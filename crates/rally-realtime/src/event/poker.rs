//! Planning-poker events.

use serde::Deserialize;
use validator::Validate;

use rally_core::result::AppResult;
use rally_core::types::PlanId;
use rally_entity::{Phase, SessionKind};

use crate::message::validator::decode_payload;
use crate::permission::Access;

use super::common::{CommonEvent, UserRef};

/// Payload of `vote`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VotePayload {
    /// Plan being estimated.
    pub plan_id: PlanId,
    /// One of the session's point values.
    #[validate(length(min = 1, max = 16))]
    pub vote_value: String,
}

/// Payload naming a plan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlanRef {
    /// Target plan.
    pub plan_id: PlanId,
}

/// Payload of `add_plan`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlanPayload {
    /// Title.
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    /// Tracker link.
    #[validate(length(max = 2048))]
    #[serde(default)]
    pub link: Option<String>,
    /// Description.
    #[validate(length(max = 10000))]
    #[serde(default)]
    pub description: Option<String>,
}

/// Payload of `revise_plan`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RevisePlanPayload {
    /// Target plan.
    pub plan_id: PlanId,
    /// Title.
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    /// Tracker link.
    #[validate(length(max = 2048))]
    #[serde(default)]
    pub link: Option<String>,
    /// Description.
    #[validate(length(max = 10000))]
    #[serde(default)]
    pub description: Option<String>,
}

/// Payload of `finalize_plan`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FinalizePayload {
    /// Target plan.
    pub plan_id: PlanId,
    /// Agreed estimate.
    #[validate(length(min = 1, max = 16))]
    pub points: String,
}

/// Payload of `spectator_toggle`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpectatorPayload {
    /// New spectator flag for the sender.
    pub spectator: bool,
}

/// Events accepted on a poker connection.
#[derive(Debug, Clone, PartialEq)]
pub enum PokerEvent {
    /// Cast or replace a vote.
    Vote(VotePayload),
    /// Withdraw a vote.
    RetractVote(PlanRef),
    /// Lock voting on the active plan.
    EndVoting(PlanRef),
    /// Append a plan.
    AddPlan(PlanPayload),
    /// Edit a plan.
    RevisePlan(RevisePlanPayload),
    /// Delete a plan.
    BurnPlan(PlanRef),
    /// Open voting on a plan.
    ActivatePlan(PlanRef),
    /// Skip a plan.
    SkipPlan(PlanRef),
    /// Record the agreed estimate.
    FinalizePlan(FinalizePayload),
    /// Toggle the sender's spectator flag.
    SpectatorToggle(SpectatorPayload),
    /// Nudge a participant.
    JabWarrior(UserRef),
    /// Shared session event.
    Common(CommonEvent),
}

impl PokerEvent {
    /// Parse a poker event.
    pub fn parse(tag: &str, value: &str) -> AppResult<Self> {
        Ok(match tag {
            "vote" => Self::Vote(decode_payload(value)?),
            "retract_vote" => Self::RetractVote(decode_payload(value)?),
            "end_voting" => Self::EndVoting(decode_payload(value)?),
            "add_plan" => Self::AddPlan(decode_payload(value)?),
            "revise_plan" => Self::RevisePlan(decode_payload(value)?),
            "burn_plan" => Self::BurnPlan(decode_payload(value)?),
            "activate_plan" => Self::ActivatePlan(decode_payload(value)?),
            "skip_plan" => Self::SkipPlan(decode_payload(value)?),
            "finalize_plan" => Self::FinalizePlan(decode_payload(value)?),
            "spectator_toggle" => Self::SpectatorToggle(decode_payload(value)?),
            "jab_warrior" => Self::JabWarrior(decode_payload(value)?),
            other => Self::Common(CommonEvent::parse(SessionKind::Poker, other, value)?),
        })
    }

    /// Permission class.
    pub fn access(&self) -> Access {
        match self {
            Self::Vote(_) | Self::RetractVote(_) | Self::SpectatorToggle(_) => Access::Participant,
            Self::EndVoting(_)
            | Self::AddPlan(_)
            | Self::RevisePlan(_)
            | Self::BurnPlan(_)
            | Self::ActivatePlan(_)
            | Self::SkipPlan(_)
            | Self::FinalizePlan(_)
            | Self::JabWarrior(_) => Access::Facilitator,
            Self::Common(c) => c.access(),
        }
    }

    /// Phase gates.
    pub fn phases(&self) -> Option<&'static [Phase]> {
        match self {
            Self::Vote(_) | Self::RetractVote(_) | Self::EndVoting(_) | Self::FinalizePlan(_) => {
                Some(&[Phase::Voting])
            }
            Self::ActivatePlan(_) | Self::SkipPlan(_) => Some(&[Phase::Lobby, Phase::Voting]),
            Self::AddPlan(_)
            | Self::RevisePlan(_)
            | Self::BurnPlan(_)
            | Self::SpectatorToggle(_)
            | Self::JabWarrior(_)
            | Self::Common(_) => None,
        }
    }
}
