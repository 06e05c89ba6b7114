//! Events shared by every session kind.

use serde::Deserialize;
use validator::Validate;

use rally_core::result::AppResult;
use rally_core::types::UserId;
use rally_entity::{Phase, SessionKind};

use crate::message::validator::{decode_optional_payload, decode_payload};
use crate::permission::Access;

use super::unknown_event;

/// Payload of `advance_phase`; no target means "next phase".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdvancePhasePayload {
    /// Explicit target phase.
    #[serde(default)]
    pub phase: Option<Phase>,
}

/// Payload naming another user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    /// Target user.
    pub user_id: UserId,
}

/// Payload of `self_facilitator`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FacilitatorCodePayload {
    /// Plaintext facilitator code.
    #[validate(length(min = 1, max = 128))]
    pub code: String,
}

/// Session-level events accepted by every kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommonEvent {
    /// Move the phase forward.
    AdvancePhase(AdvancePhasePayload),
    /// Promote a participant to facilitator.
    AddFacilitator(UserRef),
    /// Demote a facilitator.
    RemoveFacilitator(UserRef),
    /// Promote self with the facilitator code.
    SelfFacilitator(FacilitatorCodePayload),
    /// Ask for a fresh snapshot.
    Sync,
    /// Facilitator ends and deletes the session.
    Concede,
    /// Leave the session permanently.
    Abandon,
}

impl CommonEvent {
    /// Parse a shared event; `concede_*`/`abandon_*` use the kind's noun.
    pub fn parse(kind: SessionKind, tag: &str, value: &str) -> AppResult<Self> {
        let noun = kind.event_noun();
        Ok(match tag {
            "advance_phase" => Self::AdvancePhase(decode_optional_payload(value)?),
            "add_facilitator" => Self::AddFacilitator(decode_payload(value)?),
            "remove_facilitator" => Self::RemoveFacilitator(decode_payload(value)?),
            "self_facilitator" => Self::SelfFacilitator(decode_payload(value)?),
            "sync" => Self::Sync,
            _ => match tag.split_once('_') {
                Some(("concede", n)) if n == noun => Self::Concede,
                Some(("abandon", n)) if n == noun => Self::Abandon,
                _ => return Err(unknown_event(kind, tag)),
            },
        })
    }

    /// Permission class.
    pub fn access(&self) -> Access {
        match self {
            Self::AdvancePhase(_)
            | Self::AddFacilitator(_)
            | Self::RemoveFacilitator(_)
            | Self::Concede => Access::Facilitator,
            Self::SelfFacilitator(_) | Self::Sync | Self::Abandon => Access::Participant,
        }
    }

    /// `sync` reads; `advance_phase` can only be a no-op once completed.
    pub fn allowed_when_completed(&self) -> bool {
        match self {
            Self::Sync | Self::AdvancePhase(_) => true,
            Self::AddFacilitator(_)
            | Self::RemoveFacilitator(_)
            | Self::SelfFacilitator(_)
            | Self::Concede
            | Self::Abandon => false,
        }
    }
}
