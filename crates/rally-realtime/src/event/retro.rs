//! Retrospective events.

use serde::Deserialize;
use validator::Validate;

use rally_core::result::AppResult;
use rally_core::types::{ActionId, GroupId, ItemId};
use rally_entity::retro::ItemCategory;
use rally_entity::{Phase, SessionKind};

use crate::message::validator::decode_payload;
use crate::permission::Access;

use super::common::CommonEvent;

/// Payload of `create_item`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    /// Column.
    pub category: ItemCategory,
    /// Text.
    #[validate(length(min = 1, max = 1024))]
    pub content: String,
}

/// Payload naming an item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    /// Target item.
    pub item_id: ItemId,
}

/// Payload of `group_item`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GroupItemPayload {
    /// Item to move.
    pub item_id: ItemId,
    /// Destination group; a new group when absent.
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

/// Payload of `group_name_change`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GroupNamePayload {
    /// Target group.
    pub group_id: GroupId,
    /// New label; empty clears it.
    #[validate(length(max = 256))]
    pub name: String,
}

/// Payload naming a group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GroupRef {
    /// Target group.
    pub group_id: GroupId,
}

/// Payload of `add_action`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayload {
    /// Text.
    #[validate(length(min = 1, max = 1024))]
    pub content: String,
}

/// Payload of `update_action`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActionPayload {
    /// Target action.
    pub action_id: ActionId,
    /// Text.
    #[validate(length(min = 1, max = 1024))]
    pub content: String,
    /// Done.
    #[serde(default)]
    pub completed: bool,
}

/// Payload naming an action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActionRef {
    /// Target action.
    pub action_id: ActionId,
}

/// Events accepted on a retro connection.
#[derive(Debug, Clone, PartialEq)]
pub enum RetroEvent {
    /// Add an item.
    CreateItem(CreateItemPayload),
    /// Delete one of the sender's items.
    DeleteItem(ItemRef),
    /// Move an item between groups.
    GroupItem(GroupItemPayload),
    /// Label a group.
    GroupNameChange(GroupNamePayload),
    /// Vote for a group.
    GroupVote(GroupRef),
    /// Withdraw a group vote.
    GroupDownvote(GroupRef),
    /// Add an action item.
    AddAction(ActionPayload),
    /// Edit an action item.
    UpdateAction(UpdateActionPayload),
    /// Delete an action item.
    DeleteAction(ActionRef),
    /// Sender is ready for the next phase.
    MarkReady,
    /// Sender is no longer ready.
    MarkUnready,
    /// Shared session event.
    Common(CommonEvent),
}

impl RetroEvent {
    /// Parse a retro event.
    pub fn parse(tag: &str, value: &str) -> AppResult<Self> {
        Ok(match tag {
            "create_item" => Self::CreateItem(decode_payload(value)?),
            "delete_item" => Self::DeleteItem(decode_payload(value)?),
            "group_item" => Self::GroupItem(decode_payload(value)?),
            "group_name_change" => Self::GroupNameChange(decode_payload(value)?),
            "group_vote" => Self::GroupVote(decode_payload(value)?),
            "group_downvote" => Self::GroupDownvote(decode_payload(value)?),
            "add_action" => Self::AddAction(decode_payload(value)?),
            "update_action" => Self::UpdateAction(decode_payload(value)?),
            "delete_action" => Self::DeleteAction(decode_payload(value)?),
            "user_marked_ready" => Self::MarkReady,
            "user_marked_unready" => Self::MarkUnready,
            other => Self::Common(CommonEvent::parse(SessionKind::Retro, other, value)?),
        })
    }

    /// Permission class.
    pub fn access(&self) -> Access {
        match self {
            Self::CreateItem(_)
            | Self::DeleteItem(_)
            | Self::GroupItem(_)
            | Self::GroupNameChange(_)
            | Self::GroupVote(_)
            | Self::GroupDownvote(_)
            | Self::AddAction(_)
            | Self::UpdateAction(_)
            | Self::DeleteAction(_)
            | Self::MarkReady
            | Self::MarkUnready => Access::Participant,
            Self::Common(c) => c.access(),
        }
    }

    /// Phase gates.
    pub fn phases(&self) -> Option<&'static [Phase]> {
        match self {
            Self::CreateItem(_) => Some(&[Phase::Brainstorm]),
            Self::DeleteItem(_) => Some(&[Phase::Brainstorm, Phase::Group]),
            Self::GroupItem(_) | Self::GroupNameChange(_) => Some(&[Phase::Group]),
            Self::GroupVote(_) | Self::GroupDownvote(_) => Some(&[Phase::Vote]),
            Self::AddAction(_) | Self::UpdateAction(_) | Self::DeleteAction(_) => {
                Some(&[Phase::Action])
            }
            Self::MarkReady | Self::MarkUnready | Self::Common(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_item_gated_to_brainstorm() {
        let event =
            RetroEvent::parse("create_item", r#"{"category":"improve","content":"Flaky CI"}"#)
                .unwrap();
        assert_eq!(event.phases(), Some(&[Phase::Brainstorm][..]));
        assert_eq!(event.access(), Access::Participant);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        assert!(
            RetroEvent::parse("create_item", r#"{"category":"meh","content":"x"}"#).is_err()
        );
    }

    #[test]
    fn test_ready_markers_need_no_payload() {
        assert_eq!(
            RetroEvent::parse("user_marked_ready", "").unwrap(),
            RetroEvent::MarkReady
        );
        assert_eq!(RetroEvent::MarkUnready.phases(), None);
    }

    #[test]
    fn test_poker_tags_are_unknown() {
        let plan = format!(r#"{{"planId":"{}"}}"#, rally_core::types::PlanId::new());
        assert!(RetroEvent::parse("end_voting", &plan).is_err());
    }
}
