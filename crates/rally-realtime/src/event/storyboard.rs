//! Storyboard events.

use serde::Deserialize;
use validator::Validate;

use rally_core::result::AppResult;
use rally_core::types::{ColumnId, GoalId, StoryId};
use rally_entity::{Phase, SessionKind};

use crate::message::validator::decode_payload;
use crate::permission::Access;

use super::common::CommonEvent;

/// Payload of `add_goal`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoalPayload {
    /// Label.
    #[validate(length(min = 1, max = 256))]
    pub name: String,
}

/// Payload of `revise_goal`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviseGoalPayload {
    /// Target goal.
    pub goal_id: GoalId,
    /// Label.
    #[validate(length(min = 1, max = 256))]
    pub name: String,
}

/// Payload naming a goal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoalRef {
    /// Target goal.
    pub goal_id: GoalId,
}

/// Payload of `add_column`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ColumnPayload {
    /// Owning goal.
    pub goal_id: GoalId,
    /// Label; may be empty.
    #[validate(length(max = 256))]
    #[serde(default)]
    pub name: String,
}

/// Payload of `revise_column`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviseColumnPayload {
    /// Target column.
    pub column_id: ColumnId,
    /// Label; may be empty.
    #[validate(length(max = 256))]
    pub name: String,
}

/// Payload naming a column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRef {
    /// Target column.
    pub column_id: ColumnId,
}

fn default_color() -> String {
    "gray".to_string()
}

/// Payload of `add_story`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddStoryPayload {
    /// Goal owning the column.
    pub goal_id: GoalId,
    /// Destination column.
    pub column_id: ColumnId,
    /// Title.
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    /// Body.
    #[validate(length(max = 10000))]
    #[serde(default)]
    pub content: String,
    /// Card colour.
    #[validate(length(min = 1, max = 32))]
    #[serde(default = "default_color")]
    pub color: String,
    /// Estimate.
    #[validate(range(max = 1000))]
    #[serde(default)]
    pub points: u32,
}

/// Payload of `update_story`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoryPayload {
    /// Target story.
    pub story_id: StoryId,
    /// Title.
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    /// Body.
    #[validate(length(max = 10000))]
    #[serde(default)]
    pub content: String,
    /// Card colour.
    #[validate(length(min = 1, max = 32))]
    #[serde(default = "default_color")]
    pub color: String,
    /// Estimate.
    #[validate(range(max = 1000))]
    #[serde(default)]
    pub points: u32,
    /// Finished.
    #[serde(default)]
    pub closed: bool,
}

/// Payload naming a story.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StoryRef {
    /// Target story.
    pub story_id: StoryId,
}

/// Payload of `move_story`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MoveStoryPayload {
    /// Story to move.
    pub story_id: StoryId,
    /// Goal owning the destination column.
    pub goal_id: GoalId,
    /// Destination column.
    pub column_id: ColumnId,
    /// Index within the column; clamped to its end.
    #[serde(default)]
    pub position: usize,
}

/// Events accepted on a storyboard connection.
#[derive(Debug, Clone, PartialEq)]
pub enum StoryboardEvent {
    /// Append a goal.
    AddGoal(GoalPayload),
    /// Rename a goal.
    ReviseGoal(ReviseGoalPayload),
    /// Delete a goal.
    DeleteGoal(GoalRef),
    /// Append a column.
    AddColumn(ColumnPayload),
    /// Rename a column.
    ReviseColumn(ReviseColumnPayload),
    /// Delete a column.
    DeleteColumn(ColumnRef),
    /// Append a story.
    AddStory(AddStoryPayload),
    /// Edit a story.
    UpdateStory(UpdateStoryPayload),
    /// Delete a story.
    DeleteStory(StoryRef),
    /// Move a story.
    MoveStory(MoveStoryPayload),
    /// Shared session event.
    Common(CommonEvent),
}

impl StoryboardEvent {
    /// Parse a storyboard event.
    pub fn parse(tag: &str, value: &str) -> AppResult<Self> {
        Ok(match tag {
            "add_goal" => Self::AddGoal(decode_payload(value)?),
            "revise_goal" => Self::ReviseGoal(decode_payload(value)?),
            "delete_goal" => Self::DeleteGoal(decode_payload(value)?),
            "add_column" => Self::AddColumn(decode_payload(value)?),
            "revise_column" => Self::ReviseColumn(decode_payload(value)?),
            "delete_column" => Self::DeleteColumn(decode_payload(value)?),
            "add_story" => Self::AddStory(decode_payload(value)?),
            "update_story" => Self::UpdateStory(decode_payload(value)?),
            "delete_story" => Self::DeleteStory(decode_payload(value)?),
            "move_story" => Self::MoveStory(decode_payload(value)?),
            other => Self::Common(CommonEvent::parse(SessionKind::Storyboard, other, value)?),
        })
    }

    /// Permission class.
    pub fn access(&self) -> Access {
        match self {
            Self::Common(c) => c.access(),
            Self::AddGoal(_)
            | Self::ReviseGoal(_)
            | Self::DeleteGoal(_)
            | Self::AddColumn(_)
            | Self::ReviseColumn(_)
            | Self::DeleteColumn(_)
            | Self::AddStory(_)
            | Self::UpdateStory(_)
            | Self::DeleteStory(_)
            | Self::MoveStory(_) => Access::Participant,
        }
    }

    /// Phase gates.
    pub fn phases(&self) -> Option<&'static [Phase]> {
        match self {
            Self::Common(_) => None,
            Self::AddGoal(_)
            | Self::ReviseGoal(_)
            | Self::DeleteGoal(_)
            | Self::AddColumn(_)
            | Self::ReviseColumn(_)
            | Self::DeleteColumn(_)
            | Self::AddStory(_)
            | Self::UpdateStory(_)
            | Self::DeleteStory(_)
            | Self::MoveStory(_) => Some(&[Phase::Mapping]),
        }
    }
}
