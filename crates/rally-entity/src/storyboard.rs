//! Story-mapping goals, columns, and stories.

use serde::{Deserialize, Serialize};

use rally_core::types::{ColumnId, GoalId, StoryId, UserId};

/// A card on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Story ID.
    pub id: StoryId,
    /// Title.
    pub name: String,
    /// Body text.
    pub content: String,
    /// Card colour.
    pub color: String,
    /// Estimate.
    pub points: u32,
    /// Finished.
    pub closed: bool,
    /// Author.
    pub created_by: UserId,
}

/// A vertical lane within a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column ID.
    pub id: ColumnId,
    /// Label.
    pub name: String,
    /// Cards top to bottom.
    pub stories: Vec<Story>,
}

/// A horizontal swimlane of the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Goal ID.
    pub id: GoalId,
    /// Label.
    pub name: String,
    /// Columns left to right.
    pub columns: Vec<Column>,
}

/// Storyboard content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardBoard {
    /// Goals top to bottom.
    pub goals: Vec<Goal>,
}
