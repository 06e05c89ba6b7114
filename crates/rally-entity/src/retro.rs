//! Retrospective items, groups, and actions.

use serde::{Deserialize, Serialize};

use rally_core::types::{ActionId, GroupId, ItemId, UserId};

/// Column an item was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    /// Went well.
    Worked,
    /// Needs improvement.
    Improve,
    /// Open question.
    Question,
}

/// A brainstormed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetroItem {
    /// Item ID.
    pub id: ItemId,
    /// Author.
    pub user_id: UserId,
    /// Column.
    pub category: ItemCategory,
    /// Text.
    pub content: String,
    /// Group the item belongs to.
    pub group_id: GroupId,
}

/// A cluster of items that participants vote on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetroGroup {
    /// Group ID.
    pub id: GroupId,
    /// Optional label.
    pub name: Option<String>,
    /// One entry per vote cast; a user may appear several times.
    pub votes: Vec<UserId>,
}

/// An agreed follow-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetroAction {
    /// Action ID.
    pub id: ActionId,
    /// Text.
    pub content: String,
    /// Done.
    pub completed: bool,
}

/// Items together with the groups they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetroItems {
    /// Items in creation order.
    pub items: Vec<RetroItem>,
    /// Groups in creation order.
    pub groups: Vec<RetroGroup>,
}

/// Retro board content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetroBoard {
    /// Items in creation order.
    pub items: Vec<RetroItem>,
    /// Groups in creation order.
    pub groups: Vec<RetroGroup>,
    /// Action items.
    pub actions: Vec<RetroAction>,
    /// Users who marked themselves ready in the current phase.
    pub ready_users: Vec<UserId>,
}

impl RetroBoard {
    /// Number of group votes the user has cast.
    pub fn votes_cast_by(&self, user_id: UserId) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.votes.iter())
            .filter(|v| **v == user_id)
            .count()
    }

    /// Item and group slice of the board.
    pub fn items_slice(&self) -> RetroItems {
        RetroItems {
            items: self.items.clone(),
            groups: self.groups.clone(),
        }
    }
}
