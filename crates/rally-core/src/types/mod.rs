//! Shared value types.

pub mod id;

pub use id::{
    ActionId, AlertId, ColumnId, ConnectionId, GoalId, GroupId, ItemId, PlanId, SessionId, StoryId,
    UserId,
};
