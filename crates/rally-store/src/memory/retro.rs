//! [`RetroStore`] for [`MemoryStore`].

use async_trait::async_trait;

use rally_core::error::AppError;
use rally_core::result::AppResult;
use rally_core::types::{ActionId, GroupId, ItemId, SessionId, UserId};
use rally_entity::retro::{
    ItemCategory, RetroAction, RetroBoard, RetroGroup, RetroItem, RetroItems,
};

use super::MemoryStore;
use crate::traits::RetroStore;

fn new_group(board: &mut RetroBoard) -> GroupId {
    let id = GroupId::new();
    board.groups.push(RetroGroup {
        id,
        name: None,
        votes: Vec::new(),
    });
    id
}

/// Drop groups that no longer hold any item.
fn prune_groups(board: &mut RetroBoard) {
    let RetroBoard { items, groups, .. } = board;
    groups.retain(|g| items.iter().any(|i| i.group_id == g.id));
}

fn group_mut(board: &mut RetroBoard, group_id: GroupId) -> AppResult<&mut RetroGroup> {
    board
        .groups
        .iter_mut()
        .find(|g| g.id == group_id)
        .ok_or_else(|| AppError::not_found(format!("Group {group_id} not found")))
}

fn action_mut(board: &mut RetroBoard, action_id: ActionId) -> AppResult<&mut RetroAction> {
    board
        .actions
        .iter_mut()
        .find(|a| a.id == action_id)
        .ok_or_else(|| AppError::not_found(format!("Action {action_id} not found")))
}

#[async_trait]
impl RetroStore for MemoryStore {
    async fn get_retro_board(&self, session_id: SessionId) -> AppResult<RetroBoard> {
        self.read(session_id, |r| Ok(r.retro()?.clone()))
    }

    async fn create_item(
        &self,
        session_id: SessionId,
        user_id: UserId,
        category: ItemCategory,
        content: &str,
    ) -> AppResult<RetroItems> {
        self.write(session_id, |r| {
            let board = r.retro_mut()?;
            let group_id = new_group(board);
            board.items.push(RetroItem {
                id: ItemId::new(),
                user_id,
                category,
                content: content.to_string(),
                group_id,
            });
            Ok(board.items_slice())
        })
    }

    async fn delete_item(&self, session_id: SessionId, item_id: ItemId) -> AppResult<RetroItems> {
        self.write(session_id, |r| {
            let board = r.retro_mut()?;
            let before = board.items.len();
            board.items.retain(|i| i.id != item_id);
            if board.items.len() == before {
                return Err(AppError::not_found(format!("Item {item_id} not found")));
            }
            prune_groups(board);
            Ok(board.items_slice())
        })
    }

    async fn group_item(
        &self,
        session_id: SessionId,
        item_id: ItemId,
        group_id: Option<GroupId>,
    ) -> AppResult<RetroItems> {
        self.write(session_id, |r| {
            let board = r.retro_mut()?;
            if !board.items.iter().any(|i| i.id == item_id) {
                return Err(AppError::not_found(format!("Item {item_id} not found")));
            }
            let target = match group_id {
                Some(id) => {
                    group_mut(board, id)?;
                    id
                }
                None => new_group(board),
            };
            if let Some(item) = board.items.iter_mut().find(|i| i.id == item_id) {
                item.group_id = target;
            }
            prune_groups(board);
            Ok(board.items_slice())
        })
    }

    async fn rename_group(
        &self,
        session_id: SessionId,
        group_id: GroupId,
        name: &str,
    ) -> AppResult<RetroItems> {
        self.write(session_id, |r| {
            let board = r.retro_mut()?;
            let trimmed = name.trim();
            group_mut(board, group_id)?.name = (!trimmed.is_empty()).then(|| trimmed.to_string());
            Ok(board.items_slice())
        })
    }

    async fn group_vote(
        &self,
        session_id: SessionId,
        group_id: GroupId,
        user_id: UserId,
    ) -> AppResult<Vec<RetroGroup>> {
        self.write(session_id, |r| {
            let board = r.retro_mut()?;
            group_mut(board, group_id)?.votes.push(user_id);
            Ok(board.groups.clone())
        })
    }

    async fn group_downvote(
        &self,
        session_id: SessionId,
        group_id: GroupId,
        user_id: UserId,
    ) -> AppResult<Vec<RetroGroup>> {
        self.write(session_id, |r| {
            let board = r.retro_mut()?;
            let group = group_mut(board, group_id)?;
            if let Some(pos) = group.votes.iter().position(|v| *v == user_id) {
                group.votes.remove(pos);
            }
            Ok(board.groups.clone())
        })
    }

    async fn add_action(
        &self,
        session_id: SessionId,
        content: &str,
    ) -> AppResult<Vec<RetroAction>> {
        self.write(session_id, |r| {
            let board = r.retro_mut()?;
            board.actions.push(RetroAction {
                id: ActionId::new(),
                content: content.to_string(),
                completed: false,
            });
            Ok(board.actions.clone())
        })
    }

    async fn update_action(
        &self,
        session_id: SessionId,
        action_id: ActionId,
        content: &str,
        completed: bool,
    ) -> AppResult<Vec<RetroAction>> {
        self.write(session_id, |r| {
            let board = r.retro_mut()?;
            let action = action_mut(board, action_id)?;
            action.content = content.to_string();
            action.completed = completed;
            Ok(board.actions.clone())
        })
    }

    async fn delete_action(
        &self,
        session_id: SessionId,
        action_id: ActionId,
    ) -> AppResult<Vec<RetroAction>> {
        self.write(session_id, |r| {
            let board = r.retro_mut()?;
            action_mut(board, action_id)?;
            board.actions.retain(|a| a.id != action_id);
            Ok(board.actions.clone())
        })
    }

    async fn mark_ready(&self, session_id: SessionId, user_id: UserId) -> AppResult<Vec<UserId>> {
        self.write(session_id, |r| {
            let board = r.retro_mut()?;
            if !board.ready_users.contains(&user_id) {
                board.ready_users.push(user_id);
            }
            Ok(board.ready_users.clone())
        })
    }

    async fn mark_unready(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> AppResult<Vec<UserId>> {
        self.write(session_id, |r| {
            let board = r.retro_mut()?;
            board.ready_users.retain(|id| *id != user_id);
            Ok(board.ready_users.clone())
        })
    }
}
