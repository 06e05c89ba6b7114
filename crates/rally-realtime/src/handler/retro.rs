//! Retrospective handlers.

use serde::Serialize;

use rally_auth::Identity;
use rally_core::error::{AppError, reason};
use rally_core::result::AppResult;
use rally_core::types::UserId;
use rally_entity::Session;
use rally_entity::retro::{RetroAction, RetroGroup, RetroItems};

use crate::event::RetroEvent;
use crate::message::builder;
use crate::message::types::tags;

use super::{HandlerContext, Outcome, common};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Ready<'a> {
    ready_users: &'a [UserId],
}

/// Handle a retro event.
pub async fn handle(
    ctx: &HandlerContext,
    session: &Session,
    caller: &Identity,
    event: RetroEvent,
) -> AppResult<Outcome> {
    let id = session.id;
    match event {
        RetroEvent::CreateItem(payload) => {
            let items = ctx
                .store
                .create_item(id, caller.user_id, payload.category, payload.content.trim())
                .await?;
            items_updated(&items, caller)
        }
        RetroEvent::DeleteItem(payload) => {
            let board = ctx.store.get_retro_board(id).await?;
            let item = board
                .items
                .iter()
                .find(|i| i.id == payload.item_id)
                .ok_or_else(|| AppError::not_found(format!("Item {} not found", payload.item_id)))?;
            if item.user_id != caller.user_id && !ctx.guard.is_facilitator(session, caller).await? {
                return Err(AppError::authorization(
                    "Only the author or a facilitator may delete this item",
                ));
            }
            let items = ctx.store.delete_item(id, payload.item_id).await?;
            items_updated(&items, caller)
        }
        RetroEvent::GroupItem(payload) => {
            let items = ctx
                .store
                .group_item(id, payload.item_id, payload.group_id)
                .await?;
            items_updated(&items, caller)
        }
        RetroEvent::GroupNameChange(payload) => {
            let items = ctx
                .store
                .rename_group(id, payload.group_id, &payload.name)
                .await?;
            items_updated(&items, caller)
        }
        RetroEvent::GroupVote(payload) => {
            let board = ctx.store.get_retro_board(id).await?;
            let limit = session.settings.max_votes as usize;
            if board.votes_cast_by(caller.user_id) >= limit {
                return Err(AppError::conflict(format!(
                    "You have already used all {limit} votes"
                ))
                .with_reason(reason::VOTE_LIMIT_REACHED));
            }
            let groups = ctx
                .store
                .group_vote(id, payload.group_id, caller.user_id)
                .await?;
            votes_updated(&groups, caller)
        }
        RetroEvent::GroupDownvote(payload) => {
            let groups = ctx
                .store
                .group_downvote(id, payload.group_id, caller.user_id)
                .await?;
            votes_updated(&groups, caller)
        }
        RetroEvent::AddAction(payload) => {
            let actions = ctx.store.add_action(id, payload.content.trim()).await?;
            actions_updated(&actions, caller)
        }
        RetroEvent::UpdateAction(payload) => {
            let actions = ctx
                .store
                .update_action(
                    id,
                    payload.action_id,
                    payload.content.trim(),
                    payload.completed,
                )
                .await?;
            actions_updated(&actions, caller)
        }
        RetroEvent::DeleteAction(payload) => {
            let actions = ctx.store.delete_action(id, payload.action_id).await?;
            actions_updated(&actions, caller)
        }
        RetroEvent::MarkReady => {
            let ready = ctx.store.mark_ready(id, caller.user_id).await?;
            ready_updated(&ready, caller)
        }
        RetroEvent::MarkUnready => {
            let ready = ctx.store.mark_unready(id, caller.user_id).await?;
            ready_updated(&ready, caller)
        }
        RetroEvent::Common(event) => common::handle(ctx, session, caller, event).await,
    }
}

fn items_updated(items: &RetroItems, caller: &Identity) -> AppResult<Outcome> {
    Ok(Outcome::broadcast(builder::build(
        tags::ITEMS_UPDATED,
        items,
        Some(caller.user_id),
    )?))
}

fn votes_updated(groups: &[RetroGroup], caller: &Identity) -> AppResult<Outcome> {
    Ok(Outcome::broadcast(builder::build(
        tags::VOTES_UPDATED,
        groups,
        Some(caller.user_id),
    )?))
}

fn actions_updated(actions: &[RetroAction], caller: &Identity) -> AppResult<Outcome> {
    Ok(Outcome::broadcast(builder::build(
        tags::ACTIONS_UPDATED,
        actions,
        Some(caller.user_id),
    )?))
}

fn ready_updated(ready_users: &[UserId], caller: &Identity) -> AppResult<Outcome> {
    Ok(Outcome::broadcast(builder::build(
        tags::READY_UPDATED,
        &Ready { ready_users },
        Some(caller.user_id),
    )?))
}
