//! [`PokerStore`] for [`MemoryStore`].

use async_trait::async_trait;

use rally_core::error::AppError;
use rally_core::result::AppResult;
use rally_core::types::{PlanId, SessionId, UserId};
use rally_entity::poker::{Plan, PokerBoard, Vote};

use super::MemoryStore;
use crate::traits::{PlanDraft, PokerStore};

fn plan_mut(board: &mut PokerBoard, plan_id: PlanId) -> AppResult<&mut Plan> {
    board
        .plans
        .iter_mut()
        .find(|p| p.id == plan_id)
        .ok_or_else(|| AppError::not_found(format!("Plan {plan_id} not found")))
}

/// Close voting and deactivate whatever plan is open.
fn close_voting(board: &mut PokerBoard) {
    board.active_plan_id = None;
    board.voting_locked = false;
    for plan in &mut board.plans {
        plan.active = false;
    }
}

#[async_trait]
impl PokerStore for MemoryStore {
    async fn get_poker_board(&self, session_id: SessionId) -> AppResult<PokerBoard> {
        self.read(session_id, |r| Ok(r.poker()?.clone()))
    }

    async fn add_plan(&self, session_id: SessionId, draft: PlanDraft) -> AppResult<PokerBoard> {
        self.write(session_id, |r| {
            let board = r.poker_mut()?;
            board
                .plans
                .push(Plan::new(draft.name, draft.link, draft.description));
            Ok(board.clone())
        })
    }

    async fn revise_plan(
        &self,
        session_id: SessionId,
        plan_id: PlanId,
        draft: PlanDraft,
    ) -> AppResult<PokerBoard> {
        self.write(session_id, |r| {
            let board = r.poker_mut()?;
            let plan = plan_mut(board, plan_id)?;
            plan.name = draft.name;
            plan.link = draft.link;
            plan.description = draft.description;
            Ok(board.clone())
        })
    }

    async fn burn_plan(&self, session_id: SessionId, plan_id: PlanId) -> AppResult<PokerBoard> {
        self.write(session_id, |r| {
            let board = r.poker_mut()?;
            let before = board.plans.len();
            board.plans.retain(|p| p.id != plan_id);
            if board.plans.len() == before {
                return Err(AppError::not_found(format!("Plan {plan_id} not found")));
            }
            if board.active_plan_id == Some(plan_id) {
                close_voting(board);
            }
            Ok(board.clone())
        })
    }

    async fn activate_plan(&self, session_id: SessionId, plan_id: PlanId) -> AppResult<PokerBoard> {
        self.write(session_id, |r| {
            let board = r.poker_mut()?;
            plan_mut(board, plan_id)?;
            close_voting(board);
            let plan = plan_mut(board, plan_id)?;
            plan.active = true;
            plan.skipped = false;
            plan.votes.clear();
            board.active_plan_id = Some(plan_id);
            Ok(board.clone())
        })
    }

    async fn skip_plan(&self, session_id: SessionId, plan_id: PlanId) -> AppResult<PokerBoard> {
        self.write(session_id, |r| {
            let board = r.poker_mut()?;
            plan_mut(board, plan_id)?.skipped = true;
            if board.active_plan_id == Some(plan_id) {
                close_voting(board);
            }
            Ok(board.clone())
        })
    }

    async fn finalize_plan(
        &self,
        session_id: SessionId,
        plan_id: PlanId,
        points: &str,
    ) -> AppResult<PokerBoard> {
        self.write(session_id, |r| {
            let board = r.poker_mut()?;
            plan_mut(board, plan_id)?.points = Some(points.to_string());
            if board.active_plan_id == Some(plan_id) {
                close_voting(board);
            }
            Ok(board.clone())
        })
    }

    async fn set_vote(
        &self,
        session_id: SessionId,
        plan_id: PlanId,
        user_id: UserId,
        value: &str,
    ) -> AppResult<Plan> {
        self.write(session_id, |r| {
            let plan = plan_mut(r.poker_mut()?, plan_id)?;
            match plan.votes.iter_mut().find(|v| v.user_id == user_id) {
                Some(vote) => vote.value = Some(value.to_string()),
                None => plan.votes.push(Vote {
                    user_id,
                    value: Some(value.to_string()),
                }),
            }
            Ok(plan.clone())
        })
    }

    async fn retract_vote(
        &self,
        session_id: SessionId,
        plan_id: PlanId,
        user_id: UserId,
    ) -> AppResult<Plan> {
        self.write(session_id, |r| {
            let plan = plan_mut(r.poker_mut()?, plan_id)?;
            plan.votes.retain(|v| v.user_id != user_id);
            Ok(plan.clone())
        })
    }

    async fn end_voting(&self, session_id: SessionId, plan_id: PlanId) -> AppResult<PokerBoard> {
        self.write(session_id, |r| {
            let board = r.poker_mut()?;
            if board.active_plan_id != Some(plan_id) {
                return Err(AppError::validation(format!(
                    "Plan {plan_id} is not open for voting"
                )));
            }
            board.voting_locked = true;
            Ok(board.clone())
        })
    }
}
