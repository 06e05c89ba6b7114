//! Planning-poker handlers.

use serde::Serialize;

use rally_auth::Identity;
use rally_core::error::{AppError, reason};
use rally_core::result::AppResult;
use rally_core::types::{PlanId, UserId};
use rally_entity::poker::{Plan, PokerBoard, Vote};
use rally_entity::{Phase, Session, SessionSettings};
use rally_store::PlanDraft;

use crate::event::PokerEvent;
use crate::event::poker::{PlanPayload, RevisePlanPayload, VotePayload};
use crate::message::builder;
use crate::message::types::tags;
use crate::tally::{Tally, tally};

use super::common::phase_changed;
use super::{HandlerContext, Outcome, common};

/// Payload of `vote_activity` and `vote_retracted`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteActivity {
    /// Plan voted on.
    pub plan_id: PlanId,
    /// Votes after the change, values stripped when hidden.
    pub votes: Vec<Vote>,
    /// Completeness.
    #[serde(flatten)]
    pub tally: Tally,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Jab {
    user_id: UserId,
}

/// Board as clients see it: while voting is open on a session that hides
/// voter identity, the active plan carries voters but no values.
pub fn present_board(settings: &SessionSettings, board: &PokerBoard) -> PokerBoard {
    let mut board = board.clone();
    if settings.hide_voter_identity && board.voting_open() {
        for plan in &mut board.plans {
            if Some(plan.id) == board.active_plan_id {
                *plan = plan.without_vote_values();
            }
        }
    }
    board
}

/// The plan must be the active one with voting still open.
fn open_plan(board: &PokerBoard, plan_id: PlanId) -> AppResult<&Plan> {
    let plan = board
        .plans
        .iter()
        .find(|p| p.id == plan_id)
        .ok_or_else(|| AppError::not_found(format!("Plan {plan_id} not found")))?;
    if board.active_plan_id != Some(plan_id) || board.voting_locked {
        return Err(
            AppError::conflict(format!("Voting is not open for plan {plan_id}"))
                .with_reason(reason::VOTING_LOCKED),
        );
    }
    Ok(plan)
}

/// Handle a poker event.
pub async fn handle(
    ctx: &HandlerContext,
    session: &Session,
    caller: &Identity,
    event: PokerEvent,
) -> AppResult<Outcome> {
    match event {
        PokerEvent::Vote(payload) => vote(ctx, session, caller, payload).await,
        PokerEvent::RetractVote(payload) => {
            let board = ctx.store.get_poker_board(session.id).await?;
            open_plan(&board, payload.plan_id)?;
            let plan = ctx
                .store
                .retract_vote(session.id, payload.plan_id, caller.user_id)
                .await?;
            let activity = vote_activity(ctx, session, &plan).await?;
            Ok(Outcome::broadcast(builder::build(
                tags::VOTE_RETRACTED,
                &activity,
                Some(caller.user_id),
            )?))
        }
        PokerEvent::EndVoting(payload) => {
            let board = ctx.store.end_voting(session.id, payload.plan_id).await?;
            board_changed(tags::VOTING_ENDED, session, &board, caller)
        }
        PokerEvent::AddPlan(payload) => {
            let board = ctx.store.add_plan(session.id, plan_draft(payload)).await?;
            board_changed(tags::PLAN_ADDED, session, &board, caller)
        }
        PokerEvent::RevisePlan(payload) => {
            let RevisePlanPayload {
                plan_id,
                name,
                link,
                description,
            } = payload;
            let draft = plan_draft(PlanPayload {
                name,
                link,
                description,
            });
            let board = ctx.store.revise_plan(session.id, plan_id, draft).await?;
            board_changed(tags::PLAN_REVISED, session, &board, caller)
        }
        PokerEvent::BurnPlan(payload) => {
            let board = ctx.store.burn_plan(session.id, payload.plan_id).await?;
            board_changed(tags::PLAN_BURNED, session, &board, caller)
        }
        PokerEvent::ActivatePlan(payload) => {
            let board = ctx.store.get_poker_board(session.id).await?;
            if !board.plans.iter().any(|p| p.id == payload.plan_id) {
                return Err(AppError::not_found(format!(
                    "Plan {} not found",
                    payload.plan_id
                )));
            }

            let mut outcome = Outcome::silent();
            if session.phase == Phase::Lobby {
                let updated = ctx.store.set_phase(session.id, Phase::Voting).await?;
                outcome = outcome.and_broadcast(phase_changed(session.phase, updated.phase, caller)?);
            }
            let board = ctx.store.activate_plan(session.id, payload.plan_id).await?;
            Ok(outcome.and_broadcast(builder::build(
                tags::PLAN_ACTIVATED,
                &present_board(&session.settings, &board),
                Some(caller.user_id),
            )?))
        }
        PokerEvent::SkipPlan(payload) => {
            let board = ctx.store.skip_plan(session.id, payload.plan_id).await?;
            board_changed(tags::PLAN_SKIPPED, session, &board, caller)
        }
        PokerEvent::FinalizePlan(payload) => {
            let board = ctx
                .store
                .finalize_plan(session.id, payload.plan_id, &payload.points)
                .await?;
            board_changed(tags::PLAN_FINALIZED, session, &board, caller)
        }
        PokerEvent::SpectatorToggle(payload) => {
            let roster = ctx
                .store
                .set_spectator(session.id, caller.user_id, payload.spectator)
                .await?;
            Ok(Outcome::broadcast(builder::build_roster(
                tags::SPECTATOR_TOGGLED,
                &roster,
                caller.user_id,
            )?))
        }
        PokerEvent::JabWarrior(target) => {
            if ctx
                .store
                .get_participant(session.id, target.user_id)
                .await?
                .is_none()
            {
                return Err(AppError::not_found(format!(
                    "User {} is not a participant",
                    target.user_id
                )));
            }
            Ok(Outcome::broadcast(builder::build(
                tags::JAB_WARRIOR,
                &Jab {
                    user_id: target.user_id,
                },
                Some(caller.user_id),
            )?))
        }
        PokerEvent::Common(event) => common::handle(ctx, session, caller, event).await,
    }
}

async fn vote(
    ctx: &HandlerContext,
    session: &Session,
    caller: &Identity,
    payload: VotePayload,
) -> AppResult<Outcome> {
    let settings = &session.settings;
    if !settings.point_values.contains(&payload.vote_value) {
        return Err(AppError::validation(format!(
            "'{}' is not one of the session's point values",
            payload.vote_value
        )));
    }

    let board = ctx.store.get_poker_board(session.id).await?;
    open_plan(&board, payload.plan_id)?;

    let voter = ctx
        .store
        .get_participant(session.id, caller.user_id)
        .await?
        .ok_or_else(|| AppError::authorization("Join the session before voting"))?;
    if voter.spectator {
        return Err(AppError::authorization("Spectators cannot vote"));
    }

    let plan = ctx
        .store
        .set_vote(session.id, payload.plan_id, caller.user_id, &payload.vote_value)
        .await?;
    let activity = vote_activity(ctx, session, &plan).await?;
    let all_voted = activity.tally.all_voted;
    let mut outcome = Outcome::broadcast(builder::build(
        tags::VOTE_ACTIVITY,
        &activity,
        Some(caller.user_id),
    )?);

    if settings.auto_finish_voting && all_voted {
        let board = ctx.store.end_voting(session.id, plan.id).await?;
        outcome = outcome.and_broadcast(builder::build(
            tags::VOTING_ENDED,
            &present_board(settings, &board),
            Some(caller.user_id),
        )?);
    }
    Ok(outcome)
}

/// Tally `plan` against the fresh roster. Only called while voting on
/// `plan` is open, so values are stripped whenever identity is hidden.
async fn vote_activity(
    ctx: &HandlerContext,
    session: &Session,
    plan: &Plan,
) -> AppResult<VoteActivity> {
    let participants = ctx.store.get_participants(session.id).await?;
    let tally = tally(&plan.votes, &participants);
    let votes = if session.settings.hide_voter_identity {
        plan.without_vote_values().votes
    } else {
        plan.votes.clone()
    };
    Ok(VoteActivity {
        plan_id: plan.id,
        votes,
        tally,
    })
}

fn board_changed(
    tag: &str,
    session: &Session,
    board: &PokerBoard,
    caller: &Identity,
) -> AppResult<Outcome> {
    Ok(Outcome::broadcast(builder::build(
        tag,
        &present_board(&session.settings, board),
        Some(caller.user_id),
    )?))
}

fn plan_draft(payload: PlanPayload) -> PlanDraft {
    PlanDraft {
        name: payload.name.trim().to_string(),
        link: payload.link.filter(|l| !l.is_empty()),
        description: payload.description.filter(|d| !d.is_empty()),
    }
}
