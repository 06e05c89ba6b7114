//! Handlers for events every session kind accepts.

use serde::Serialize;
use tracing::info;

use rally_auth::Identity;
use rally_core::error::{AppError, reason};
use rally_core::result::AppResult;
use rally_core::types::{SessionId, UserId};
use rally_entity::{Phase, Session};

use crate::event::CommonEvent;
use crate::message::builder;
use crate::message::types::tags;
use crate::message::OutboundMessage;
use crate::phase::{PhaseMachine, Transition};

use super::{Effect, HandlerContext, Outcome, present_state};

/// Payload of `phase_changed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseChanged {
    /// Phase entered.
    pub phase: Phase,
    /// Phase left.
    pub previous: Phase,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Conceded {
    session_id: SessionId,
}

pub(crate) fn phase_changed(
    previous: Phase,
    phase: Phase,
    caller: &Identity,
) -> AppResult<OutboundMessage> {
    builder::build(
        tags::PHASE_CHANGED,
        &PhaseChanged { phase, previous },
        Some(caller.user_id),
    )
}

/// Handle a shared event.
pub async fn handle(
    ctx: &HandlerContext,
    session: &Session,
    caller: &Identity,
    event: CommonEvent,
) -> AppResult<Outcome> {
    match event {
        CommonEvent::AdvancePhase(payload) => advance_phase(ctx, session, caller, payload.phase).await,
        CommonEvent::AddFacilitator(target) => {
            let facilitators = ctx.store.add_facilitator(session.id, target.user_id).await?;
            facilitators_updated(&facilitators, caller)
        }
        CommonEvent::RemoveFacilitator(target) => {
            let facilitators = ctx
                .store
                .remove_facilitator(session.id, target.user_id)
                .await?;
            facilitators_updated(&facilitators, caller)
        }
        CommonEvent::SelfFacilitator(payload) => {
            if !ctx
                .store
                .verify_facilitator_code(session.id, &payload.code)
                .await?
            {
                return Err(AppError::authorization("Incorrect facilitator code")
                    .with_reason(reason::INVALID_CODE));
            }
            let facilitators = ctx.store.add_facilitator(session.id, caller.user_id).await?;
            facilitators_updated(&facilitators, caller)
        }
        CommonEvent::Sync => {
            let state = present_state(ctx.store.session_state(session.id).await?);
            Ok(Outcome::reply(builder::build_init(&state, caller.user_id)?))
        }
        CommonEvent::Concede => {
            ctx.store.delete_session(session.id).await?;
            info!(
                session_id = %session.id,
                user_id = %caller.user_id,
                "Session conceded"
            );
            let msg = builder::build(
                tags::SESSION_CONCEDED,
                &Conceded {
                    session_id: session.id,
                },
                Some(caller.user_id),
            )?;
            Ok(Outcome::broadcast(msg).with_effect(Effect::EndSession))
        }
        CommonEvent::Abandon => {
            let roster = ctx
                .store
                .abandon_participant(session.id, caller.user_id)
                .await?;
            let farewell =
                AppError::conflict("You left the session").with_reason(reason::ABANDONED);
            Ok(Outcome::broadcast(builder::build_roster(
                tags::USER_ABANDONED,
                &roster,
                caller.user_id,
            )?)
            .with_reply(builder::build_error(&farewell, Some(caller.user_id)))
            .with_effect(Effect::CloseSender))
        }
    }
}

async fn advance_phase(
    ctx: &HandlerContext,
    session: &Session,
    caller: &Identity,
    target: Option<Phase>,
) -> AppResult<Outcome> {
    let transition = PhaseMachine::transition(session.kind, session.phase, target)?;
    let Transition::Advance { from, to } = transition else {
        return Ok(Outcome::silent());
    };

    let updated = ctx.store.set_phase(session.id, to).await?;
    info!(
        session_id = %session.id,
        from = %from,
        to = %updated.phase,
        "Phase advanced"
    );
    if transition.completes() {
        ctx.notifier.session_completed(session.id);
    }
    Ok(Outcome::broadcast(phase_changed(from, updated.phase, caller)?))
}

fn facilitators_updated(
    facilitators: &[UserId],
    caller: &Identity,
) -> AppResult<Outcome> {
    Ok(Outcome::broadcast(builder::build(
        tags::FACILITATORS_UPDATED,
        facilitators,
        Some(caller.user_id),
    )?))
}
