//! Event router.
//!
//! Resolves an inbound message against the session's current record and
//! runs it through the checks every event shares before any handler can
//! touch state: catalogue lookup, membership, permission class,
//! completion, and the event's phase gate.

use tracing::debug;

use rally_auth::Identity;
use rally_core::error::{AppError, reason};
use rally_core::result::AppResult;
use rally_core::types::SessionId;

use crate::event::SessionEvent;
use crate::handler::{self, HandlerContext, Outcome};
use crate::message::InboundMessage;
use crate::phase::PhaseMachine;

/// Dispatches inbound events to the handler for the session's kind.
#[derive(Debug, Clone)]
pub struct EventRouter {
    ctx: HandlerContext,
}

impl EventRouter {
    /// Creates a router over the given handler collaborators.
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    /// Handler collaborators.
    pub fn context(&self) -> &HandlerContext {
        &self.ctx
    }

    /// Route one event from `caller` in `session_id`.
    ///
    /// Any error is meant for the sender alone; nothing has been
    /// broadcast or mutated when one is returned from the checks.
    pub async fn route(
        &self,
        session_id: SessionId,
        caller: &Identity,
        message: &InboundMessage,
    ) -> AppResult<Outcome> {
        let session = self.ctx.store.get_session(session_id).await?;
        let event = SessionEvent::parse(session.kind, &message.kind, &message.value)?;

        let member = self
            .ctx
            .store
            .get_participant(session_id, caller.user_id)
            .await?;
        match member {
            Some(p) if !p.abandoned => {}
            Some(_) => {
                return Err(
                    AppError::authorization("You left this session").with_reason(reason::ABANDONED)
                );
            }
            None => return Err(AppError::authorization("Join the session first")),
        }

        self.ctx
            .guard
            .authorize(&session, caller, event.access())
            .await?;

        if session.is_completed() && !event.allowed_when_completed() {
            return Err(AppError::conflict("Session is already completed")
                .with_reason(reason::SESSION_COMPLETED));
        }
        if let Some(allowed) = event.phases() {
            PhaseMachine::require(session.phase, allowed)?;
        }

        debug!(
            session_id = %session_id,
            user_id = %caller.user_id,
            event_type = %message.kind,
            "Routing event"
        );

        match event {
            SessionEvent::Poker(e) => handler::poker::handle(&self.ctx, &session, caller, e).await,
            SessionEvent::Retro(e) => handler::retro::handle(&self.ctx, &session, caller, e).await,
            SessionEvent::Storyboard(e) => {
                handler::storyboard::handle(&self.ctx, &session, caller, e).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::testing::Fixture;
    use rally_core::ErrorKind;
    use rally_entity::{Phase, SessionKind};

    fn router(fx: &Fixture) -> EventRouter {
        EventRouter::new(fx.ctx.clone())
    }

    #[tokio::test]
    async fn test_non_facilitator_cannot_advance() {
        let fx = Fixture::new(SessionKind::Retro).await;
        let member = fx.join("Grace").await;

        let err = router(&fx)
            .route(fx.session.id, &member, &InboundMessage::new("advance_phase", ""))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert_eq!(err.kind.wire_code(), "EUNAUTHORIZED");
        assert_eq!(fx.reload().await.phase, Phase::Intro);
    }

    #[tokio::test]
    async fn test_phase_gate() {
        let fx = Fixture::new(SessionKind::Retro).await;
        let msg = InboundMessage::new(
            "create_item",
            r#"{"category":"worked","content":"Pairing"}"#,
        );

        let err = router(&fx)
            .route(fx.session.id, &fx.facilitator, &msg)
            .await
            .unwrap_err();
        assert!(err.has_reason(reason::WRONG_PHASE));

        router(&fx)
            .route(fx.session.id, &fx.facilitator, &InboundMessage::new("advance_phase", ""))
            .await
            .unwrap();
        let outcome = router(&fx)
            .route(fx.session.id, &fx.facilitator, &msg)
            .await
            .unwrap();
        assert_eq!(outcome.broadcasts.len(), 1);
    }

    #[tokio::test]
    async fn test_completed_session_rejects_mutations() {
        let fx = Fixture::new(SessionKind::Storyboard).await;
        let r = router(&fx);
        let advance = InboundMessage::new("advance_phase", "");
        r.route(fx.session.id, &fx.facilitator, &advance).await.unwrap();

        let err = r
            .route(
                fx.session.id,
                &fx.facilitator,
                &InboundMessage::new("add_goal", r#"{"name":"Late"}"#),
            )
            .await
            .unwrap_err();
        assert!(err.has_reason(reason::SESSION_COMPLETED));

        let again = InboundMessage::new("advance_phase", r#"{"phase":"completed"}"#);
        let outcome = r.route(fx.session.id, &fx.facilitator, &again).await.unwrap();
        assert_eq!(outcome, Outcome::silent());
        let outcome = r.route(fx.session.id, &fx.facilitator, &advance).await.unwrap();
        assert_eq!(outcome, Outcome::silent());

        let outcome = r
            .route(fx.session.id, &fx.facilitator, &InboundMessage::new("sync", ""))
            .await
            .unwrap();
        assert!(outcome.reply.is_some());
    }

    #[tokio::test]
    async fn test_abandoned_member_cannot_act() {
        let fx = Fixture::new(SessionKind::Storyboard).await;
        let member = fx.join("Grace").await;
        fx.store
            .abandon_participant(fx.session.id, member.user_id)
            .await
            .unwrap();

        let add_goal = InboundMessage::new("add_goal", r#"{"name":"Checkout"}"#);
        let err = router(&fx)
            .route(fx.session.id, &member, &add_goal)
            .await
            .unwrap_err();
        assert_eq!(err.kind.wire_code(), "EUNAUTHORIZED");
        assert!(err.has_reason(reason::ABANDONED));

        let stranger = crate::handler::testing::guest("Eve");
        let err = router(&fx)
            .route(fx.session.id, &stranger, &add_goal)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert!(fx.store.get_goals(fx.session.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_event_is_invalid() {
        let fx = Fixture::new(SessionKind::Poker).await;
        let err = router(&fx)
            .route(
                fx.session.id,
                &fx.facilitator,
                &InboundMessage::new("group_vote", r#"{"groupId":"x"}"#),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.has_reason(reason::UNKNOWN_EVENT));
    }
}
