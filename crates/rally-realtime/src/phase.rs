//! Phase state machine.
//!
//! Each session kind follows a fixed, ordered phase plan ending in
//! [`Phase::Completed`]. Transitions only move forward; asking for the
//! current phase again, or advancing a completed session, is a successful
//! no-op.

use rally_core::error::{AppError, reason};
use rally_core::result::AppResult;
use rally_entity::{Phase, SessionKind};

/// Result of a requested transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Already in the requested phase.
    Stay,
    /// Move from one phase to a later one.
    Advance {
        /// Phase being left.
        from: Phase,
        /// Phase being entered.
        to: Phase,
    },
}

impl Transition {
    /// Whether this transition enters [`Phase::Completed`].
    pub fn completes(&self) -> bool {
        matches!(self, Self::Advance { to, .. } if to.is_terminal())
    }
}

/// Stateless transition rules per session kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseMachine;

impl PhaseMachine {
    /// Plan index of `phase` for `kind`.
    fn position(kind: SessionKind, phase: Phase) -> Option<usize> {
        kind.phases().iter().position(|p| *p == phase)
    }

    /// Phase following `current`, if any.
    pub fn next(kind: SessionKind, current: Phase) -> Option<Phase> {
        let idx = Self::position(kind, current)?;
        kind.phases().get(idx + 1).copied()
    }

    /// Decide the transition from `current` toward `target` (or the next
    /// phase when no target is given). The terminal phase has no next
    /// phase, so an untargeted advance there stays put.
    pub fn transition(
        kind: SessionKind,
        current: Phase,
        target: Option<Phase>,
    ) -> AppResult<Transition> {
        let current_idx = Self::position(kind, current).ok_or_else(|| {
            AppError::internal(format!("Phase '{current}' is not part of the {kind} plan"))
        })?;

        let target = match target {
            Some(target) => target,
            None => match Self::next(kind, current) {
                Some(next) => next,
                None => return Ok(Transition::Stay),
            },
        };

        let target_idx = Self::position(kind, target).ok_or_else(|| {
            AppError::validation(format!("Phase '{target}' does not apply to {kind} sessions"))
        })?;

        if target_idx == current_idx {
            return Ok(Transition::Stay);
        }
        if current.is_terminal() {
            return Err(AppError::conflict("Session is already completed")
                .with_reason(reason::SESSION_COMPLETED));
        }
        if target_idx < current_idx {
            return Err(AppError::conflict(format!(
                "Cannot move from '{current}' back to '{target}'"
            ))
            .with_reason(reason::ILLEGAL_PHASE));
        }
        Ok(Transition::Advance {
            from: current,
            to: target,
        })
    }

    /// Reject events gated to `allowed` phases when the session is elsewhere.
    pub fn require(current: Phase, allowed: &[Phase]) -> AppResult<()> {
        if allowed.contains(&current) {
            Ok(())
        } else {
            Err(AppError::conflict(format!(
                "Not allowed during the '{current}' phase"
            ))
            .with_reason(reason::WRONG_PHASE))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_to_next() {
        let t = PhaseMachine::transition(SessionKind::Retro, Phase::Intro, None).unwrap();
        assert_eq!(
            t,
            Transition::Advance {
                from: Phase::Intro,
                to: Phase::Brainstorm
            }
        );
        assert!(!t.completes());
    }

    #[test]
    fn test_skip_forward_to_explicit_target() {
        let t = PhaseMachine::transition(SessionKind::Retro, Phase::Brainstorm, Some(Phase::Action))
            .unwrap();
        assert_eq!(
            t,
            Transition::Advance {
                from: Phase::Brainstorm,
                to: Phase::Action
            }
        );
    }

    #[test]
    fn test_same_phase_is_noop() {
        let t = PhaseMachine::transition(SessionKind::Poker, Phase::Voting, Some(Phase::Voting))
            .unwrap();
        assert_eq!(t, Transition::Stay);

        let t = PhaseMachine::transition(
            SessionKind::Poker,
            Phase::Completed,
            Some(Phase::Completed),
        )
        .unwrap();
        assert_eq!(t, Transition::Stay);
    }

    #[test]
    fn test_backwards_is_illegal() {
        let err = PhaseMachine::transition(SessionKind::Retro, Phase::Vote, Some(Phase::Group))
            .unwrap_err();
        assert!(err.has_reason(reason::ILLEGAL_PHASE));
        assert_eq!(err.kind.wire_code(), "ECONFLICT");
    }

    #[test]
    fn test_completed_is_terminal() {
        let t = PhaseMachine::transition(SessionKind::Storyboard, Phase::Completed, None).unwrap();
        assert_eq!(t, Transition::Stay);
        assert!(!t.completes());

        let err = PhaseMachine::transition(
            SessionKind::Storyboard,
            Phase::Completed,
            Some(Phase::Mapping),
        )
        .unwrap_err();
        assert!(err.has_reason(reason::SESSION_COMPLETED));
    }

    #[test]
    fn test_foreign_phase_is_invalid() {
        let err = PhaseMachine::transition(SessionKind::Poker, Phase::Lobby, Some(Phase::Group))
            .unwrap_err();
        assert_eq!(err.kind.wire_code(), "EINVALID");
    }

    #[test]
    fn test_entering_completed() {
        let t = PhaseMachine::transition(SessionKind::Poker, Phase::Voting, None).unwrap();
        assert!(t.completes());
    }

    #[test]
    fn test_require_phase() {
        assert!(PhaseMachine::require(Phase::Brainstorm, &[Phase::Brainstorm]).is_ok());
        let err = PhaseMachine::require(Phase::Intro, &[Phase::Brainstorm]).unwrap_err();
        assert!(err.has_reason(reason::WRONG_PHASE));
    }
}
