//! Facilitator permission guard.

use std::sync::Arc;

use rally_auth::{Authenticator, Identity};
use rally_core::error::AppError;
use rally_core::result::AppResult;
use rally_entity::Session;

/// Who may send an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any participant of the session.
    Participant,
    /// Facilitators and application admins only.
    Facilitator,
}

/// Checks facilitator-only events against the session's facilitator set.
#[derive(Clone)]
pub struct PermissionGuard {
    auth: Arc<dyn Authenticator>,
}

impl std::fmt::Debug for PermissionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGuard").finish()
    }
}

impl PermissionGuard {
    /// Creates a guard consulting `auth` for admin privilege.
    pub fn new(auth: Arc<dyn Authenticator>) -> Self {
        Self { auth }
    }

    /// Whether the caller holds facilitator authority in `session`.
    pub async fn is_facilitator(&self, session: &Session, caller: &Identity) -> AppResult<bool> {
        if session.is_facilitator(caller.user_id) {
            return Ok(true);
        }
        self.auth.is_application_admin(caller).await
    }

    /// Reject the caller unless `access` is satisfied.
    pub async fn authorize(
        &self,
        session: &Session,
        caller: &Identity,
        access: Access,
    ) -> AppResult<()> {
        match access {
            Access::Participant => Ok(()),
            Access::Facilitator => {
                if self.is_facilitator(session, caller).await? {
                    Ok(())
                } else {
                    Err(AppError::authorization(
                        "Only facilitators may perform this action",
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use rally_core::ErrorKind;
    use rally_core::types::{SessionId, UserId};
    use rally_entity::{Phase, SessionKind, SessionSettings, UserRole};

    struct RoleAuth;

    #[async_trait]
    impl Authenticator for RoleAuth {
        async fn resolve(&self, _token: &str) -> AppResult<Identity> {
            Err(AppError::authentication("unused"))
        }

        async fn is_application_admin(&self, identity: &Identity) -> AppResult<bool> {
            Ok(identity.role.is_admin())
        }
    }

    fn identity(role: UserRole) -> Identity {
        Identity {
            user_id: UserId::new(),
            name: "Ada".to_string(),
            role,
        }
    }

    fn session(facilitator: UserId) -> Session {
        Session {
            id: SessionId::new(),
            kind: SessionKind::Poker,
            name: "Sprint".to_string(),
            phase: Phase::Lobby,
            facilitators: vec![facilitator],
            created_by: facilitator,
            has_join_code: false,
            has_facilitator_code: false,
            settings: SessionSettings::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_facilitator_only() {
        let guard = PermissionGuard::new(Arc::new(RoleAuth));
        let facilitator = identity(UserRole::Registered);
        let member = identity(UserRole::Guest);
        let session = session(facilitator.user_id);

        assert!(
            guard
                .authorize(&session, &facilitator, Access::Facilitator)
                .await
                .is_ok()
        );
        let err = guard
            .authorize(&session, &member, Access::Facilitator)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert_eq!(err.kind.wire_code(), "EUNAUTHORIZED");
        assert!(
            guard
                .authorize(&session, &member, Access::Participant)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_admin_override() {
        let guard = PermissionGuard::new(Arc::new(RoleAuth));
        let admin = identity(UserRole::Admin);
        let session = session(UserId::new());
        assert!(
            guard
                .authorize(&session, &admin, Access::Facilitator)
                .await
                .is_ok()
        );
    }
}
