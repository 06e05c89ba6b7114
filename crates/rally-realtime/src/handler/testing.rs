//! Shared fixtures for handler, router, and hub tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use rally_auth::{Authenticator, Identity};
use rally_core::error::AppError;
use rally_core::result::AppResult;
use rally_core::traits::Mailer;
use rally_core::types::{SessionId, UserId};
use rally_entity::{Session, SessionKind, SessionSettings, UserRole};
use rally_store::{MemoryStore, NewSession, Store};

use super::HandlerContext;
use crate::notification::CompletionNotifier;
use crate::permission::PermissionGuard;

/// Admin privilege comes from the role alone.
pub(crate) struct RoleAuth;

#[async_trait]
impl Authenticator for RoleAuth {
    async fn resolve(&self, _token: &str) -> AppResult<Identity> {
        Err(AppError::authentication("tokens are not used in tests"))
    }

    async fn is_application_admin(&self, identity: &Identity) -> AppResult<bool> {
        Ok(identity.role.is_admin())
    }
}

/// Records completion mails on a channel.
pub(crate) struct ChannelMailer(pub mpsc::UnboundedSender<SessionId>);

#[async_trait]
impl Mailer for ChannelMailer {
    async fn send_session_completed_summary(&self, session_id: SessionId) -> AppResult<()> {
        let _ = self.0.send(session_id);
        Ok(())
    }
}

pub(crate) fn guest(name: &str) -> Identity {
    Identity {
        user_id: UserId::new(),
        name: name.to_string(),
        role: UserRole::Guest,
    }
}

/// One session in a fresh store, created by `facilitator`.
pub(crate) struct Fixture {
    pub ctx: HandlerContext,
    pub store: Arc<dyn Store>,
    pub session: Session,
    pub facilitator: Identity,
    pub mail: mpsc::UnboundedReceiver<SessionId>,
}

impl Fixture {
    pub async fn new(kind: SessionKind) -> Self {
        Self::build(kind, SessionSettings::default(), None).await
    }

    pub async fn with_settings(kind: SessionKind, settings: SessionSettings) -> Self {
        Self::build(kind, settings, None).await
    }

    pub async fn with_facilitator_code(kind: SessionKind, code: &str) -> Self {
        Self::build(kind, SessionSettings::default(), Some(code.to_string())).await
    }

    async fn build(kind: SessionKind, settings: SessionSettings, code: Option<String>) -> Self {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let (tx, mail) = mpsc::unbounded_channel();
        let ctx = HandlerContext {
            store: Arc::clone(&store),
            guard: PermissionGuard::new(Arc::new(RoleAuth)),
            notifier: CompletionNotifier::new(Arc::new(ChannelMailer(tx)), true),
        };

        let facilitator = guest("Ada");
        let session = store
            .create_session(NewSession {
                kind,
                name: "Sprint 42".to_string(),
                created_by: facilitator.user_id,
                creator_name: facilitator.name.clone(),
                join_code: None,
                facilitator_code: code,
                settings,
            })
            .await
            .unwrap();
        store
            .set_participant_active(session.id, facilitator.user_id, true)
            .await
            .unwrap();

        Self {
            ctx,
            store,
            session,
            facilitator,
            mail,
        }
    }

    /// Add an active participant.
    pub async fn join(&self, name: &str) -> Identity {
        let identity = guest(name);
        self.store
            .add_participant(self.session.id, identity.user_id, name, false)
            .await
            .unwrap();
        self.store
            .set_participant_active(self.session.id, identity.user_id, true)
            .await
            .unwrap();
        identity
    }

    pub async fn reload(&self) -> Session {
        self.store.get_session(self.session.id).await.unwrap()
    }
}
