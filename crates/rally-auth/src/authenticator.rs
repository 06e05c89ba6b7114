//! Authentication collaborator consumed by the WebSocket upgrade.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use rally_core::config::AuthConfig;
use rally_core::result::AppResult;
use rally_core::types::UserId;
use rally_entity::UserRole;

use crate::jwt::JwtDecoder;

/// Caller resolved from a connection handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User ID.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Application role.
    pub role: UserRole,
}

/// Resolves callers and their application-level privileges.
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    /// Resolve the caller from a handshake credential.
    async fn resolve(&self, token: &str) -> AppResult<Identity>;

    /// Whether the caller holds application-admin privilege.
    async fn is_application_admin(&self, identity: &Identity) -> AppResult<bool>;
}

/// [`Authenticator`] backed by signed session tokens.
#[derive(Debug, Clone)]
pub struct JwtAuthenticator {
    /// Token decoder.
    decoder: Arc<JwtDecoder>,
    /// Users configured as administrators.
    admins: HashSet<UserId>,
}

impl JwtAuthenticator {
    /// Creates a new authenticator.
    pub fn new(decoder: Arc<JwtDecoder>, config: &AuthConfig) -> Self {
        Self {
            decoder,
            admins: config
                .admin_user_ids
                .iter()
                .copied()
                .map(UserId::from)
                .collect(),
        }
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn resolve(&self, token: &str) -> AppResult<Identity> {
        let claims = self.decoder.decode(token)?;
        Ok(Identity {
            user_id: claims.user_id(),
            name: claims.name,
            role: claims.role,
        })
    }

    async fn is_application_admin(&self, identity: &Identity) -> AppResult<bool> {
        Ok(identity.role.is_admin() || self.admins.contains(&identity.user_id))
    }
}
