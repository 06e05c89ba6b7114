//! Authentication configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token signing and application-admin settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Lifetime of an issued token in hours.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,
    /// Users granted application-admin privilege regardless of token role.
    #[serde(default)]
    pub admin_user_ids: Vec<Uuid>,
    /// Name of the cookie carrying the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl(),
            admin_user_ids: Vec::new(),
            cookie_name: default_cookie_name(),
        }
    }
}

fn default_jwt_secret() -> String {
    "change-me-in-production-please".to_string()
}

fn default_token_ttl() -> u64 {
    24 * 7
}

fn default_cookie_name() -> String {
    "rally_session".to_string()
}
