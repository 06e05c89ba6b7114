//! `AuthUser` extractor: resolves the caller from a bearer token, the
//! session cookie, or a `token` query parameter.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, Cookie, HeaderMapExt};

use rally_auth::Identity;
use rally_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Pull the raw token from the request, in order of preference.
pub fn extract_token(parts: &Parts, cookie_name: &str) -> Option<String> {
    if let Some(Authorization(bearer)) = parts.headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }
    if let Some(token) = parts
        .headers
        .typed_get::<Cookie>()
        .and_then(|c| c.get(cookie_name).map(str::to_string))
    {
        return Some(token);
    }
    parts.uri.query().and_then(|q| {
        q.split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "token")
            .map(|(_, value)| value.to_string())
    })
}

/// Authenticated caller available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl std::ops::Deref for AuthUser {
    type Target = Identity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts, &state.config.auth.cookie_name)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("Missing session token"))?;

        let identity = state.auth.resolve(&token).await?;
        Ok(AuthUser(identity))
    }
}

/// Authenticated caller holding application-admin privilege.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        if !state.auth.is_application_admin(&identity).await? {
            return Err(AppError::authorization("Administrator access required").into());
        }
        Ok(AdminUser(identity))
    }
}
