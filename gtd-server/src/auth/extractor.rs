//! Current user extractor
//!
//! Resolves the session token into a [`CurrentUser`]. The user row is
//! reloaded on every request so deactivation and role changes apply to
//! sessions that are already open.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use http::request::Parts;
use serde::{Deserialize, Serialize};
use shared::models::User;

use crate::auth::{JwtError, session};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::{AppError, ErrorCode};

/// Authenticated actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Validate the request's session and load the acting user
pub async fn authenticate(
    state: &ServerState,
    headers: &http::HeaderMap,
) -> Result<CurrentUser, AppError> {
    let token = session::token_from_headers(headers, &state.config.session_cookie_name)
        .ok_or_else(AppError::unauthorized)?;

    let claims = state.get_jwt_service().validate_token(&token).map_err(|e| {
        security_log!("WARN", "auth_failed", error = format!("{}", e));
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid session"),
        }
    })?;

    let user_id = claims
        .user_id()
        .map_err(|e| AppError::invalid_token(e.to_string()))?;

    let user = user::find_by_id(state.pool()?, user_id)
        .await?
        .ok_or_else(|| AppError::invalid_token("Session user no longer exists"))?;

    if !user.is_active {
        security_log!("WARN", "auth_inactive_user", user_id = user.id);
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    Ok(CurrentUser::from(user))
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Set by require_auth
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let user = authenticate(state, &parts.headers).await.inspect_err(|_| {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
        })?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Public procedures take `Option<CurrentUser>`: an invalid session is an anonymous caller
impl OptionalFromRequestParts<ServerState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(Some(user.clone()));
        }
        Ok(authenticate(state, &parts.headers).await.ok())
    }
}
