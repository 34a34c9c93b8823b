//! Authentication Handlers

use std::time::Duration;

use axum::{Json, extract::State};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use shared::models::{LoginRequest, LoginResponse, User};
use validator::Validate;

use crate::audit::{AuditAction, AuditEvent, ClientIp, log_audit};
use crate::auth::{CurrentUser, password, session};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Failed and successful logins take the same minimum time
const AUTH_FIXED_DELAY_MS: u64 = 250;

/// POST /api/auth/login - verify credentials and set the session cookie
pub async fn login(
    State(state): State<ServerState>,
    ClientIp(ip): ClientIp,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    req.validate()?;
    let pool = state.pool()?;
    let email = req.email.trim().to_lowercase();

    let credentials = user::find_credentials(pool, &email).await?;
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let credentials = match credentials {
        Some(c) if password::verify_password(&req.password, &c.password_hash) => c,
        found => {
            let reason = if found.is_some() { "invalid_password" } else { "user_not_found" };
            log_audit(
                pool,
                found.as_ref().map(|c| c.id),
                Some(&ip),
                AuditEvent::new(AuditAction::LoginFailed).details(json!({ "email": email, "reason": reason })),
            )
            .await;
            security_log!("WARN", "login_failed", email = email.clone(), reason = reason, ip = ip.clone());
            return Err(AppError::invalid_credentials());
        }
    };

    if !credentials.is_active {
        log_audit(
            pool,
            Some(credentials.id),
            Some(&ip),
            AuditEvent::new(AuditAction::LoginFailed).details(json!({ "email": email, "reason": "inactive" })),
        )
        .await;
        security_log!("WARN", "login_inactive", user_id = credentials.id, ip = ip.clone());
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    user::touch_last_login(pool, credentials.id).await?;
    let account = user::find_by_id(pool, credentials.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    let jwt = state.get_jwt_service();
    let token = jwt
        .generate_token(account.id, &account.name, &account.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    log_audit(
        pool,
        Some(account.id),
        Some(&ip),
        AuditEvent::new(AuditAction::LoginSuccess).entity("user", account.id),
    )
    .await;
    tracing::info!(user_id = account.id, role = %account.role, "User logged in");

    let cookie = session::session_cookie(
        &state.config.session_cookie_name,
        token,
        state.config.cookie_secure,
    );
    let response = LoginResponse {
        user: account,
        expires_in: jwt.expires_in_seconds(),
    };
    Ok((jar.add(cookie), Json(response)))
}

/// POST /api/auth/logout - clear the session cookie
pub async fn logout(
    State(state): State<ServerState>,
    ClientIp(ip): ClientIp,
    user: Option<CurrentUser>,
    jar: CookieJar,
) -> (CookieJar, Json<serde_json::Value>) {
    if let (Some(user), Some(pool)) = (&user, state.db.as_ref()) {
        log_audit(pool, Some(user.id), Some(&ip), AuditEvent::new(AuditAction::Logout)).await;
        tracing::info!(user_id = user.id, "User logged out");
    }
    let jar = jar.add(session::clear_cookie(&state.config.session_cookie_name));
    (jar, Json(json!({ "success": true })))
}

/// GET /api/auth/me - the session's user, or `null`
pub async fn me(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
) -> AppResult<Json<Option<User>>> {
    let Some(current) = user else {
        return Ok(Json(None));
    };
    let found = user::find_by_id(state.pool()?, current.id).await?;
    Ok(Json(found))
}
