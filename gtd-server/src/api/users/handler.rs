//! User Handlers

use axum::{
    Json,
    extract::{Path, Query},
};
use serde_json::json;
use shared::models::{
    EffectivePermissions, NotificationDraft, PermissionOverridesUpdate, User, UserActiveUpdate,
    UserCreate, UserQuery, UserRoleUpdate, UserUpdate, kinds,
};
use validator::Validate;

use crate::audit::{AuditAction, AuditEvent};
use crate::auth::password;
use crate::db::repository::{RepoError, permission, user};
use crate::permissions::{RequestContext, effective_permissions, is_valid_override_key};
use crate::services::notification;
use crate::utils::{AppError, AppResult, ErrorCode};

const SECTION: &str = "users";

fn user_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::UserNotFound).with_detail("id", id)
}

/// Duplicate emails surface as `UserEmailExists`
fn map_user_error(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::UserEmailExists, msg),
        RepoError::NotFound(_) => AppError::new(ErrorCode::UserNotFound),
        other => other.into(),
    }
}

fn hash(password: &str) -> AppResult<String> {
    password::hash_password(password).map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

fn ensure_role_exists(ctx: &RequestContext, role: &str) -> AppResult<()> {
    if ctx.state.role_table().contains_role(role) {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::RoleNotFound).with_detail("role", role.to_string()))
    }
}

/// GET /api/users
pub async fn list(ctx: RequestContext, Query(query): Query<UserQuery>) -> AppResult<Json<Vec<User>>> {
    ctx.ensure_perm(SECTION).await?;
    let users = user::find_all(ctx.pool()?, &query).await?;
    Ok(Json(users))
}

/// GET /api/users/{id}
pub async fn get_by_id(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<User>> {
    ctx.ensure_perm(SECTION).await?;
    let found = user::find_by_id(ctx.pool()?, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    Ok(Json(found))
}

/// POST /api/users
pub async fn create(ctx: RequestContext, Json(payload): Json<UserCreate>) -> AppResult<Json<User>> {
    ctx.ensure_perm(SECTION).await?;
    payload.validate()?;
    ensure_role_exists(&ctx, &payload.role)?;

    let email = payload.email.trim().to_lowercase();
    let password_hash = hash(&payload.password)?;
    let created = user::create(
        ctx.pool()?,
        user::NewUser {
            name: payload.name.trim(),
            email: &email,
            password_hash: &password_hash,
            role: &payload.role,
            phone: payload.phone.as_deref(),
            position: payload.position.as_deref(),
        },
    )
    .await
    .map_err(map_user_error)?;

    ctx.audit(
        AuditEvent::new(AuditAction::UserCreated)
            .entity("user", created.id)
            .details(json!({ "email": created.email, "role": created.role })),
    )
    .await;
    Ok(Json(created))
}

/// PUT /api/users/{id}
pub async fn update(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(mut payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    ctx.ensure_perm(SECTION).await?;
    payload.validate()?;
    if let Some(email) = payload.email.as_mut() {
        *email = email.trim().to_lowercase();
    }
    let password_hash = payload.password.as_deref().map(hash).transpose()?;

    let updated = user::update(ctx.pool()?, id, &payload, password_hash.as_deref())
        .await
        .map_err(map_user_error)?;

    ctx.audit(
        AuditEvent::new(AuditAction::UserUpdated)
            .entity("user", id)
            .details(json!({ "password_changed": password_hash.is_some() })),
    )
    .await;
    Ok(Json(updated))
}

/// PUT /api/users/{id}/role - admin only; notifies the user
pub async fn update_role(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<UserRoleUpdate>,
) -> AppResult<Json<User>> {
    ctx.ensure_perm(SECTION).await?;
    ctx.ensure_admin().await?;
    ensure_role_exists(&ctx, &payload.role)?;

    let pool = ctx.pool()?;
    let previous = user::find_by_id(pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    let updated = user::update_role(pool, id, &payload.role)
        .await
        .map_err(map_user_error)?;

    ctx.audit(
        AuditEvent::new(AuditAction::UserRoleChanged)
            .entity("user", id)
            .details(json!({ "from": previous.role, "to": updated.role })),
    )
    .await;

    let draft = NotificationDraft::new(kinds::ROLE_ASSIGNED, format!("Your role is now {}", updated.role))
        .from_user(ctx.user.id)
        .entity("user", id);
    notification::notify(pool, id, &draft).await;

    Ok(Json(updated))
}

/// PUT /api/users/{id}/active
pub async fn set_active(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<UserActiveUpdate>,
) -> AppResult<Json<User>> {
    ctx.ensure_perm(SECTION).await?;
    if id == ctx.user.id && !payload.is_active {
        return Err(AppError::business_rule("You cannot deactivate your own account"));
    }
    let updated = user::set_active(ctx.pool()?, id, payload.is_active)
        .await
        .map_err(map_user_error)?;

    let action = if payload.is_active {
        AuditAction::UserActivated
    } else {
        AuditAction::UserDeactivated
    };
    ctx.audit(AuditEvent::new(action).entity("user", id)).await;
    Ok(Json(updated))
}

/// DELETE /api/users/{id}
pub async fn delete(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    ctx.ensure_perm(SECTION).await?;
    if id == ctx.user.id {
        return Err(AppError::new(ErrorCode::UserCannotDeleteSelf));
    }
    let deleted = user::delete(ctx.pool()?, id).await?;
    if !deleted {
        return Err(user_not_found(id));
    }
    ctx.audit(AuditEvent::new(AuditAction::UserDeleted).entity("user", id)).await;
    Ok(Json(true))
}

/// GET /api/users/{id}/permissions
pub async fn get_permissions(
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> AppResult<Json<EffectivePermissions>> {
    ctx.ensure_perm(SECTION).await?;
    let pool = ctx.pool()?;
    let target = user::find_by_id(pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    let overrides = permission::find_overrides(pool, id).await?;
    Ok(Json(effective_permissions(ctx.state.role_table(), &target.role, &overrides)))
}

/// PUT /api/users/{id}/permissions - admin only; replaces the override map
pub async fn set_permissions(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<PermissionOverridesUpdate>,
) -> AppResult<Json<EffectivePermissions>> {
    ctx.ensure_perm(SECTION).await?;
    ctx.ensure_admin().await?;

    if let Some(bad) = payload.permissions.keys().find(|k| !is_valid_override_key(k)) {
        return Err(AppError::validation(format!("Unknown permission key '{bad}'")).with_detail("key", bad.clone()));
    }

    let pool = ctx.pool()?;
    let target = user::find_by_id(pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    permission::save_overrides(pool, id, &payload.permissions, ctx.user.id).await?;

    ctx.audit(
        AuditEvent::new(AuditAction::PermissionsUpdated)
            .entity("user", id)
            .details(json!({ "permissions": payload.permissions })),
    )
    .await;
    Ok(Json(effective_permissions(
        ctx.state.role_table(),
        &target.role,
        &payload.permissions,
    )))
}

/// GET /api/users/me/permissions - any authenticated user
pub async fn my_permissions(ctx: RequestContext) -> AppResult<Json<EffectivePermissions>> {
    Ok(Json(ctx.effective_permissions().await?))
}
