//! Notification Handlers

use axum::{
    Json,
    extract::{Path, Query},
};
use serde_json::{Value, json};
use shared::models::{Notification, NotificationQuery, UnreadCount};

use crate::db::repository::{RepoError, notification};
use crate::permissions::RequestContext;
use crate::utils::{AppError, AppResult, ErrorCode};

fn notification_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::NotificationNotFound).with_detail("id", id)
}

/// GET /api/notifications
pub async fn list(
    ctx: RequestContext,
    Query(query): Query<NotificationQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let rows = notification::find_for_user(ctx.pool()?, ctx.user.id, &query).await?;
    Ok(Json(rows))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(ctx: RequestContext) -> AppResult<Json<UnreadCount>> {
    let count = notification::unread_count(ctx.pool()?, ctx.user.id).await?;
    Ok(Json(UnreadCount { count }))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    notification::mark_read(ctx.pool()?, ctx.user.id, id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => notification_not_found(id),
            other => other.into(),
        })?;
    Ok(Json(true))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(ctx: RequestContext) -> AppResult<Json<Value>> {
    let updated = notification::mark_all_read(ctx.pool()?, ctx.user.id).await?;
    Ok(Json(json!({ "updated": updated })))
}

/// DELETE /api/notifications/{id}
pub async fn delete(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    if !notification::delete(ctx.pool()?, ctx.user.id, id).await? {
        return Err(notification_not_found(id));
    }
    Ok(Json(true))
}
