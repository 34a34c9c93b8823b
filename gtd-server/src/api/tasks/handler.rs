//! Task Handlers

use axum::{
    Json,
    extract::{Path, Query},
};
use chrono::NaiveDate;
use serde_json::json;
use shared::models::{NotificationDraft, Task, TaskCreate, TaskQuery, TaskStatusUpdate, TaskUpdate, kinds};
use validator::Validate;

use crate::audit::{AuditAction, AuditEvent};
use crate::db::repository::{RepoError, project, task};
use crate::permissions::RequestContext;
use crate::services::notification;
use crate::utils::time::ensure_date_order;
use crate::utils::{AppError, AppResult, ErrorCode};

const SECTION: &str = "tasks";

fn task_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::TaskNotFound).with_detail("id", id)
}

fn map_task_error(id: i64) -> impl FnOnce(RepoError) -> AppError {
    move |e| match e {
        RepoError::NotFound(_) => task_not_found(id),
        other => other.into(),
    }
}

/// Gantt bars need `start_date <= end_date`
fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> AppResult<()> {
    ensure_date_order(start, end, ErrorCode::TaskDatesInvalid)
}

async fn notify_assignee(ctx: &RequestContext, task: &Task) {
    let Some(assignee) = task.assigned_to else {
        return;
    };
    if assignee == ctx.user.id {
        return;
    }
    let Ok(pool) = ctx.pool() else {
        return;
    };
    let draft = NotificationDraft::new(kinds::TASK_ASSIGNED, format!("New task: {}", task.title))
        .from_user(ctx.user.id)
        .entity("task", task.id)
        .link(format!("/projects/{}", task.project_id));
    notification::notify(pool, assignee, &draft).await;
}

/// GET /api/tasks
pub async fn list(ctx: RequestContext, Query(query): Query<TaskQuery>) -> AppResult<Json<Vec<Task>>> {
    ctx.ensure_perm(SECTION).await?;
    let tasks = task::find_all(ctx.pool()?, &query).await?;
    Ok(Json(tasks))
}

/// GET /api/tasks/{id}
pub async fn get_by_id(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<Task>> {
    ctx.ensure_perm(SECTION).await?;
    let found = task::find_by_id(ctx.pool()?, id)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    Ok(Json(found))
}

/// POST /api/tasks
pub async fn create(ctx: RequestContext, Json(payload): Json<TaskCreate>) -> AppResult<Json<Task>> {
    ctx.ensure_perm(SECTION).await?;
    payload.validate()?;
    check_dates(payload.start_date, payload.end_date)?;

    let pool = ctx.pool()?;
    project::find_by_id(pool, payload.project_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProjectNotFound).with_detail("id", payload.project_id))?;

    let created = task::create(pool, &payload, ctx.user.id).await?;
    ctx.audit(
        AuditEvent::new(AuditAction::TaskCreated)
            .entity("task", created.id)
            .details(json!({ "project_id": created.project_id })),
    )
    .await;
    notify_assignee(&ctx, &created).await;
    Ok(Json(created))
}

/// PUT /api/tasks/{id}
pub async fn update(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<TaskUpdate>,
) -> AppResult<Json<Task>> {
    ctx.ensure_perm(SECTION).await?;
    payload.validate()?;

    let pool = ctx.pool()?;
    let current = task::find_by_id(pool, id)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    check_dates(
        payload.start_date.or(current.start_date),
        payload.end_date.or(current.end_date),
    )?;

    let updated = task::update(pool, id, &payload)
        .await
        .map_err(map_task_error(id))?;
    ctx.audit(AuditEvent::new(AuditAction::TaskUpdated).entity("task", id))
        .await;
    if updated.assigned_to != current.assigned_to {
        notify_assignee(&ctx, &updated).await;
    }
    Ok(Json(updated))
}

/// PUT /api/tasks/{id}/status
pub async fn update_status(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<TaskStatusUpdate>,
) -> AppResult<Json<Task>> {
    ctx.ensure_perm(SECTION).await?;
    let updated = task::update_status(ctx.pool()?, id, payload.status)
        .await
        .map_err(map_task_error(id))?;
    ctx.audit(
        AuditEvent::new(AuditAction::TaskUpdated)
            .entity("task", id)
            .details(json!({ "status": payload.status })),
    )
    .await;
    Ok(Json(updated))
}

/// DELETE /api/tasks/{id}
pub async fn delete(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    ctx.ensure_perm(SECTION).await?;
    if !task::delete(ctx.pool()?, id).await? {
        return Err(task_not_found(id));
    }
    ctx.audit(AuditEvent::new(AuditAction::TaskDeleted).entity("task", id))
        .await;
    Ok(Json(true))
}
