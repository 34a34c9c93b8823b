//! Project Handlers

use axum::{
    Json,
    extract::{Path, Query},
};
use chrono::NaiveDate;
use serde_json::json;
use shared::models::{Project, ProjectCreate, ProjectMember, ProjectMemberAdd, ProjectQuery, ProjectUpdate};
use validator::Validate;

use crate::audit::{AuditAction, AuditEvent};
use crate::db::repository::{RepoError, project, user};
use crate::permissions::{Modifier, RequestContext};
use crate::utils::time::ensure_date_order;
use crate::utils::{AppError, AppResult, ErrorCode};

const SECTION: &str = "projects";

fn project_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::ProjectNotFound).with_detail("id", id)
}

fn map_project_error(id: i64) -> impl FnOnce(RepoError) -> AppError {
    move |e| match e {
        RepoError::NotFound(_) => project_not_found(id),
        other => other.into(),
    }
}

/// Row-level and column-level visibility for the acting user
struct Visibility {
    member_id: Option<i64>,
    financials: bool,
}

impl Visibility {
    async fn of(ctx: &RequestContext) -> AppResult<Self> {
        let only_assigned = ctx.has_modifier(SECTION, Modifier::OnlyAssigned).await?;
        let financials = ctx.has_modifier(SECTION, Modifier::ViewFinancials).await?;
        Ok(Self {
            member_id: only_assigned.then_some(ctx.user.id),
            financials,
        })
    }

    fn redact(&self, mut project: Project) -> Project {
        if !self.financials {
            project.budget = None;
        }
        project
    }

    async fn ensure_visible(&self, ctx: &RequestContext, project_id: i64) -> AppResult<()> {
        let Some(user_id) = self.member_id else {
            return Ok(());
        };
        if project::is_assigned(ctx.pool()?, project_id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::forbidden("You are not assigned to this project").with_detail("id", project_id))
        }
    }
}

fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> AppResult<()> {
    ensure_date_order(start, end, ErrorCode::ValidationFailed)
}

/// GET /api/projects
pub async fn list(ctx: RequestContext, Query(query): Query<ProjectQuery>) -> AppResult<Json<Vec<Project>>> {
    ctx.ensure_perm(SECTION).await?;
    let vis = Visibility::of(&ctx).await?;
    let projects = project::find_all(ctx.pool()?, &query, vis.member_id).await?;
    Ok(Json(projects.into_iter().map(|p| vis.redact(p)).collect()))
}

/// GET /api/projects/{id}
pub async fn get_by_id(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<Project>> {
    ctx.ensure_perm(SECTION).await?;
    let vis = Visibility::of(&ctx).await?;
    let found = project::find_by_id(ctx.pool()?, id)
        .await?
        .ok_or_else(|| project_not_found(id))?;
    vis.ensure_visible(&ctx, id).await?;
    Ok(Json(vis.redact(found)))
}

/// POST /api/projects
pub async fn create(ctx: RequestContext, Json(payload): Json<ProjectCreate>) -> AppResult<Json<Project>> {
    ctx.ensure_perm(SECTION).await?;
    ctx.require_modifier(SECTION, Modifier::Create).await?;
    payload.validate()?;
    check_dates(payload.start_date, payload.end_date)?;

    let created = project::create(ctx.pool()?, &payload, ctx.user.id).await?;
    ctx.audit(
        AuditEvent::new(AuditAction::ProjectCreated)
            .entity("project", created.id)
            .details(json!({ "name": created.name })),
    )
    .await;
    let vis = Visibility::of(&ctx).await?;
    Ok(Json(vis.redact(created)))
}

/// PUT /api/projects/{id}
pub async fn update(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<ProjectUpdate>,
) -> AppResult<Json<Project>> {
    ctx.ensure_perm(SECTION).await?;
    ctx.require_modifier(SECTION, Modifier::Edit).await?;
    payload.validate()?;
    let vis = Visibility::of(&ctx).await?;
    vis.ensure_visible(&ctx, id).await?;

    let pool = ctx.pool()?;
    let current = project::find_by_id(pool, id)
        .await?
        .ok_or_else(|| project_not_found(id))?;
    check_dates(
        payload.start_date.or(current.start_date),
        payload.end_date.or(current.end_date),
    )?;

    let updated = project::update(pool, id, &payload)
        .await
        .map_err(map_project_error(id))?;
    ctx.audit(AuditEvent::new(AuditAction::ProjectUpdated).entity("project", id))
        .await;
    Ok(Json(vis.redact(updated)))
}

/// DELETE /api/projects/{id}
pub async fn delete(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    ctx.ensure_perm(SECTION).await?;
    ctx.require_modifier(SECTION, Modifier::Delete).await?;
    Visibility::of(&ctx).await?.ensure_visible(&ctx, id).await?;
    if !project::delete(ctx.pool()?, id).await? {
        return Err(project_not_found(id));
    }
    ctx.audit(AuditEvent::new(AuditAction::ProjectDeleted).entity("project", id))
        .await;
    Ok(Json(true))
}

/// GET /api/projects/{id}/members
pub async fn members(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<Vec<ProjectMember>>> {
    ctx.ensure_perm(SECTION).await?;
    Visibility::of(&ctx).await?.ensure_visible(&ctx, id).await?;
    let members = project::members(ctx.pool()?, id).await?;
    Ok(Json(members))
}

/// POST /api/projects/{id}/members
pub async fn add_member(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<ProjectMemberAdd>,
) -> AppResult<Json<Vec<ProjectMember>>> {
    ctx.ensure_perm(SECTION).await?;
    ctx.require_modifier(SECTION, Modifier::Edit).await?;
    Visibility::of(&ctx).await?.ensure_visible(&ctx, id).await?;
    let pool = ctx.pool()?;
    project::find_by_id(pool, id)
        .await?
        .ok_or_else(|| project_not_found(id))?;
    user::find_by_id(pool, payload.user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).with_detail("id", payload.user_id))?;

    project::add_member(pool, id, payload.user_id, payload.role_in_project.as_deref()).await?;
    ctx.audit(
        AuditEvent::new(AuditAction::ProjectMemberAdded)
            .entity("project", id)
            .details(json!({ "user_id": payload.user_id })),
    )
    .await;
    Ok(Json(project::members(pool, id).await?))
}

/// DELETE /api/projects/{id}/members/{user_id}
pub async fn remove_member(
    ctx: RequestContext,
    Path((id, user_id)): Path<(i64, i64)>,
) -> AppResult<Json<bool>> {
    ctx.ensure_perm(SECTION).await?;
    ctx.require_modifier(SECTION, Modifier::Edit).await?;
    Visibility::of(&ctx).await?.ensure_visible(&ctx, id).await?;
    let removed = project::remove_member(ctx.pool()?, id, user_id).await?;
    if removed {
        ctx.audit(
            AuditEvent::new(AuditAction::ProjectMemberRemoved)
                .entity("project", id)
                .details(json!({ "user_id": user_id })),
        )
        .await;
    }
    Ok(Json(removed))
}
