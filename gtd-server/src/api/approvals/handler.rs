//! Approval Handlers

use axum::{
    Json,
    extract::{Path, Query},
};
use shared::models::{ApprovalApprove, ApprovalCreate, ApprovalQuery, ApprovalReject, ApprovalRequest};

use crate::db::repository::{RepoError, approval as repo};
use crate::permissions::RequestContext;
use crate::services::approval::{self, ApprovalEntity};
use crate::utils::{AppError, AppResult, ErrorCode};

const SECTION: &str = "approvals";

/// GET /api/approvals
pub async fn list(
    ctx: RequestContext,
    Query(query): Query<ApprovalQuery>,
) -> AppResult<Json<Vec<ApprovalRequest>>> {
    ctx.ensure_perm(SECTION).await?;
    Ok(Json(repo::find_all(ctx.pool()?, &query).await?))
}

/// GET /api/approvals/{id}
pub async fn get_by_id(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<ApprovalRequest>> {
    ctx.ensure_perm(SECTION).await?;
    let request = repo::find_by_id(&mut *ctx.pool()?.acquire().await.map_err(RepoError::from)?, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ApprovalNotFound).with_detail("id", id))?;
    Ok(Json(request))
}

/// POST /api/approvals - any authenticated user may file a request
///
/// Only the payload is checked here; reviewers decide whether it runs.
pub async fn create(
    ctx: RequestContext,
    Json(payload): Json<ApprovalCreate>,
) -> AppResult<Json<ApprovalRequest>> {
    let entity = ApprovalEntity::parse(&payload.entity_type)?;
    let request = approval::file_request(
        &ctx,
        entity,
        payload.action,
        payload.entity_id.unwrap_or(0),
        payload.request_data,
    )
    .await?;
    Ok(Json(request))
}

/// POST /api/approvals/{id}/approve
pub async fn approve(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<ApprovalApprove>,
) -> AppResult<Json<ApprovalRequest>> {
    let request = approval::approve(&ctx, id, payload.notes.as_deref()).await?;
    Ok(Json(request))
}

/// POST /api/approvals/{id}/reject
pub async fn reject(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<ApprovalReject>,
) -> AppResult<Json<ApprovalRequest>> {
    let request = approval::reject(&ctx, id, &payload.reason).await?;
    Ok(Json(request))
}
