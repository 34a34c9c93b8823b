//! Client Handlers

use axum::{
    Json,
    extract::{Path, Query},
};
use shared::models::{Client, ClientCreate, ClientQuery, ClientUpdate};
use validator::Validate;

use crate::audit::{AuditAction, AuditEvent};
use crate::db::repository::{RepoError, client};
use crate::permissions::RequestContext;
use crate::utils::{AppError, AppResult, ErrorCode};

const SECTION: &str = "clients";

fn client_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::ClientNotFound).with_detail("id", id)
}

/// GET /api/clients
pub async fn list(ctx: RequestContext, Query(query): Query<ClientQuery>) -> AppResult<Json<Vec<Client>>> {
    ctx.ensure_perm(SECTION).await?;
    let clients = client::find_all(ctx.pool()?, &query).await?;
    Ok(Json(clients))
}

/// GET /api/clients/{id}
pub async fn get_by_id(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<Client>> {
    ctx.ensure_perm(SECTION).await?;
    let found = client::find_by_id(ctx.pool()?, id)
        .await?
        .ok_or_else(|| client_not_found(id))?;
    Ok(Json(found))
}

/// POST /api/clients
pub async fn create(ctx: RequestContext, Json(payload): Json<ClientCreate>) -> AppResult<Json<Client>> {
    ctx.ensure_perm(SECTION).await?;
    payload.validate()?;
    let created = client::create(ctx.pool()?, &payload, ctx.user.id).await?;
    ctx.audit(AuditEvent::new(AuditAction::ClientCreated).entity("client", created.id))
        .await;
    Ok(Json(created))
}

/// PUT /api/clients/{id}
pub async fn update(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<ClientUpdate>,
) -> AppResult<Json<Client>> {
    ctx.ensure_perm(SECTION).await?;
    payload.validate()?;
    let updated = client::update(ctx.pool()?, id, &payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => client_not_found(id),
            other => other.into(),
        })?;
    ctx.audit(AuditEvent::new(AuditAction::ClientUpdated).entity("client", id))
        .await;
    Ok(Json(updated))
}

/// DELETE /api/clients/{id} - refused while projects reference the client
pub async fn delete(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    ctx.ensure_perm(SECTION).await?;
    let pool = ctx.pool()?;

    let projects = client::count_projects(pool, id).await?;
    if projects > 0 {
        return Err(AppError::new(ErrorCode::ClientHasProjects)
            .with_detail("id", id)
            .with_detail("projects", projects));
    }

    if !client::delete(pool, id).await? {
        return Err(client_not_found(id));
    }
    ctx.audit(AuditEvent::new(AuditAction::ClientDeleted).entity("client", id))
        .await;
    Ok(Json(true))
}
