//! Audit Log Handlers

use axum::{Json, extract::Query};
use shared::models::{AuditListResponse, AuditQuery};

use crate::db::repository::audit_log;
use crate::permissions::RequestContext;
use crate::utils::time::{day_end_millis, day_start_millis, ensure_date_order};
use crate::utils::{AppResult, ErrorCode};

/// GET /api/audit - filtered page plus the total match count
pub async fn list(ctx: RequestContext, Query(query): Query<AuditQuery>) -> AppResult<Json<AuditListResponse>> {
    ctx.ensure_perm("audit").await?;
    let query = resolve_days(query)?;
    let (items, total) = audit_log::query(ctx.pool()?, &query).await?;
    Ok(Json(AuditListResponse { items, total }))
}

/// Millisecond bounds win over calendar days
fn resolve_days(mut query: AuditQuery) -> AppResult<AuditQuery> {
    ensure_date_order(query.from_date, query.to_date, ErrorCode::ValidationFailed)?;
    if query.from.is_none() {
        query.from = query.from_date.map(day_start_millis);
    }
    if query.to.is_none() {
        query.to = query.to_date.map(|d| day_end_millis(d) - 1);
    }
    Ok(query)
}
