//! Invoice Handlers

use axum::{
    Json,
    extract::{Path, Query},
};
use serde_json::{Value, json};
use shared::models::{
    ApprovalAction, Invoice, InvoiceCreate, InvoiceDetail, InvoiceQuery, InvoiceStatusUpdate,
    InvoiceUpdate, MutationOutcome,
};
use validator::Validate;

use crate::audit::{AuditAction, AuditEvent};
use crate::db::repository::{RepoError, invoice};
use crate::permissions::RequestContext;
use crate::services::approval::{self, ApprovalEntity};
use crate::utils::{AppError, AppResult, ErrorCode};

const SECTION: &str = "invoices";

fn invoice_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::InvoiceNotFound).with_detail("id", id)
}

fn map_invoice_error(id: i64) -> impl FnOnce(RepoError) -> AppError {
    move |e| match e {
        RepoError::NotFound(_) => invoice_not_found(id),
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::InvoiceNumberExists, msg),
        RepoError::Validation(msg) => {
            AppError::with_message(ErrorCode::InvoiceNotQuotation, msg).with_detail("id", id)
        }
        other => other.into(),
    }
}

/// GET /api/invoices
pub async fn list(ctx: RequestContext, Query(query): Query<InvoiceQuery>) -> AppResult<Json<Vec<Invoice>>> {
    ctx.ensure_perm(SECTION).await?;
    let invoices = invoice::find_all(ctx.pool()?, &query).await?;
    Ok(Json(invoices))
}

/// GET /api/invoices/{id} - header plus line items
pub async fn get_by_id(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<InvoiceDetail>> {
    ctx.ensure_perm(SECTION).await?;
    let detail = invoice::find_detail(&mut *ctx.pool()?.acquire().await.map_err(RepoError::from)?, id)
        .await?
        .ok_or_else(|| invoice_not_found(id))?;
    Ok(Json(detail))
}

/// POST /api/invoices - totals are computed from the items
pub async fn create(
    ctx: RequestContext,
    Json(payload): Json<InvoiceCreate>,
) -> AppResult<Json<InvoiceDetail>> {
    ctx.ensure_perm(SECTION).await?;
    payload.validate()?;
    if payload.due_date.is_some_and(|due| due < payload.issue_date) {
        return Err(AppError::validation("due_date must not be before issue_date"));
    }

    let created = invoice::create(ctx.pool()?, &payload, ctx.user.id)
        .await
        .map_err(map_invoice_error(0))?;
    ctx.audit(
        AuditEvent::new(AuditAction::InvoiceCreated)
            .entity("invoice", created.invoice.id)
            .details(json!({
                "invoice_number": created.invoice.invoice_number,
                "invoice_type": created.invoice.invoice_type,
                "total": created.invoice.total,
            })),
    )
    .await;
    Ok(Json(created))
}

/// PUT /api/invoices/{id}
pub async fn update(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<InvoiceUpdate>,
) -> AppResult<Json<InvoiceDetail>> {
    ctx.ensure_perm(SECTION).await?;
    payload.validate()?;
    let updated = invoice::update(&mut *ctx.pool()?.acquire().await.map_err(RepoError::from)?, id, &payload)
        .await
        .map_err(map_invoice_error(id))?;
    ctx.audit(
        AuditEvent::new(AuditAction::InvoiceUpdated)
            .entity("invoice", id)
            .details(json!({ "total": updated.invoice.total })),
    )
    .await;
    Ok(Json(updated))
}

/// PUT /api/invoices/{id}/status
pub async fn update_status(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<InvoiceStatusUpdate>,
) -> AppResult<Json<Invoice>> {
    ctx.ensure_perm(SECTION).await?;
    let pool = ctx.pool()?;
    let current = invoice::find_by_id(&mut *pool.acquire().await.map_err(RepoError::from)?, id)
        .await?
        .ok_or_else(|| invoice_not_found(id))?;

    let updated = invoice::update_status(pool, id, payload.status)
        .await
        .map_err(map_invoice_error(id))?;
    ctx.audit(
        AuditEvent::new(AuditAction::InvoiceStatusChanged)
            .entity("invoice", id)
            .details(json!({ "from": current.status, "to": updated.status })),
    )
    .await;
    Ok(Json(updated))
}

/// POST /api/invoices/{id}/convert - quotation to draft invoice
pub async fn convert_to_invoice(
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> AppResult<Json<InvoiceDetail>> {
    ctx.ensure_perm(SECTION).await?;
    let converted = invoice::convert_to_invoice(ctx.pool()?, id)
        .await
        .map_err(map_invoice_error(id))?;
    ctx.audit(
        AuditEvent::new(AuditAction::InvoiceConverted)
            .entity("invoice", id)
            .details(json!({ "invoice_number": converted.invoice.invoice_number })),
    )
    .await;
    Ok(Json(converted))
}

/// DELETE /api/invoices/{id} - runs now with `invoices.autoApprove`, else files a request
pub async fn delete(
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> AppResult<Json<MutationOutcome<Value>>> {
    ctx.ensure_perm(SECTION).await?;
    invoice::find_by_id(&mut *ctx.pool()?.acquire().await.map_err(RepoError::from)?, id)
        .await?
        .ok_or_else(|| invoice_not_found(id))?;
    let outcome = approval::submit(&ctx, ApprovalEntity::Invoice, ApprovalAction::Delete, id, Value::Null).await?;
    Ok(Json(outcome))
}
