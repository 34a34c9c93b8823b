//! Accounting Handlers

use axum::{
    Json,
    extract::{Path, Query},
};
use serde::Serialize;
use serde_json::{Value, json};
use shared::models::{
    ApprovalAction, BoqItem, BoqItemCreate, BoqItemUpdate, BoqQuery, BoqTotal, Expense,
    ExpenseCreate, ExpenseQuery, ExpenseUpdate, Installment, InstallmentCreate,
    InstallmentPayment, InstallmentQuery, InstallmentUpdate, MutationOutcome, Purchase,
    PurchaseCreate, PurchaseQuery, PurchaseUpdate, Sale, SaleCreate, SaleQuery, SaleUpdate,
};
use shared::util::today;
use validator::Validate;

use crate::audit::{AuditAction, AuditEvent};
use crate::db::repository::{RepoError, boq, expense, installment, purchase, sale};
use crate::permissions::RequestContext;
use crate::services::approval::{self, ApprovalEntity};
use crate::utils::{AppError, AppResult, ErrorCode};

const SECTION: &str = "accounting";

type Outcome = AppResult<Json<MutationOutcome<Value>>>;

/// Hand a typed payload to the approval workflow
async fn submit<T: Serialize>(
    ctx: &RequestContext,
    entity: ApprovalEntity,
    action: ApprovalAction,
    entity_id: i64,
    payload: &T,
) -> Outcome {
    ctx.ensure_perm(SECTION).await?;
    let data = serde_json::to_value(payload).map_err(|e| AppError::internal(e.to_string()))?;
    let outcome = approval::submit(ctx, entity, action, entity_id, data).await?;
    Ok(Json(outcome))
}

// ═══ Expenses ═══

/// GET /api/accounting/expenses
pub async fn list_expenses(
    ctx: RequestContext,
    Query(query): Query<ExpenseQuery>,
) -> AppResult<Json<Vec<Expense>>> {
    ctx.ensure_perm(SECTION).await?;
    Ok(Json(expense::find_all(ctx.pool()?, &query).await?))
}

pub async fn create_expense(ctx: RequestContext, Json(payload): Json<ExpenseCreate>) -> Outcome {
    submit(&ctx, ApprovalEntity::Expense, ApprovalAction::Create, 0, &payload).await
}

pub async fn update_expense(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<ExpenseUpdate>,
) -> Outcome {
    submit(&ctx, ApprovalEntity::Expense, ApprovalAction::Update, id, &payload).await
}

pub async fn delete_expense(ctx: RequestContext, Path(id): Path<i64>) -> Outcome {
    submit(&ctx, ApprovalEntity::Expense, ApprovalAction::Delete, id, &Value::Null).await
}

// ═══ Installments ═══

/// GET /api/accounting/installments
pub async fn list_installments(
    ctx: RequestContext,
    Query(query): Query<InstallmentQuery>,
) -> AppResult<Json<Vec<Installment>>> {
    ctx.ensure_perm(SECTION).await?;
    Ok(Json(installment::find_all(ctx.pool()?, &query).await?))
}

pub async fn create_installment(
    ctx: RequestContext,
    Json(payload): Json<InstallmentCreate>,
) -> Outcome {
    submit(&ctx, ApprovalEntity::Installment, ApprovalAction::Create, 0, &payload).await
}

pub async fn update_installment(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<InstallmentUpdate>,
) -> Outcome {
    submit(&ctx, ApprovalEntity::Installment, ApprovalAction::Update, id, &payload).await
}

pub async fn delete_installment(ctx: RequestContext, Path(id): Path<i64>) -> Outcome {
    submit(&ctx, ApprovalEntity::Installment, ApprovalAction::Delete, id, &Value::Null).await
}

/// POST /api/accounting/installments/{id}/pay - `paid_date` defaults to today
pub async fn mark_installment_paid(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<InstallmentPayment>,
) -> AppResult<Json<Installment>> {
    ctx.ensure_perm(SECTION).await?;
    let paid_date = payload.paid_date.unwrap_or_else(today);
    let paid = installment::mark_paid(ctx.pool()?, id, paid_date)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => AppError::new(ErrorCode::InstallmentNotFound).with_detail("id", id),
            RepoError::Validation(msg) => AppError::with_message(ErrorCode::InstallmentAlreadyPaid, msg),
            other => other.into(),
        })?;
    ctx.audit(
        AuditEvent::new(AuditAction::InstallmentPaid)
            .entity("installment", id)
            .details(json!({ "amount": paid.amount, "paid_date": paid_date })),
    )
    .await;
    Ok(Json(paid))
}

// ═══ Purchases ═══

/// GET /api/accounting/purchases
pub async fn list_purchases(
    ctx: RequestContext,
    Query(query): Query<PurchaseQuery>,
) -> AppResult<Json<Vec<Purchase>>> {
    ctx.ensure_perm(SECTION).await?;
    Ok(Json(purchase::find_all(ctx.pool()?, &query).await?))
}

pub async fn create_purchase(ctx: RequestContext, Json(payload): Json<PurchaseCreate>) -> Outcome {
    submit(&ctx, ApprovalEntity::Purchase, ApprovalAction::Create, 0, &payload).await
}

pub async fn update_purchase(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<PurchaseUpdate>,
) -> Outcome {
    submit(&ctx, ApprovalEntity::Purchase, ApprovalAction::Update, id, &payload).await
}

pub async fn delete_purchase(ctx: RequestContext, Path(id): Path<i64>) -> Outcome {
    submit(&ctx, ApprovalEntity::Purchase, ApprovalAction::Delete, id, &Value::Null).await
}

// ═══ Sales ═══

/// GET /api/accounting/sales
pub async fn list_sales(ctx: RequestContext, Query(query): Query<SaleQuery>) -> AppResult<Json<Vec<Sale>>> {
    ctx.ensure_perm(SECTION).await?;
    Ok(Json(sale::find_all(ctx.pool()?, &query).await?))
}

pub async fn create_sale(ctx: RequestContext, Json(payload): Json<SaleCreate>) -> Outcome {
    submit(&ctx, ApprovalEntity::Sale, ApprovalAction::Create, 0, &payload).await
}

pub async fn update_sale(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<SaleUpdate>,
) -> Outcome {
    submit(&ctx, ApprovalEntity::Sale, ApprovalAction::Update, id, &payload).await
}

pub async fn delete_sale(ctx: RequestContext, Path(id): Path<i64>) -> Outcome {
    submit(&ctx, ApprovalEntity::Sale, ApprovalAction::Delete, id, &Value::Null).await
}

// ═══ BOQ ═══

fn boq_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::BoqItemNotFound).with_detail("id", id)
}

/// GET /api/accounting/boq?project_id=
pub async fn list_boq(ctx: RequestContext, Query(query): Query<BoqQuery>) -> AppResult<Json<Vec<BoqItem>>> {
    ctx.ensure_perm(SECTION).await?;
    let project_id = query
        .project_id
        .ok_or_else(|| AppError::validation("project_id is required"))?;
    Ok(Json(boq::find_by_project(ctx.pool()?, project_id).await?))
}

pub async fn create_boq_item(ctx: RequestContext, Json(payload): Json<BoqItemCreate>) -> AppResult<Json<BoqItem>> {
    ctx.ensure_perm(SECTION).await?;
    payload.validate()?;
    let created = boq::create(ctx.pool()?, &payload).await?;
    ctx.audit(
        AuditEvent::new(AuditAction::BoqItemCreated)
            .entity("boq_item", created.id)
            .details(json!({ "project_id": created.project_id, "total": created.total })),
    )
    .await;
    Ok(Json(created))
}

pub async fn update_boq_item(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<BoqItemUpdate>,
) -> AppResult<Json<BoqItem>> {
    ctx.ensure_perm(SECTION).await?;
    payload.validate()?;
    let updated = boq::update(ctx.pool()?, id, &payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => boq_not_found(id),
            other => other.into(),
        })?;
    ctx.audit(AuditEvent::new(AuditAction::BoqItemUpdated).entity("boq_item", id))
        .await;
    Ok(Json(updated))
}

pub async fn delete_boq_item(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    ctx.ensure_perm(SECTION).await?;
    if !boq::delete(ctx.pool()?, id).await? {
        return Err(boq_not_found(id));
    }
    ctx.audit(AuditEvent::new(AuditAction::BoqItemDeleted).entity("boq_item", id))
        .await;
    Ok(Json(true))
}

/// GET /api/accounting/boq/total/{project_id}
pub async fn boq_total(ctx: RequestContext, Path(project_id): Path<i64>) -> AppResult<Json<BoqTotal>> {
    ctx.ensure_perm(SECTION).await?;
    Ok(Json(boq::total(ctx.pool()?, project_id).await?))
}
