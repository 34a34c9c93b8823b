//! HR Handlers

use axum::{
    Json,
    extract::{Path, Query},
};
use serde_json::json;
use shared::models::{
    Attendance, AttendanceQuery, AttendanceRecord, LeaveCreate, LeaveDecision, LeaveQuery,
    LeaveRequest, LeaveStatus, NotificationDraft, Payroll, PayrollCreate, PayrollPayment,
    PayrollQuery, kinds,
};
use shared::util::today;
use validator::Validate;

use crate::audit::{AuditAction, AuditEvent};
use crate::db::repository::{RepoError, attendance, leave, payroll, user};
use crate::permissions::RequestContext;
use crate::services::notification;
use crate::utils::time::{ensure_date_order, parse_date};
use crate::utils::{AppError, AppResult, ErrorCode};

const SECTION: &str = "hr";

/// Roles told about new leave requests
const LEAVE_REVIEWERS: &[&str] = &["admin", "hr_manager"];

async fn ensure_user(ctx: &RequestContext, user_id: i64) -> AppResult<()> {
    user::find_by_id(ctx.pool()?, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).with_detail("id", user_id))?;
    Ok(())
}

// ═══ Attendance ═══

/// GET /api/hr/attendance
pub async fn list_attendance(
    ctx: RequestContext,
    Query(query): Query<AttendanceQuery>,
) -> AppResult<Json<Vec<Attendance>>> {
    ctx.ensure_perm(SECTION).await?;
    Ok(Json(attendance::find_all(ctx.pool()?, &query).await?))
}

/// POST /api/hr/attendance - one row per user and day
pub async fn record_attendance(
    ctx: RequestContext,
    Json(payload): Json<AttendanceRecord>,
) -> AppResult<Json<Attendance>> {
    ctx.ensure_perm(SECTION).await?;
    payload.validate()?;
    ensure_user(&ctx, payload.user_id).await?;

    let row = attendance::upsert(ctx.pool()?, &payload, ctx.user.id).await?;
    ctx.audit(
        AuditEvent::new(AuditAction::AttendanceRecorded)
            .entity("attendance", row.id)
            .details(json!({ "user_id": row.user_id, "date": row.date, "status": row.status })),
    )
    .await;
    Ok(Json(row))
}

/// DELETE /api/hr/attendance/{id}
pub async fn delete_attendance(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    ctx.ensure_perm(SECTION).await?;
    if !attendance::delete(ctx.pool()?, id).await? {
        return Err(AppError::new(ErrorCode::AttendanceNotFound).with_detail("id", id));
    }
    ctx.audit(AuditEvent::new(AuditAction::AttendanceDeleted).entity("attendance", id))
        .await;
    Ok(Json(true))
}

// ═══ Leave ═══

/// GET /api/hr/leaves
pub async fn list_leaves(
    ctx: RequestContext,
    Query(query): Query<LeaveQuery>,
) -> AppResult<Json<Vec<LeaveRequest>>> {
    ctx.ensure_perm(SECTION).await?;
    Ok(Json(leave::find_all(ctx.pool()?, &query).await?))
}

/// GET /api/hr/leaves/mine
pub async fn my_leaves(ctx: RequestContext) -> AppResult<Json<Vec<LeaveRequest>>> {
    let query = LeaveQuery {
        user_id: Some(ctx.user.id),
        status: None,
    };
    Ok(Json(leave::find_all(ctx.pool()?, &query).await?))
}

/// POST /api/hr/leaves - any authenticated user, for themselves
pub async fn request_leave(
    ctx: RequestContext,
    Json(payload): Json<LeaveCreate>,
) -> AppResult<Json<LeaveRequest>> {
    payload.validate()?;
    ensure_date_order(
        Some(payload.start_date),
        Some(payload.end_date),
        ErrorCode::LeaveDatesInvalid,
    )?;

    let pool = ctx.pool()?;
    let created = leave::create(pool, ctx.user.id, &payload).await?;
    ctx.audit(
        AuditEvent::new(AuditAction::LeaveRequested)
            .entity("leave", created.id)
            .details(json!({ "leave_type": created.leave_type, "days": created.days() })),
    )
    .await;

    let draft = NotificationDraft::new(
        kinds::LEAVE_REQUESTED,
        format!("{} requested {} day(s) of leave", ctx.user.name, created.days()),
    )
    .message(format!("{} to {}", created.start_date, created.end_date))
    .from_user(ctx.user.id)
    .entity("leave", created.id)
    .link("/hr/leaves");
    notification::notify_roles(pool, LEAVE_REVIEWERS, &draft).await;

    Ok(Json(created))
}

async fn decide_leave(
    ctx: RequestContext,
    id: i64,
    status: LeaveStatus,
    notes: Option<String>,
) -> AppResult<Json<LeaveRequest>> {
    ctx.ensure_perm(SECTION).await?;
    let pool = ctx.pool()?;

    let decided = leave::decide(pool, id, status, ctx.user.id, notes.as_deref())
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => AppError::new(ErrorCode::LeaveNotFound).with_detail("id", id),
            other => other.into(),
        })?
        .ok_or_else(|| AppError::new(ErrorCode::LeaveAlreadyDecided).with_detail("id", id))?;

    let action = match status {
        LeaveStatus::Approved => AuditAction::LeaveApproved,
        _ => AuditAction::LeaveRejected,
    };
    ctx.audit(AuditEvent::new(action).entity("leave", id)).await;

    let mut draft = NotificationDraft::new(kinds::LEAVE_DECIDED, format!("Your leave request was {status}"))
        .from_user(ctx.user.id)
        .entity("leave", id)
        .link("/hr/leaves");
    if let Some(notes) = decided.review_notes.as_deref() {
        draft = draft.message(notes);
    }
    notification::notify(pool, decided.user_id, &draft).await;

    Ok(Json(decided))
}

/// POST /api/hr/leaves/{id}/approve
pub async fn approve_leave(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<LeaveDecision>,
) -> AppResult<Json<LeaveRequest>> {
    decide_leave(ctx, id, LeaveStatus::Approved, payload.notes).await
}

/// POST /api/hr/leaves/{id}/reject
pub async fn reject_leave(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<LeaveDecision>,
) -> AppResult<Json<LeaveRequest>> {
    decide_leave(ctx, id, LeaveStatus::Rejected, payload.notes).await
}

// ═══ Payroll ═══

/// GET /api/hr/payroll
pub async fn list_payroll(
    ctx: RequestContext,
    Query(query): Query<PayrollQuery>,
) -> AppResult<Json<Vec<Payroll>>> {
    ctx.ensure_perm(SECTION).await?;
    Ok(Json(payroll::find_all(ctx.pool()?, &query).await?))
}

/// POST /api/hr/payroll - one entry per user and period
pub async fn create_payroll(
    ctx: RequestContext,
    Json(payload): Json<PayrollCreate>,
) -> AppResult<Json<Payroll>> {
    ctx.ensure_perm(SECTION).await?;
    payload.validate()?;
    parse_date(&format!("{}-01", payload.period))
        .map_err(|_| AppError::validation("period must be YYYY-MM").with_detail("period", payload.period.clone()))?;
    ensure_user(&ctx, payload.user_id).await?;

    let pool = ctx.pool()?;
    let created = payroll::create(pool, &payload, ctx.user.id)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::new(ErrorCode::PayrollPeriodExists)
                .with_detail("user_id", payload.user_id)
                .with_detail("period", payload.period.clone()),
            other => other.into(),
        })?;
    ctx.audit(
        AuditEvent::new(AuditAction::PayrollCreated)
            .entity("payroll", created.id)
            .details(json!({ "user_id": created.user_id, "period": created.period, "net_salary": created.net_salary })),
    )
    .await;

    let draft = NotificationDraft::new(kinds::PAYROLL_CREATED, format!("Payroll for {} is ready", created.period))
        .from_user(ctx.user.id)
        .entity("payroll", created.id);
    notification::notify(pool, created.user_id, &draft).await;

    Ok(Json(created))
}

/// POST /api/hr/payroll/{id}/pay
pub async fn mark_payroll_paid(
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(payload): Json<PayrollPayment>,
) -> AppResult<Json<Payroll>> {
    ctx.ensure_perm(SECTION).await?;
    let paid_date = payload.paid_date.unwrap_or_else(today);
    let paid = payroll::mark_paid(ctx.pool()?, id, paid_date)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => AppError::new(ErrorCode::PayrollNotFound).with_detail("id", id),
            other => other.into(),
        })?;
    ctx.audit(
        AuditEvent::new(AuditAction::PayrollPaid)
            .entity("payroll", id)
            .details(json!({ "paid_date": paid_date })),
    )
    .await;
    Ok(Json(paid))
}

/// DELETE /api/hr/payroll/{id}
pub async fn delete_payroll(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    ctx.ensure_perm(SECTION).await?;
    if !payroll::delete(ctx.pool()?, id).await? {
        return Err(AppError::new(ErrorCode::PayrollNotFound).with_detail("id", id));
    }
    ctx.audit(AuditEvent::new(AuditAction::PayrollDeleted).entity("payroll", id))
        .await;
    Ok(Json(true))
}
