//! Approval Workflow
//!
//! Sensitive mutations by actors without `<section>.autoApprove` are parked
//! as [`ApprovalRequest`]s and executed when a reviewer approves them.
//!
//! ```text
//! submit ──autoApprove──▶ Mutation::apply ──▶ Completed
//!    └────otherwise────▶ approval_requests (pending) ──▶ PendingApproval
//!
//! approve: BEGIN ─▶ claim (pending → approved) ─▶ Mutation::apply ─▶ COMMIT
//!          any error rolls back; the request stays pending
//! reject:  pending → rejected, no side effect
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use shared::models::{
    ApprovalAction, ApprovalRequest, ApprovalStatus, ExpenseCreate, ExpenseUpdate,
    InstallmentCreate, InstallmentUpdate, InvoiceUpdate, MutationOutcome, NEW_ENTITY_ID,
    NotificationDraft, PurchaseCreate, PurchaseUpdate, SaleCreate, SaleUpdate, kinds,
};
use sqlx::{SqliteConnection, SqlitePool};
use validator::Validate;

use crate::audit::{AuditAction, AuditEvent};
use crate::db::repository::{RepoError, approval, expense, installment, invoice, purchase, sale};
use crate::permissions::{Modifier, REVIEWER_ROLES, RequestContext};
use crate::services::notification;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Entity types the workflow can execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalEntity {
    Expense,
    Invoice,
    Installment,
    Purchase,
    Sale,
}

impl ApprovalEntity {
    pub const ALL: &'static [ApprovalEntity] = &[
        ApprovalEntity::Expense,
        ApprovalEntity::Invoice,
        ApprovalEntity::Installment,
        ApprovalEntity::Purchase,
        ApprovalEntity::Sale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalEntity::Expense => "expense",
            ApprovalEntity::Invoice => "invoice",
            ApprovalEntity::Installment => "installment",
            ApprovalEntity::Purchase => "purchase",
            ApprovalEntity::Sale => "sale",
        }
    }

    pub fn parse(entity_type: &str) -> AppResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == entity_type)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::ApprovalUnsupportedAction,
                    format!("Entity type '{entity_type}' cannot go through approval"),
                )
            })
    }

    /// Section whose `autoApprove` modifier skips the queue
    pub fn section(&self) -> &'static str {
        match self {
            ApprovalEntity::Invoice => "invoices",
            _ => "accounting",
        }
    }
}

/// A decoded, validated deferred mutation
#[derive(Debug, Clone)]
pub enum Mutation {
    CreateExpense(ExpenseCreate),
    UpdateExpense(i64, ExpenseUpdate),
    DeleteExpense(i64),
    UpdateInvoice(i64, InvoiceUpdate),
    DeleteInvoice(i64),
    CreateInstallment(InstallmentCreate),
    UpdateInstallment(i64, InstallmentUpdate),
    DeleteInstallment(i64),
    CreatePurchase(PurchaseCreate),
    UpdatePurchase(i64, PurchaseUpdate),
    DeletePurchase(i64),
    CreateSale(SaleCreate),
    UpdateSale(i64, SaleUpdate),
    DeleteSale(i64),
}

/// Outcome of an applied mutation
#[derive(Debug, Clone)]
pub struct Executed {
    pub entity_id: i64,
    pub result: Value,
    pub event: AuditEvent,
}

fn payload<T: DeserializeOwned + Validate>(data: &Value) -> AppResult<T> {
    let input: T = serde_json::from_value(data.clone()).map_err(|e| {
        AppError::with_message(
            ErrorCode::ApprovalPayloadInvalid,
            format!("Invalid request data: {e}"),
        )
    })?;
    input.validate()?;
    Ok(input)
}

fn target(entity_id: i64) -> AppResult<i64> {
    if entity_id <= NEW_ENTITY_ID {
        return Err(AppError::validation("entity_id is required for update and delete"));
    }
    Ok(entity_id)
}

fn executed<T: Serialize>(entity_id: i64, value: &T, event: AuditEvent) -> AppResult<Executed> {
    let result = serde_json::to_value(value).map_err(|e| AppError::internal(e.to_string()))?;
    Ok(Executed {
        entity_id,
        result,
        event,
    })
}

fn deleted(entity: ApprovalEntity, id: i64, found: bool, action: AuditAction) -> AppResult<Executed> {
    if !found {
        let code = match entity {
            ApprovalEntity::Expense => ErrorCode::ExpenseNotFound,
            ApprovalEntity::Invoice => ErrorCode::InvoiceNotFound,
            ApprovalEntity::Installment => ErrorCode::InstallmentNotFound,
            ApprovalEntity::Purchase => ErrorCode::PurchaseNotFound,
            ApprovalEntity::Sale => ErrorCode::SaleNotFound,
        };
        return Err(AppError::new(code).with_detail("id", id));
    }
    executed(id, &json!({ "deleted": true, "id": id }), AuditEvent::new(action).entity(entity.as_str(), id))
}

impl Mutation {
    /// Decode `data` for `entity` × `action`; unsupported pairs are `BAD_REQUEST`
    pub fn decode(
        entity: ApprovalEntity,
        action: ApprovalAction,
        entity_id: i64,
        data: &Value,
    ) -> AppResult<Self> {
        use ApprovalAction::*;
        use ApprovalEntity as E;

        let mutation = match (entity, action) {
            (E::Expense, Create) => Mutation::CreateExpense(payload(data)?),
            (E::Expense, Update) => Mutation::UpdateExpense(target(entity_id)?, payload(data)?),
            (E::Expense, Delete) => Mutation::DeleteExpense(target(entity_id)?),
            (E::Invoice, Update) => Mutation::UpdateInvoice(target(entity_id)?, payload(data)?),
            (E::Invoice, Delete) => Mutation::DeleteInvoice(target(entity_id)?),
            (E::Installment, Create) => Mutation::CreateInstallment(payload(data)?),
            (E::Installment, Update) => {
                Mutation::UpdateInstallment(target(entity_id)?, payload(data)?)
            }
            (E::Installment, Delete) => Mutation::DeleteInstallment(target(entity_id)?),
            (E::Purchase, Create) => Mutation::CreatePurchase(payload(data)?),
            (E::Purchase, Update) => Mutation::UpdatePurchase(target(entity_id)?, payload(data)?),
            (E::Purchase, Delete) => Mutation::DeletePurchase(target(entity_id)?),
            (E::Sale, Create) => Mutation::CreateSale(payload(data)?),
            (E::Sale, Update) => Mutation::UpdateSale(target(entity_id)?, payload(data)?),
            (E::Sale, Delete) => Mutation::DeleteSale(target(entity_id)?),
            (entity, action) => {
                return Err(AppError::with_message(
                    ErrorCode::ApprovalUnsupportedAction,
                    format!("'{}' on '{}' cannot go through approval", action, entity.as_str()),
                ));
            }
        };
        Ok(mutation)
    }

    /// Run the mutation on `conn`; creates are attributed to `actor`
    pub async fn apply(self, conn: &mut SqliteConnection, actor: i64) -> AppResult<Executed> {
        use ApprovalEntity as E;

        match self {
            Mutation::CreateExpense(data) => {
                let row = expense::create(&mut *conn, &data, actor).await?;
                executed(row.id, &row, AuditEvent::new(AuditAction::ExpenseCreated).entity("expense", row.id))
            }
            Mutation::UpdateExpense(id, data) => {
                let row = expense::update(&mut *conn, id, &data).await?;
                executed(id, &row, AuditEvent::new(AuditAction::ExpenseUpdated).entity("expense", id))
            }
            Mutation::DeleteExpense(id) => {
                let found = expense::delete(&mut *conn, id).await?;
                deleted(E::Expense, id, found, AuditAction::ExpenseDeleted)
            }
            Mutation::UpdateInvoice(id, data) => {
                let detail = invoice::update(&mut *conn, id, &data).await?;
                executed(id, &detail, AuditEvent::new(AuditAction::InvoiceUpdated).entity("invoice", id))
            }
            Mutation::DeleteInvoice(id) => {
                let found = invoice::delete(&mut *conn, id).await?;
                deleted(E::Invoice, id, found, AuditAction::InvoiceDeleted)
            }
            Mutation::CreateInstallment(data) => {
                let row = installment::create(&mut *conn, &data, actor).await?;
                executed(row.id, &row, AuditEvent::new(AuditAction::InstallmentCreated).entity("installment", row.id))
            }
            Mutation::UpdateInstallment(id, data) => {
                let row = installment::update(&mut *conn, id, &data).await?;
                executed(id, &row, AuditEvent::new(AuditAction::InstallmentUpdated).entity("installment", id))
            }
            Mutation::DeleteInstallment(id) => {
                let found = installment::delete(&mut *conn, id).await?;
                deleted(E::Installment, id, found, AuditAction::InstallmentDeleted)
            }
            Mutation::CreatePurchase(data) => {
                let row = purchase::create(&mut *conn, &data, actor).await?;
                executed(row.id, &row, AuditEvent::new(AuditAction::PurchaseCreated).entity("purchase", row.id))
            }
            Mutation::UpdatePurchase(id, data) => {
                let row = purchase::update(&mut *conn, id, &data).await?;
                executed(id, &row, AuditEvent::new(AuditAction::PurchaseUpdated).entity("purchase", id))
            }
            Mutation::DeletePurchase(id) => {
                let found = purchase::delete(&mut *conn, id).await?;
                deleted(E::Purchase, id, found, AuditAction::PurchaseDeleted)
            }
            Mutation::CreateSale(data) => {
                let row = sale::create(&mut *conn, &data, actor).await?;
                executed(row.id, &row, AuditEvent::new(AuditAction::SaleCreated).entity("sale", row.id))
            }
            Mutation::UpdateSale(id, data) => {
                let row = sale::update(&mut *conn, id, &data).await?;
                executed(id, &row, AuditEvent::new(AuditAction::SaleUpdated).entity("sale", id))
            }
            Mutation::DeleteSale(id) => {
                let found = sale::delete(&mut *conn, id).await?;
                deleted(E::Sale, id, found, AuditAction::SaleDeleted)
            }
        }
    }
}

/// Execute now with `autoApprove`, otherwise file a request
pub async fn submit(
    ctx: &RequestContext,
    entity: ApprovalEntity,
    action: ApprovalAction,
    entity_id: i64,
    data: Value,
) -> AppResult<MutationOutcome<Value>> {
    let mutation = Mutation::decode(entity, action, entity_id, &data)?;

    if ctx.has_modifier(entity.section(), Modifier::AutoApprove).await? {
        let mut tx = ctx.pool()?.begin().await.map_err(RepoError::from)?;
        let done = mutation.apply(&mut tx, ctx.user.id).await?;
        tx.commit().await.map_err(RepoError::from)?;
        ctx.audit(done.event).await;
        return Ok(MutationOutcome::Completed { result: done.result });
    }

    let request = file_request(ctx, entity, action, entity_id, data).await?;
    Ok(MutationOutcome::PendingApproval {
        approval_id: request.id,
    })
}

/// Store a pending request and tell the reviewers about it
pub async fn file_request(
    ctx: &RequestContext,
    entity: ApprovalEntity,
    action: ApprovalAction,
    entity_id: i64,
    data: Value,
) -> AppResult<ApprovalRequest> {
    // reviewers must never be handed a request that cannot execute
    Mutation::decode(entity, action, entity_id, &data)?;

    let entity_id = match action {
        ApprovalAction::Create => NEW_ENTITY_ID,
        _ => entity_id,
    };
    let pool = ctx.pool()?;
    let request = approval::create(pool, entity.as_str(), entity_id, action, &data, ctx.user.id).await?;

    ctx.audit(
        AuditEvent::new(AuditAction::ApprovalRequested)
            .entity("approval", request.id)
            .details(json!({
                "entity_type": entity.as_str(),
                "entity_id": entity_id,
                "action": action,
            })),
    )
    .await;

    let draft = NotificationDraft::new(
        kinds::APPROVAL_REQUESTED,
        format!("{} requests approval to {} a {}", ctx.user.name, action, entity.as_str()),
    )
    .from_user(ctx.user.id)
    .link(format!("/approvals/{}", request.id))
    .entity("approval", request.id);
    notification::notify_roles(pool, REVIEWER_ROLES, &draft).await;

    tracing::info!(
        approval_id = request.id,
        entity_type = entity.as_str(),
        action = %action,
        requested_by = ctx.user.id,
        "Approval request filed"
    );
    Ok(request)
}

fn already_processed(id: i64) -> AppError {
    AppError::new(ErrorCode::ApprovalAlreadyProcessed).with_detail("id", id)
}

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::ApprovalNotFound).with_detail("id", id)
}

/// Claim a pending request and run its mutation in one transaction.
///
/// Nothing is committed unless the mutation succeeds, so a failed execution
/// leaves the request pending and the target tables untouched.
pub async fn approve(ctx: &RequestContext, id: i64, notes: Option<&str>) -> AppResult<ApprovalRequest> {
    ctx.ensure_reviewer().await?;
    let pool = ctx.pool()?;
    let mut tx = pool.begin().await.map_err(RepoError::from)?;

    let claimed = match approval::decide(&mut *tx, id, ApprovalStatus::Approved, ctx.user.id, notes).await {
        Ok(Some(request)) => request,
        Ok(None) => return Err(already_processed(id)),
        Err(RepoError::NotFound(_)) => return Err(not_found(id)),
        Err(e) => return Err(e.into()),
    };

    let entity = ApprovalEntity::parse(&claimed.entity_type)?;
    let mutation = Mutation::decode(entity, claimed.action, claimed.entity_id, &claimed.request_data)?;
    let done = match mutation.apply(&mut tx, claimed.requested_by).await {
        Ok(done) => done,
        Err(e) => {
            tracing::warn!(approval_id = id, error = %e, "Approved mutation failed, decision rolled back");
            return Err(e);
        }
    };
    if claimed.action == ApprovalAction::Create {
        approval::set_entity_id(&mut *tx, id, done.entity_id).await?;
    }
    tx.commit().await.map_err(RepoError::from)?;

    ctx.audit(done.event).await;
    ctx.audit(
        AuditEvent::new(AuditAction::ApprovalApproved)
            .entity("approval", id)
            .details(json!({ "entity_id": done.entity_id, "requested_by": claimed.requested_by })),
    )
    .await;
    notify_decision(pool, ctx, &claimed, "approved").await;

    approval::find_by_id(&mut *pool.acquire().await.map_err(RepoError::from)?, id).await?.ok_or_else(|| not_found(id))
}

/// Mark a pending request rejected; the embedded mutation is discarded
pub async fn reject(ctx: &RequestContext, id: i64, reason: &str) -> AppResult<ApprovalRequest> {
    ctx.ensure_reviewer().await?;
    let pool = ctx.pool()?;

    let rejected = match approval::decide(&mut *pool.acquire().await.map_err(RepoError::from)?, id, ApprovalStatus::Rejected, ctx.user.id, Some(reason)).await {
        Ok(Some(request)) => request,
        Ok(None) => return Err(already_processed(id)),
        Err(RepoError::NotFound(_)) => return Err(not_found(id)),
        Err(e) => return Err(e.into()),
    };

    ctx.audit(
        AuditEvent::new(AuditAction::ApprovalRejected)
            .entity("approval", id)
            .details(json!({ "reason": reason, "requested_by": rejected.requested_by })),
    )
    .await;
    notify_decision(pool, ctx, &rejected, "rejected").await;
    Ok(rejected)
}

async fn notify_decision(pool: &SqlitePool, ctx: &RequestContext, request: &ApprovalRequest, verdict: &str) {
    let draft = NotificationDraft::new(
        kinds::APPROVAL_DECIDED,
        format!("Your {} {} request was {}", request.entity_type, request.action, verdict),
    )
    .from_user(ctx.user.id)
    .link(format!("/approvals/{}", request.id))
    .entity("approval", request.id);
    let draft = match &request.review_notes {
        Some(notes) => draft.message(notes.clone()),
        None => draft,
    };
    notification::notify(pool, request.requested_by, &draft).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{notification as notification_repo, testing};
    use crate::permissions::context::testing::context_for;
    use shared::models::{ExpenseStatus, NotificationQuery};

    fn expense_payload(amount: i64) -> Value {
        json!({
            "category": "materials",
            "amount": amount,
            "expense_date": "2024-03-05",
        })
    }

    #[test]
    fn test_decode_rejects_unsupported_pairs() {
        let err = Mutation::decode(ApprovalEntity::Invoice, ApprovalAction::Create, 0, &json!({}))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ApprovalUnsupportedAction);
        assert_eq!(err.code.kind(), "BAD_REQUEST");

        let err = ApprovalEntity::parse("payroll").unwrap_err();
        assert_eq!(err.code, ErrorCode::ApprovalUnsupportedAction);
    }

    #[test]
    fn test_decode_validates_payload() {
        let err = Mutation::decode(
            ApprovalEntity::Expense,
            ApprovalAction::Create,
            0,
            &json!({ "category": "x" }),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ApprovalPayloadInvalid);

        let err = Mutation::decode(ApprovalEntity::Expense, ApprovalAction::Delete, 0, &json!({}))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_auto_approve_executes_immediately() {
        let pool = testing::pool().await;
        let finance = context_for(&pool, "finance_manager").await;

        let outcome = submit(&finance, ApprovalEntity::Expense, ApprovalAction::Create, 0, expense_payload(250))
            .await
            .unwrap();
        let MutationOutcome::Completed { result } = outcome else {
            panic!("expected immediate execution");
        };
        assert_eq!(result["amount"], 250);
        assert!(approval::find_all(&pool, &Default::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_request_round_trip() {
        let pool = testing::pool().await;
        let accountant = context_for(&pool, "accountant").await;
        let reviewer = context_for(&pool, "admin").await;

        let outcome = submit(&accountant, ApprovalEntity::Expense, ApprovalAction::Create, 0, expense_payload(900))
            .await
            .unwrap();
        let MutationOutcome::PendingApproval { approval_id } = outcome else {
            panic!("expected a pending request");
        };

        let pending = approval::find_by_id(&mut *pool.acquire().await.unwrap(), approval_id).await.unwrap().unwrap();
        assert_eq!(pending.entity_id, NEW_ENTITY_ID);
        assert!(pending.is_pending());
        assert!(expense::find_all(&pool, &Default::default()).await.unwrap().is_empty());
        // the reviewer was told
        assert_eq!(notification_repo::unread_count(&pool, reviewer.user.id).await.unwrap(), 1);

        let approved = approve(&reviewer, approval_id, Some("ok")).await.unwrap();
        assert_eq!(approved.status, ApprovalStatus::Approved);
        assert_ne!(approved.entity_id, NEW_ENTITY_ID);

        let created = expense::find_by_id(&mut *pool.acquire().await.unwrap(), approved.entity_id).await.unwrap().unwrap();
        assert_eq!(created.amount, 900);
        assert_eq!(created.status, ExpenseStatus::Pending);
        assert_eq!(created.created_by, Some(accountant.user.id));

        let inbox = notification_repo::find_for_user(&pool, accountant.user.id, &NotificationQuery::default())
            .await
            .unwrap();
        assert_eq!(inbox[0].kind, kinds::APPROVAL_DECIDED);
    }

    #[tokio::test]
    async fn test_second_decision_is_bad_request() {
        let pool = testing::pool().await;
        let accountant = context_for(&pool, "accountant").await;
        let reviewer = context_for(&pool, "finance_manager").await;

        let request = file_request(&accountant, ApprovalEntity::Expense, ApprovalAction::Create, 0, expense_payload(10))
            .await
            .unwrap();
        reject(&reviewer, request.id, "duplicate").await.unwrap();

        let err = approve(&reviewer, request.id, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ApprovalAlreadyProcessed);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
        let err = reject(&reviewer, request.id, "again").await.unwrap_err();
        assert_eq!(err.code.kind(), "BAD_REQUEST");

        // rejection never touched the target table
        assert!(expense::find_all(&pool, &Default::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_execution_never_approves() {
        let pool = testing::pool().await;
        let accountant = context_for(&pool, "accountant").await;
        let reviewer = context_for(&pool, "admin").await;

        let request = file_request(&accountant, ApprovalEntity::Expense, ApprovalAction::Delete, 4242, json!({}))
            .await
            .unwrap();
        let err = approve(&reviewer, request.id, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpenseNotFound);

        let stored = approval::find_by_id(&mut *pool.acquire().await.unwrap(), request.id).await.unwrap().unwrap();
        assert!(stored.is_pending());
        assert_eq!(stored.reviewed_by, None);
        assert_eq!(stored.reviewed_at, None);

        // still open to a single decision
        reject(&reviewer, request.id, "nothing to delete").await.unwrap();
        let err = approve(&reviewer, request.id, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ApprovalAlreadyProcessed);
    }

    #[tokio::test]
    async fn test_failed_create_leaves_no_rows() {
        let pool = testing::pool().await;
        let accountant = context_for(&pool, "accountant").await;
        let reviewer = context_for(&pool, "finance_manager").await;

        // the project referenced by the payload is gone by the time it is approved
        let project_id = testing::insert_project(&pool, "Temp").await;
        let mut payload = expense_payload(75);
        payload["project_id"] = json!(project_id);
        let request = file_request(&accountant, ApprovalEntity::Expense, ApprovalAction::Create, 0, payload)
            .await
            .unwrap();
        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(project_id)
            .execute(&pool)
            .await
            .unwrap();

        assert!(approve(&reviewer, request.id, None).await.is_err());
        assert!(expense::find_all(&pool, &Default::default()).await.unwrap().is_empty());
        let stored = approval::find_by_id(&mut *pool.acquire().await.unwrap(), request.id).await.unwrap().unwrap();
        assert!(stored.is_pending());
        assert_eq!(stored.entity_id, NEW_ENTITY_ID);
    }

    #[tokio::test]
    async fn test_non_reviewer_cannot_decide() {
        let pool = testing::pool().await;
        let accountant = context_for(&pool, "accountant").await;
        let request = file_request(&accountant, ApprovalEntity::Sale, ApprovalAction::Delete, 7, json!({}))
            .await
            .unwrap();

        let err = approve(&accountant, request.id, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ReviewerRequired);
        assert!(approval::find_by_id(&mut *pool.acquire().await.unwrap(), request.id).await.unwrap().unwrap().is_pending());
    }

    #[tokio::test]
    async fn test_missing_request_is_not_found() {
        let pool = testing::pool().await;
        let reviewer = context_for(&pool, "admin").await;
        let err = approve(&reviewer, 999, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ApprovalNotFound);
    }
}
