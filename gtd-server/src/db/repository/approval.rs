//! Approval Request Repository

use super::{RepoError, RepoResult};
use serde_json::Value;
use shared::models::{ApprovalAction, ApprovalQuery, ApprovalRequest, ApprovalStatus};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, entity_type, entity_id, action, request_data, status, requested_by, reviewed_by, review_notes, reviewed_at, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool, query: &ApprovalQuery) -> RepoResult<Vec<ApprovalRequest>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM approval_requests WHERE 1 = 1"));
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(entity_type) = &query.entity_type {
        qb.push(" AND entity_type = ").push_bind(entity_type.clone());
    }
    if let Some(requested_by) = query.requested_by {
        qb.push(" AND requested_by = ").push_bind(requested_by);
    }
    qb.push(" ORDER BY created_at DESC, id DESC");

    let rows = qb.build_query_as::<ApprovalRequest>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<ApprovalRequest>>
{
    let row = sqlx::query_as::<_, ApprovalRequest>(&format!(
        "SELECT {COLUMNS} FROM approval_requests WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

pub async fn create(
    pool: &SqlitePool,
    entity_type: &str,
    entity_id: i64,
    action: ApprovalAction,
    request_data: &Value,
    requested_by: i64,
) -> RepoResult<ApprovalRequest> {
    let now = now_millis();
    let id = sqlx::query(
        "INSERT INTO approval_requests (entity_type, entity_id, action, request_data, status, requested_by, created_at, updated_at) VALUES (?, ?, ?, ?, 'pending', ?, ?, ?)",
    )
    .bind(entity_type)
    .bind(entity_id)
    .bind(action)
    .bind(sqlx::types::Json(request_data))
    .bind(requested_by)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    find_by_id(&mut *pool.acquire().await?, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create approval request".into()))
}

/// Move a pending request to `status`.
///
/// The `status = 'pending'` guard makes the transition happen at most once;
/// `Ok(None)` means the request exists but was already decided. Pass a
/// transaction to make the transition depend on later work.
pub async fn decide(conn: &mut SqliteConnection,
    id: i64,
    status: ApprovalStatus,
    reviewed_by: i64,
    notes: Option<&str>,
) -> RepoResult<Option<ApprovalRequest>>
{
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE approval_requests SET status = ?, reviewed_by = ?, review_notes = ?, reviewed_at = ?, updated_at = ? WHERE id = ? AND status = 'pending'",
    )
    .bind(status)
    .bind(reviewed_by)
    .bind(notes)
    .bind(now)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        return match find_by_id(&mut *conn, id).await? {
            Some(_) => Ok(None),
            None => Err(RepoError::NotFound(format!("Approval request {id} not found"))),
        };
    }
    find_by_id(&mut *conn, id).await
}

/// Point a create request at the entity it produced
pub async fn set_entity_id(conn: &mut SqliteConnection, id: i64, entity_id: i64) -> RepoResult<()>
{
    let rows = sqlx::query("UPDATE approval_requests SET entity_id = ? WHERE id = ?")
        .bind(entity_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Approval request {id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;
    use serde_json::json;
    use shared::models::NEW_ENTITY_ID;

    #[tokio::test]
    async fn test_transition_happens_once() {
        let pool = testing::pool().await;
        let requester = testing::insert_user(&pool, "r@gtd.test", "accountant").await;
        let reviewer = testing::insert_user(&pool, "f@gtd.test", "finance_manager").await;
        let request = create(
            &pool,
            "expense",
            NEW_ENTITY_ID,
            ApprovalAction::Create,
            &json!({"category": "travel", "amount": 120}),
            requester,
        )
        .await
        .unwrap();
        assert!(request.is_pending());
        assert_eq!(request.request_data["amount"], 120);

        let approved = decide(&mut *pool.acquire().await.unwrap(), request.id, ApprovalStatus::Approved, reviewer, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(approved.status, ApprovalStatus::Approved);
        assert!(approved.reviewed_at.is_some());

        let second = decide(&mut *pool.acquire().await.unwrap(), request.id, ApprovalStatus::Rejected, reviewer, Some("no"))
            .await
            .unwrap();
        assert!(second.is_none());
        let stored = find_by_id(&mut *pool.acquire().await.unwrap(), request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ApprovalStatus::Approved);
    }

    #[tokio::test]
    async fn test_decision_rolls_back_with_transaction() {
        let pool = testing::pool().await;
        let requester = testing::insert_user(&pool, "r@gtd.test", "accountant").await;
        let request = create(
            &pool,
            "invoice",
            3,
            ApprovalAction::Delete,
            &json!({}),
            requester,
        )
        .await
        .unwrap();

        let mut tx = pool.begin().await.unwrap();
        let claimed = decide(&mut *tx, request.id, ApprovalStatus::Approved, requester, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(claimed.status, ApprovalStatus::Approved);
        tx.rollback().await.unwrap();

        let query = ApprovalQuery {
            status: Some(ApprovalStatus::Pending),
            ..Default::default()
        };
        let pending = find_all(&pool, &query).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert!(pending[0].reviewed_by.is_none());
    }
}
