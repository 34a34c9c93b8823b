//! Leave Request Repository

use super::{RepoError, RepoResult};
use shared::models::{LeaveCreate, LeaveQuery, LeaveRequest, LeaveStatus};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COLUMNS: &str = "id, user_id, leave_type, start_date, end_date, reason, status, reviewed_by, review_notes, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool, query: &LeaveQuery) -> RepoResult<Vec<LeaveRequest>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM leave_requests WHERE 1 = 1"));
    if let Some(user_id) = query.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    qb.push(" ORDER BY created_at DESC, id DESC");

    let rows = qb.build_query_as::<LeaveRequest>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<LeaveRequest>> {
    let row = sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {COLUMNS} FROM leave_requests WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, user_id: i64, data: &LeaveCreate) -> RepoResult<LeaveRequest> {
    let now = now_millis();
    let id = sqlx::query(
        "INSERT INTO leave_requests (user_id, leave_type, start_date, end_date, reason, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, 'pending', ?, ?)",
    )
    .bind(user_id)
    .bind(data.leave_type)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(&data.reason)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create leave request".into()))
}

/// Decide a pending request. Returns `None` when the request was already decided.
pub async fn decide(
    pool: &SqlitePool,
    id: i64,
    status: LeaveStatus,
    reviewed_by: i64,
    notes: Option<&str>,
) -> RepoResult<Option<LeaveRequest>> {
    let rows = sqlx::query(
        "UPDATE leave_requests SET status = ?, reviewed_by = ?, review_notes = ?, updated_at = ? WHERE id = ? AND status = 'pending'",
    )
    .bind(status)
    .bind(reviewed_by)
    .bind(notes)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return match find_by_id(pool, id).await? {
            Some(_) => Ok(None),
            None => Err(RepoError::NotFound(format!("Leave request {id} not found"))),
        };
    }
    find_by_id(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM leave_requests WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;
    use chrono::NaiveDate;
    use shared::models::LeaveType;

    #[tokio::test]
    async fn test_decide_only_once() {
        let pool = testing::pool().await;
        let employee = testing::insert_user(&pool, "e@gtd.test", "designer").await;
        let hr = testing::insert_user(&pool, "hr@gtd.test", "hr_manager").await;
        let request = create(
            &pool,
            employee,
            &LeaveCreate {
                leave_type: LeaveType::Annual,
                start_date: NaiveDate::from_ymd_opt(2024, 8, 5).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 8, 9).unwrap(),
                reason: Some("Family trip".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(request.status, LeaveStatus::Pending);

        let approved = decide(&pool, request.id, LeaveStatus::Approved, hr, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.reviewed_by, Some(hr));

        let again = decide(&pool, request.id, LeaveStatus::Rejected, hr, Some("late"))
            .await
            .unwrap();
        assert!(again.is_none());
        let err = decide(&pool, 404, LeaveStatus::Approved, hr, None).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
