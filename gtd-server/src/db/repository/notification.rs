//! Notification Repository
//!
//! Every read/update/delete is scoped to the recipient.

use super::{RepoError, RepoResult};
use shared::models::{Notification, NotificationDraft, NotificationQuery};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COLUMNS: &str = "id, user_id, from_user_id, type, title, message, link, is_read, entity_type, entity_id, created_at";

const MAX_LIST: i64 = 200;

pub async fn find_for_user(
    pool: &SqlitePool,
    user_id: i64,
    query: &NotificationQuery,
) -> RepoResult<Vec<Notification>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM notifications WHERE user_id = "));
    qb.push_bind(user_id);
    if query.unread_only.unwrap_or(false) {
        qb.push(" AND is_read = 0");
    }
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(query.limit.unwrap_or(50).clamp(1, MAX_LIST));

    let rows = qb.build_query_as::<Notification>().fetch_all(pool).await?;
    Ok(rows)
}

/// Insert one copy per recipient
pub async fn create_many(
    pool: &SqlitePool,
    recipients: &[i64],
    draft: &NotificationDraft,
) -> RepoResult<usize> {
    if recipients.is_empty() {
        return Ok(0);
    }
    let now = now_millis();
    let mut tx = pool.begin().await?;
    for user_id in recipients {
        sqlx::query(
            "INSERT INTO notifications (user_id, from_user_id, type, title, message, link, is_read, entity_type, entity_id, created_at) VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(draft.from_user_id)
        .bind(&draft.kind)
        .bind(&draft.title)
        .bind(&draft.message)
        .bind(&draft.link)
        .bind(&draft.entity_type)
        .bind(draft.entity_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(recipients.len())
}

pub async fn unread_count(pool: &SqlitePool, user_id: i64) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(n)
}

/// Mark one notification read. Reading is one-way: already-read rows stay read.
pub async fn mark_read(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<()> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM notifications WHERE id = ? AND user_id = ?)",
    )
    .bind(id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    if !exists {
        return Err(RepoError::NotFound(format!("Notification {id} not found")));
    }

    sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ? AND is_read = 0")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn mark_all_read(pool: &SqlitePool, user_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}

pub async fn delete(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM notifications WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;

    #[tokio::test]
    async fn test_fan_out_and_read_state() {
        let pool = testing::pool().await;
        let a = testing::insert_user(&pool, "a@gtd.test", "admin").await;
        let b = testing::insert_user(&pool, "b@gtd.test", "hr_manager").await;

        let draft = NotificationDraft::new("leave_requested", "New leave request").entity("leave", 7);
        assert_eq!(create_many(&pool, &[a, b], &draft).await.unwrap(), 2);
        assert_eq!(unread_count(&pool, a).await.unwrap(), 1);

        let mine = find_for_user(&pool, a, &NotificationQuery::default()).await.unwrap();
        assert_eq!(mine.len(), 1);
        mark_read(&pool, a, mine[0].id).await.unwrap();
        mark_read(&pool, a, mine[0].id).await.unwrap();
        assert_eq!(unread_count(&pool, a).await.unwrap(), 0);
        // b's copy is independent
        assert_eq!(unread_count(&pool, b).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cannot_touch_other_users_rows() {
        let pool = testing::pool().await;
        let a = testing::insert_user(&pool, "a@gtd.test", "admin").await;
        let b = testing::insert_user(&pool, "b@gtd.test", "designer").await;
        create_many(&pool, &[a], &NotificationDraft::new("role_assigned", "Hi"))
            .await
            .unwrap();
        let id = find_for_user(&pool, a, &NotificationQuery::default()).await.unwrap()[0].id;

        assert!(matches!(mark_read(&pool, b, id).await, Err(RepoError::NotFound(_))));
        assert!(!delete(&pool, b, id).await.unwrap());
        assert!(delete(&pool, a, id).await.unwrap());
    }

    #[tokio::test]
    async fn test_unread_only_and_mark_all() {
        let pool = testing::pool().await;
        let a = testing::insert_user(&pool, "a@gtd.test", "admin").await;
        let draft = NotificationDraft::new("task_assigned", "Task");
        create_many(&pool, &[a, a, a], &draft).await.unwrap();
        assert_eq!(mark_all_read(&pool, a).await.unwrap(), 3);

        let query = NotificationQuery {
            unread_only: Some(true),
            limit: None,
        };
        assert!(find_for_user(&pool, a, &query).await.unwrap().is_empty());
    }
}
