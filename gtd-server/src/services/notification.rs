//! Notification fan-out
//!
//! Workflow events (leave requests, role changes, payroll, approvals) write
//! one row per recipient. Failures are logged and never reach the caller.

use shared::models::NotificationDraft;
use sqlx::SqlitePool;

use crate::db::repository::{notification, user};

/// Notify one user; returns rows written
pub async fn notify(pool: &SqlitePool, user_id: i64, draft: &NotificationDraft) -> usize {
    notify_users(pool, &[user_id], draft).await
}

/// Notify a list of users
pub async fn notify_users(pool: &SqlitePool, recipients: &[i64], draft: &NotificationDraft) -> usize {
    match notification::create_many(pool, recipients, draft).await {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(kind = %draft.kind, error = %e, "Failed to write notifications");
            0
        }
    }
}

/// Every active user holding any of `roles` gets an individual copy
pub async fn notify_roles(pool: &SqlitePool, roles: &[&str], draft: &NotificationDraft) -> usize {
    let recipients = match user::find_ids_by_roles(pool, roles).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!(kind = %draft.kind, error = %e, "Failed to resolve notification recipients");
            return 0;
        }
    };
    notify_users(pool, &recipients, draft).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;
    use shared::models::{NotificationQuery, kinds};

    #[tokio::test]
    async fn test_role_fan_out_creates_one_row_per_recipient() {
        let pool = testing::pool().await;
        let admin = testing::insert_user(&pool, "admin@gtd.local", "admin").await;
        let hr = testing::insert_user(&pool, "hr@gtd.local", "hr_manager").await;
        let designer = testing::insert_user(&pool, "designer@gtd.local", "designer").await;

        let draft = NotificationDraft::new(kinds::LEAVE_REQUESTED, "New leave request")
            .from_user(designer)
            .entity("leave", 1);
        let written = notify_roles(&pool, &["admin", "hr_manager"], &draft).await;
        assert_eq!(written, 2);

        for id in [admin, hr] {
            assert_eq!(notification::unread_count(&pool, id).await.unwrap(), 1);
        }
        assert_eq!(notification::unread_count(&pool, designer).await.unwrap(), 0);

        // copies are independent: reading one leaves the other unread
        let admin_rows = notification::find_for_user(&pool, admin, &NotificationQuery::default())
            .await
            .unwrap();
        notification::mark_read(&pool, admin, admin_rows[0].id).await.unwrap();
        assert_eq!(notification::unread_count(&pool, admin).await.unwrap(), 0);
        assert_eq!(notification::unread_count(&pool, hr).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let pool = testing::pool().await;
        let user_id = testing::insert_user(&pool, "a@gtd.local", "admin").await;
        sqlx::query("DROP TABLE notifications").execute(&pool).await.unwrap();
        let draft = NotificationDraft::new(kinds::ROLE_ASSIGNED, "Role changed");
        assert_eq!(notify(&pool, user_id, &draft).await, 0);
    }
}
