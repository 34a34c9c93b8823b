//! Best-effort audit writer

use sqlx::SqlitePool;

use super::AuditEvent;
use crate::db::repository::audit_log::{self, NewAuditLog};

/// Append one audit row. Storage failures are logged and swallowed.
pub async fn log_audit(
    pool: &SqlitePool,
    user_id: Option<i64>,
    ip_address: Option<&str>,
    event: AuditEvent,
) {
    let entry = NewAuditLog {
        user_id,
        action: event.action.as_str(),
        entity_type: event.entity_type,
        entity_id: event.entity_id,
        details: event.details.as_ref(),
        ip_address,
    };

    if let Err(e) = audit_log::insert(pool, entry).await {
        tracing::error!(
            action = %event.action,
            user_id = ?user_id,
            error = %e,
            "Failed to write audit log"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditAction;
    use crate::db::repository::testing;
    use shared::models::AuditQuery;

    #[tokio::test]
    async fn test_log_audit_writes_row() {
        let pool = testing::pool().await;
        let event = AuditEvent::new(AuditAction::ClientCreated)
            .entity("client", 4)
            .details(serde_json::json!({"name": "Villa Rosa"}));
        log_audit(&pool, Some(1), Some("203.0.113.5"), event).await;

        let (items, total) = audit_log::query(&pool, &AuditQuery::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].action, "client_created");
        assert_eq!(items[0].entity_id, Some(4));
    }

    #[tokio::test]
    async fn test_log_audit_swallows_storage_errors() {
        let pool = testing::pool().await;
        sqlx::query("DROP TABLE audit_logs").execute(&pool).await.unwrap();
        // must not panic or return an error
        log_audit(&pool, None, None, AuditEvent::new(AuditAction::Logout)).await;
    }
}
