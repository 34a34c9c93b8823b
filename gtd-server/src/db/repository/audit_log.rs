//! Audit Log Repository (append-only)

use super::RepoResult;
use serde_json::Value;
use shared::models::{AuditLogEntry, AuditQuery};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COLUMNS: &str = "id, user_id, action, entity_type, entity_id, details, ip_address, created_at";

const MAX_LIMIT: i64 = 500;

/// Row to append
#[derive(Debug, Clone, Default)]
pub struct NewAuditLog<'a> {
    pub user_id: Option<i64>,
    pub action: &'a str,
    pub entity_type: Option<&'a str>,
    pub entity_id: Option<i64>,
    pub details: Option<&'a Value>,
    pub ip_address: Option<&'a str>,
}

pub async fn insert(pool: &SqlitePool, entry: NewAuditLog<'_>) -> RepoResult<i64> {
    let id = sqlx::query(
        "INSERT INTO audit_logs (user_id, action, entity_type, entity_id, details, ip_address, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(entry.user_id)
    .bind(entry.action)
    .bind(entry.entity_type)
    .bind(entry.entity_id)
    .bind(entry.details.map(sqlx::types::Json))
    .bind(entry.ip_address)
    .bind(now_millis())
    .execute(pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &AuditQuery) {
    if let Some(user_id) = query.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(action) = &query.action {
        qb.push(" AND action = ").push_bind(action.clone());
    }
    if let Some(entity_type) = &query.entity_type {
        qb.push(" AND entity_type = ").push_bind(entity_type.clone());
    }
    if let Some(from) = query.from {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = query.to {
        qb.push(" AND created_at <= ").push_bind(to);
    }
}

/// Page of entries (newest first) plus the unpaged total
pub async fn query(pool: &SqlitePool, query: &AuditQuery) -> RepoResult<(Vec<AuditLogEntry>, i64)> {
    let mut count_qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM audit_logs WHERE 1 = 1");
    push_filters(&mut count_qb, query);
    let total = count_qb.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM audit_logs WHERE 1 = 1"));
    push_filters(&mut qb, query);
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(query.limit.clamp(1, MAX_LIMIT))
        .push(" OFFSET ")
        .push_bind(query.offset.max(0));
    let items = qb.build_query_as::<AuditLogEntry>().fetch_all(pool).await?;

    Ok((items, total))
}
