//! Audit Log Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Immutable audit record. Never updated or deleted by normal flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AuditLogEntry {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    #[cfg_attr(feature = "db", sqlx(json(nullable)))]
    pub details: Option<Value>,
    pub ip_address: Option<String>,
    pub created_at: i64,
}

/// Audit log query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditQuery {
    pub user_id: Option<i64>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    /// Start time (Unix millis)
    pub from: Option<i64>,
    /// End time (Unix millis)
    pub to: Option<i64>,
    /// First calendar day (UTC), used when `from` is absent
    pub from_date: Option<NaiveDate>,
    /// Last calendar day (UTC, inclusive), used when `to` is absent
    pub to_date: Option<NaiveDate>,
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            action: None,
            entity_type: None,
            from: None,
            to: None,
            from_date: None,
            to_date: None,
            offset: 0,
            limit: default_limit(),
        }
    }
}

/// Audit list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditListResponse {
    pub items: Vec<AuditLogEntry>,
    pub total: i64,
}
