//! Approval Request Model
//!
//! Envelope around a deferred create/update/delete on another entity.
//! `pending -> approved` or `pending -> rejected`, exactly once.

use serde::{Deserialize, Serialize};
use serde_json::Value;

status_enum! {
    ApprovalStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

status_enum! {
    ApprovalAction {
        Create => "create",
        Update => "update",
        Delete => "delete",
    }
}

/// `entity_id` placeholder for create requests (entity does not exist yet)
pub const NEW_ENTITY_ID: i64 = 0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ApprovalRequest {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub action: ApprovalAction,
    /// Serialized input of the deferred mutation
    #[cfg_attr(feature = "db", sqlx(json))]
    pub request_data: Value,
    pub status: ApprovalStatus,
    pub requested_by: i64,
    pub reviewed_by: Option<i64>,
    pub review_notes: Option<String>,
    pub reviewed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ApprovalRequest {
    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }
}

/// File a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalCreate {
    pub entity_type: String,
    /// Omitted or 0 for create requests
    pub entity_id: Option<i64>,
    pub action: ApprovalAction,
    pub request_data: Value,
}

/// Approve payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprovalApprove {
    pub notes: Option<String>,
}

/// Reject payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalReject {
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprovalQuery {
    pub status: Option<ApprovalStatus>,
    pub entity_type: Option<String>,
    pub requested_by: Option<i64>,
}

/// Result of a sensitive mutation: executed now or parked for review
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MutationOutcome<T> {
    Completed { result: T },
    PendingApproval { approval_id: i64 },
}
