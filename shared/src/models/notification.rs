//! Notification Model
//!
//! One row per recipient. Role broadcasts fan out into individual copies.

use serde::{Deserialize, Serialize};

/// Well-known notification types
pub mod kinds {
    pub const LEAVE_REQUESTED: &str = "leave_requested";
    pub const LEAVE_DECIDED: &str = "leave_decided";
    pub const ROLE_ASSIGNED: &str = "role_assigned";
    pub const PAYROLL_CREATED: &str = "payroll_created";
    pub const APPROVAL_REQUESTED: &str = "approval_requested";
    pub const APPROVAL_DECIDED: &str = "approval_decided";
    pub const TASK_ASSIGNED: &str = "task_assigned";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    /// Recipient
    pub user_id: i64,
    /// Sender; None = system
    pub from_user_id: Option<i64>,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "db", sqlx(rename = "type"))]
    pub kind: String,
    pub title: String,
    pub message: Option<String>,
    pub link: Option<String>,
    pub is_read: bool,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub created_at: i64,
}

/// Notification content, addressed separately
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub from_user_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: Option<String>,
    pub link: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
}

impl NotificationDraft {
    pub fn new(kind: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn from_user(mut self, user_id: i64) -> Self {
        self.from_user_id = Some(user_id);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn entity(mut self, entity_type: impl Into<String>, entity_id: i64) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationQuery {
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: i64,
}
