//! Project Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

status_enum! {
    /// Project lifecycle status
    ProjectStatus {
        Planning => "planning",
        InProgress => "in_progress",
        OnHold => "on_hold",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

/// Project entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Project {
    pub id: i64,
    pub client_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    /// Hidden from users without `projects.viewFinancials`
    pub budget: Option<i64>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub manager_id: Option<i64>,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create project payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProjectCreate {
    pub client_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    #[validate(range(min = 0))]
    pub budget: Option<i64>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub manager_id: Option<i64>,
}

/// Update project payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProjectUpdate {
    pub client_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    #[validate(range(min = 0))]
    pub budget: Option<i64>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub manager_id: Option<i64>,
}

/// Project listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectQuery {
    pub client_id: Option<i64>,
    pub status: Option<ProjectStatus>,
    pub search: Option<String>,
}

/// Project membership (drives "only assigned" visibility)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProjectMember {
    pub project_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub role_in_project: Option<String>,
    pub added_at: i64,
}

/// Add member payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMemberAdd {
    pub user_id: i64,
    pub role_in_project: Option<String>,
}
