//! User Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// User entity (password hash never leaves the server)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Role tag (admin, accountant, project_manager, designer, ...)
    pub role: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub role: String,
    pub phone: Option<String>,
    pub position: Option<String>,
}

/// Update user payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
}

/// Role assignment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRoleUpdate {
    pub role: String,
}

/// Activate / deactivate payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserActiveUpdate {
    pub is_active: bool,
}

/// User listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserQuery {
    pub role: Option<String>,
    pub search: Option<String>,
    pub include_inactive: Option<bool>,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Login response (the session token travels in the cookie)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub expires_in: i64,
}
