//! Repository Module
//!
//! Free async functions over `&SqlitePool`, one module per table family.
//! Functions the approval workflow runs inside its transaction take a
//! `&mut SqliteConnection` instead, so a pooled connection and an open
//! transaction both work.

// Users and access
pub mod permission;
pub mod user;

// Projects
pub mod client;
pub mod project;
pub mod task;

// Finance
pub mod boq;
pub mod expense;
pub mod installment;
pub mod invoice;
pub mod purchase;
pub mod report;
pub mod sale;

// HR
pub mod attendance;
pub mod leave;
pub mod payroll;

// Workflow and system
pub mod approval;
pub mod audit_log;
pub mod notification;
pub mod upload;

use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Foreign key violation: referenced row missing, or row still referenced
    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                RepoError::Constraint(db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Constraint(msg) => AppError::with_message(ErrorCode::ResourceInUse, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                AppError::database("Database error")
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Escape `%`/`_` for a `LIKE ... ESCAPE '\'` search term
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::db::DbService;
    use shared::util::now_millis;
    use sqlx::SqlitePool;

    /// Fresh migrated in-memory database
    pub async fn pool() -> SqlitePool {
        DbService::in_memory().await.unwrap().pool
    }

    /// Insert a bare user row, returning its id
    pub async fn insert_user(pool: &SqlitePool, email: &str, role: &str) -> i64 {
        let now = now_millis();
        sqlx::query(
            "INSERT INTO users (name, email, password_hash, role, created_at, updated_at) VALUES (?, ?, 'x', ?, ?, ?)",
        )
        .bind(email.split('@').next().unwrap_or(email))
        .bind(email)
        .bind(role)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
    }

    /// Insert a bare project row, returning its id
    pub async fn insert_project(pool: &SqlitePool, name: &str) -> i64 {
        let now = now_millis();
        sqlx::query("INSERT INTO projects (name, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(now)
            .bind(now)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("villa"), "%villa%");
    }

    #[test]
    fn test_repo_error_mapping() {
        let err: AppError = RepoError::Duplicate("email".into()).into();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
        let err: AppError = RepoError::Constraint("fk".into()).into();
        assert_eq!(err.http_status(), http::StatusCode::CONFLICT);
        let err: AppError = RepoError::Database("disk".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
