//! Per-user Permission Override Repository

use super::{RepoError, RepoResult};
use shared::models::PermissionOverrides;
use shared::util::now_millis;
use sqlx::SqlitePool;

/// Load a user's override map (empty when none stored)
pub async fn find_overrides(pool: &SqlitePool, user_id: i64) -> RepoResult<PermissionOverrides> {
    let raw: Option<String> =
        sqlx::query_scalar("SELECT permissions FROM user_permissions WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    match raw {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| RepoError::Database(format!("Corrupt permission overrides: {e}"))),
        None => Ok(PermissionOverrides::new()),
    }
}

/// Replace a user's override map
pub async fn save_overrides(
    pool: &SqlitePool,
    user_id: i64,
    overrides: &PermissionOverrides,
    updated_by: i64,
) -> RepoResult<()> {
    let json = serde_json::to_string(overrides)
        .map_err(|e| RepoError::Validation(format!("Invalid overrides: {e}")))?;

    sqlx::query(
        "INSERT INTO user_permissions (user_id, permissions, updated_by, updated_at) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(user_id) DO UPDATE SET permissions = ?2, updated_by = ?3, updated_at = ?4",
    )
    .bind(user_id)
    .bind(json)
    .bind(updated_by)
    .bind(now_millis())
    .execute(pool)
    .await?;
    Ok(())
}
