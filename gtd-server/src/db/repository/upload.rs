//! Upload Record Repository

use super::{RepoError, RepoResult};
use shared::models::UploadRecord;
use shared::util::now_millis;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, file_name, stored_name, mime_type, size, sha256, entity_type, entity_id, uploaded_by, created_at";

pub struct NewUpload<'a> {
    pub file_name: &'a str,
    pub stored_name: &'a str,
    pub mime_type: &'a str,
    pub size: i64,
    pub sha256: &'a str,
    pub entity_type: Option<&'a str>,
    pub entity_id: Option<i64>,
    pub uploaded_by: i64,
}

pub async fn create(pool: &SqlitePool, data: NewUpload<'_>) -> RepoResult<UploadRecord> {
    let id = sqlx::query(
        "INSERT INTO uploads (file_name, stored_name, mime_type, size, sha256, entity_type, entity_id, uploaded_by, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(data.file_name)
    .bind(data.stored_name)
    .bind(data.mime_type)
    .bind(data.size)
    .bind(data.sha256)
    .bind(data.entity_type)
    .bind(data.entity_id)
    .bind(data.uploaded_by)
    .bind(now_millis())
    .execute(pool)
    .await?
    .last_insert_rowid();

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to record upload".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<UploadRecord>> {
    let row =
        sqlx::query_as::<_, UploadRecord>(&format!("SELECT {COLUMNS} FROM uploads WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row)
}

/// Latest record for a stored file name (content-addressed names may repeat)
pub async fn find_by_stored_name(
    pool: &SqlitePool,
    stored_name: &str,
) -> RepoResult<Option<UploadRecord>> {
    let row = sqlx::query_as::<_, UploadRecord>(&format!(
        "SELECT {COLUMNS} FROM uploads WHERE stored_name = ? ORDER BY id DESC LIMIT 1"
    ))
    .bind(stored_name)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
