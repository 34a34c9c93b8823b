//! Upload Models

use serde::{Deserialize, Serialize};

/// Base64 upload request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file_name: String,
    /// Declared MIME type, verified against the file header
    pub mime_type: String,
    /// Base64 payload (a `data:...;base64,` prefix is tolerated)
    pub data: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
}

/// Stored upload record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UploadRecord {
    pub id: i64,
    pub file_name: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size: i64,
    pub sha256: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub uploaded_by: Option<i64>,
    pub created_at: i64,
}

/// Upload response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub id: i64,
    pub url: String,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
    pub sha256: String,
}
