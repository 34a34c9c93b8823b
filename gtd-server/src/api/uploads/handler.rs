//! Upload Handlers

use axum::{
    Json,
    extract::Path,
    response::{IntoResponse, Response},
};
use http::header;
use serde_json::json;
use shared::models::{UploadRequest, UploadResponse};

use crate::audit::{AuditAction, AuditEvent};
use crate::permissions::RequestContext;
use crate::services::upload;
use crate::utils::AppResult;

/// POST /api/uploads
pub async fn upload(ctx: RequestContext, Json(payload): Json<UploadRequest>) -> AppResult<Json<UploadResponse>> {
    let config = &ctx.state.config;
    let record = upload::store(
        ctx.pool()?,
        &config.upload_dir,
        config.max_upload_bytes,
        ctx.user.id,
        &payload,
    )
    .await?;

    ctx.audit(
        AuditEvent::new(AuditAction::FileUploaded)
            .entity("upload", record.id)
            .details(json!({
                "file_name": record.file_name,
                "mime_type": record.mime_type,
                "size": record.size,
                "sha256": record.sha256,
            })),
    )
    .await;
    Ok(Json(upload::response(&record)))
}

/// GET /api/uploads/{name}
pub async fn download(ctx: RequestContext, Path(name): Path<String>) -> AppResult<Response> {
    let (mime, bytes) = upload::load(ctx.pool()?, &ctx.state.config.upload_dir, &name).await?;
    Ok((
        [
            (header::CONTENT_TYPE, mime),
            (header::CACHE_CONTROL, "private, max-age=31536000, immutable".to_string()),
        ],
        bytes,
    )
        .into_response())
}
