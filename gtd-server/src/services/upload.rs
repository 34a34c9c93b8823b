//! Upload Validation and Storage
//!
//! Accepts a base64 payload with a declared MIME type. The declared type must
//! be supported and must agree with the file header; accepted files are
//! stored under the upload directory named by their SHA-256.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use shared::models::{UploadRecord, UploadRequest, UploadResponse};
use sqlx::SqlitePool;

use crate::db::repository::upload::{self, NewUpload};
use crate::utils::{AppError, AppResult, ErrorCode};

/// URL prefix stored files are served under
pub const URL_PREFIX: &str = "/api/uploads";

const OOXML_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

/// Supported file families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Png,
    Jpeg,
    Webp,
    Pdf,
    Html,
    Text,
    /// docx / xlsx / pptx (zip container)
    OfficeZip,
}

impl FileKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.split(';').next().unwrap_or(mime).trim().to_ascii_lowercase();
        let kind = match mime.as_str() {
            "image/png" => FileKind::Png,
            "image/jpeg" | "image/jpg" => FileKind::Jpeg,
            "image/webp" => FileKind::Webp,
            "application/pdf" => FileKind::Pdf,
            "text/html" => FileKind::Html,
            "text/plain" | "text/csv" => FileKind::Text,
            other if OOXML_TYPES.contains(&other) => FileKind::OfficeZip,
            _ => return None,
        };
        Some(kind)
    }

    /// Does the file header agree with this kind
    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            FileKind::Png => data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            FileKind::Jpeg => data.starts_with(&[0xFF, 0xD8, 0xFF]),
            FileKind::Webp => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",
            FileKind::Pdf => data.starts_with(b"%PDF"),
            FileKind::OfficeZip => data.starts_with(b"PK\x03\x04"),
            FileKind::Html => looks_like_html(data),
            FileKind::Text => looks_like_text(data),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Png => "png",
            FileKind::Jpeg => "jpg",
            FileKind::Webp => "webp",
            FileKind::Pdf => "pdf",
            FileKind::Html => "html",
            FileKind::Text => "txt",
            FileKind::OfficeZip => "zip",
        }
    }
}

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data)
}

fn looks_like_html(data: &[u8]) -> bool {
    let head = strip_bom(data);
    let head = &head[..head.len().min(512)];
    let Ok(text) = std::str::from_utf8(head).or_else(|e| std::str::from_utf8(&head[..e.valid_up_to()])) else {
        return false;
    };
    let text = text.trim_start().to_ascii_lowercase();
    text.starts_with("<!doctype html") || text.starts_with("<html")
}

fn looks_like_text(data: &[u8]) -> bool {
    let binary = [
        FileKind::Png,
        FileKind::Jpeg,
        FileKind::Webp,
        FileKind::Pdf,
        FileKind::OfficeZip,
    ];
    if binary.iter().any(|kind| kind.matches(data)) {
        return false;
    }
    match std::str::from_utf8(strip_bom(data)) {
        Ok(text) => !text.contains('\0'),
        Err(_) => false,
    }
}

/// Decode base64, tolerating a `data:<mime>;base64,` prefix and line breaks
pub fn decode_payload(raw: &str) -> AppResult<Vec<u8>> {
    let body = match raw.split_once(";base64,") {
        Some((prefix, body)) if prefix.starts_with("data:") => body,
        _ => raw,
    };
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| AppError::with_message(ErrorCode::InvalidBase64, format!("Invalid base64: {e}")))
}

/// Validate a decoded upload; returns its kind
pub fn validate(file_name: &str, mime_type: &str, data: &[u8], max_bytes: usize) -> AppResult<FileKind> {
    if file_name.trim().is_empty() {
        return Err(AppError::new(ErrorCode::NoFilename));
    }
    if data.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }
    if data.len() > max_bytes {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!("File too large. Maximum size is {}MB", max_bytes / 1024 / 1024),
        )
        .with_detail("size", data.len())
        .with_detail("max", max_bytes));
    }
    let kind = FileKind::from_mime(mime_type).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!("Unsupported file type '{mime_type}'"),
        )
    })?;
    if !kind.matches(data) {
        return Err(AppError::new(ErrorCode::FileContentMismatch).with_detail("declared", mime_type));
    }
    Ok(kind)
}

pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Stored names are flat: no separators, no parent references
pub fn safe_stored_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
}

/// Validate, write to `dir` and record the upload
pub async fn store(
    pool: &SqlitePool,
    dir: &Path,
    max_bytes: usize,
    uploaded_by: i64,
    request: &UploadRequest,
) -> AppResult<UploadRecord> {
    let data = decode_payload(&request.data)?;
    let kind = validate(&request.file_name, &request.mime_type, &data, max_bytes)?;

    let sha256 = content_hash(&data);
    let stored_name = format!("{sha256}.{}", kind.extension());
    let path = dir.join(&stored_name);

    // identical content is already on disk
    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        tracing::info!(stored_name = %stored_name, "Duplicate upload, reusing stored file");
    } else {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::with_message(ErrorCode::FileStorageFailed, e.to_string()))?;
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| AppError::with_message(ErrorCode::FileStorageFailed, e.to_string()))?;
    }

    let record = upload::create(
        pool,
        NewUpload {
            file_name: request.file_name.trim(),
            stored_name: &stored_name,
            mime_type: &request.mime_type,
            size: data.len() as i64,
            sha256: &sha256,
            entity_type: request.entity_type.as_deref(),
            entity_id: request.entity_id,
            uploaded_by,
        },
    )
    .await?;

    tracing::info!(
        upload_id = record.id,
        file_name = %record.file_name,
        size = record.size,
        hash = %sha256,
        "File uploaded"
    );
    Ok(record)
}

pub fn response(record: &UploadRecord) -> UploadResponse {
    UploadResponse {
        id: record.id,
        url: format!("{URL_PREFIX}/{}", record.stored_name),
        file_name: record.file_name.clone(),
        mime_type: record.mime_type.clone(),
        size: record.size,
        sha256: record.sha256.clone(),
    }
}

/// Read a stored file; the MIME type comes from its record, else the extension
pub async fn load(pool: &SqlitePool, dir: &Path, stored_name: &str) -> AppResult<(String, Vec<u8>)> {
    if !safe_stored_name(stored_name) {
        return Err(AppError::validation("Invalid file name"));
    }
    let path: PathBuf = dir.join(stored_name);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::not_found(format!("File {stored_name}")))?;

    let mime = match upload::find_by_stored_name(pool, stored_name).await? {
        Some(record) => record.mime_type,
        None => mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    };
    Ok((mime, bytes))
}
