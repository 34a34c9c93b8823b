//! Uploads API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/uploads | POST | authenticated |
//! | /api/uploads/{name} | GET | authenticated |
//!
//! Payloads are base64 JSON; content is sniffed against the declared MIME
//! type and stored under `UPLOAD_DIR` by SHA-256.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/uploads", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::upload))
        .route("/{name}", get(handler::download))
}
