//! Approvals API
//!
//! | Path | Method | Access |
//! |------|--------|--------|
//! | /api/approvals | GET | section approvals |
//! | /api/approvals | POST | any authenticated user |
//! | /api/approvals/{id} | GET | section approvals |
//! | /api/approvals/{id}/approve | POST | reviewers |
//! | /api/approvals/{id}/reject | POST | reviewers |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/approvals", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/approve", post(handler::approve))
        .route("/{id}/reject", post(handler::reject))
}
