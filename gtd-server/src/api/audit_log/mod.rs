//! Audit Log API
//!
//! | Path | Method | Section |
//! |------|--------|---------|
//! | /api/audit | GET | audit |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/audit", routes())
}

fn routes() -> Router<ServerState> {
    Router::new().route("/", get(handler::list))
}
