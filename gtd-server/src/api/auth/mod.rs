//! Authentication API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/auth/login | POST | none |
//! | /api/auth/logout | POST | optional |
//! | /api/auth/me | GET | optional |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/login", post(handler::login))
        .route("/logout", post(handler::logout))
        .route("/me", get(handler::me))
}
