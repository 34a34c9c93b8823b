//! Tasks API
//!
//! | Path | Method | Section |
//! |------|--------|---------|
//! | /api/tasks | GET, POST | tasks |
//! | /api/tasks/{id} | GET, PUT, DELETE | tasks |
//! | /api/tasks/{id}/status | PUT | tasks |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tasks", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/status", put(handler::update_status))
}
