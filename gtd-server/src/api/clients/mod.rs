//! Clients API
//!
//! | Path | Method | Section |
//! |------|--------|---------|
//! | /api/clients | GET, POST | clients |
//! | /api/clients/{id} | GET, PUT, DELETE | clients |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/clients", routes())
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
}
