//! Projects API
//!
//! | Path | Method | Section |
//! |------|--------|---------|
//! | /api/projects | GET, POST | projects |
//! | /api/projects/{id} | GET, PUT, DELETE | projects |
//! | /api/projects/{id}/members | GET, POST | projects |
//! | /api/projects/{id}/members/{user_id} | DELETE | projects |
//!
//! Holders of `projects.onlyAssigned` only see projects they manage or
//! belong to. `budget` is blanked without `projects.viewFinancials`.
//! Writes also need `create`, `edit` or `delete`; member changes count as
//! edits and are limited to visible projects.

mod handler;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/projects", routes())
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
        .route(
            "/{id}/members",
            get(handler::members).post(handler::add_member),
        )
        .route("/{id}/members/{user_id}", delete(handler::remove_member))
}
