//! Users API
//!
//! Account management (section `users`), per-user permission overrides
//! (admin only) and the caller's own resolved permissions.

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/me/permissions", get(handler::my_permissions))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/role", put(handler::update_role))
        .route("/{id}/active", put(handler::set_active))
        .route(
            "/{id}/permissions",
            get(handler::get_permissions).put(handler::set_permissions),
        )
}
