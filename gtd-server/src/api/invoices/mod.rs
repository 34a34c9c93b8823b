//! Invoices API
//!
//! Quotations and invoices share one table, told apart by `invoice_type`.
//!
//! | Path | Method | Section |
//! |------|--------|---------|
//! | /api/invoices | GET, POST | invoices |
//! | /api/invoices/{id} | GET, PUT | invoices |
//! | /api/invoices/{id} | DELETE | invoices (approval) |
//! | /api/invoices/{id}/status | PUT | invoices |
//! | /api/invoices/{id}/convert | POST | invoices |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/invoices", routes())
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
        .route("/{id}/convert", post(handler::convert_to_invoice))
}
