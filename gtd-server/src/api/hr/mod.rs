//! HR API
//!
//! | Path | Method | Section |
//! |------|--------|---------|
//! | /api/hr/attendance | GET, POST | hr |
//! | /api/hr/attendance/{id} | DELETE | hr |
//! | /api/hr/leaves | GET | hr |
//! | /api/hr/leaves | POST | authenticated |
//! | /api/hr/leaves/mine | GET | authenticated |
//! | /api/hr/leaves/{id}/approve | POST | hr |
//! | /api/hr/leaves/{id}/reject | POST | hr |
//! | /api/hr/payroll | GET, POST | hr |
//! | /api/hr/payroll/{id} | DELETE | hr |
//! | /api/hr/payroll/{id}/pay | POST | hr |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/hr", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/attendance",
            get(handler::list_attendance).post(handler::record_attendance),
        )
        .route("/attendance/{id}", delete(handler::delete_attendance))
        .route("/leaves", get(handler::list_leaves).post(handler::request_leave))
        .route("/leaves/mine", get(handler::my_leaves))
        .route("/leaves/{id}/approve", post(handler::approve_leave))
        .route("/leaves/{id}/reject", post(handler::reject_leave))
        .route("/payroll", get(handler::list_payroll).post(handler::create_payroll))
        .route("/payroll/{id}", delete(handler::delete_payroll))
        .route("/payroll/{id}/pay", post(handler::mark_payroll_paid))
}
