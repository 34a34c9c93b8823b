//! Reports API
//!
//! | Path | Method | Section |
//! |------|--------|---------|
//! | /api/reports/summary | GET | reports |
//! | /api/reports/timeseries | GET | reports |
//! | /api/reports/timeseries-breakdown | GET | reports |
//! | /api/reports/export.csv | GET | reports |
//! | /api/reports/export-breakdown.csv | GET | reports |
//!
//! All endpoints take `from`, `to` (`YYYY-MM-DD`, inclusive), `granularity`
//! (`day` | `month`) and the optional `clientId`, `projectId`, `status`
//! filters.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reports", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/summary", get(handler::summary))
        .route("/timeseries", get(handler::timeseries))
        .route("/timeseries-breakdown", get(handler::timeseries_breakdown))
        .route("/export.csv", get(handler::export_csv))
        .route("/export-breakdown.csv", get(handler::export_breakdown_csv))
}
