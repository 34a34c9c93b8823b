//! API routes
//!
//! - [`health`] - liveness and version
//! - [`auth`] - login, logout, current user
//! - [`users`] - accounts and permission overrides
//! - [`clients`] - client records
//! - [`projects`] - projects and members
//! - [`tasks`] - project tasks
//! - [`invoices`] - quotations and invoices
//! - [`accounting`] - expenses, installments, purchases, sales, BOQ
//! - [`hr`] - attendance, leave, payroll
//! - [`approvals`] - deferred sensitive mutations
//! - [`notifications`] - per-user inbox
//! - [`audit_log`] - audit trail
//! - [`reports`] - summaries, series and CSV export
//! - [`uploads`] - file upload and download

use axum::Router;

use crate::core::ServerState;

pub mod auth;
pub mod health;
pub mod uploads;

// Directory
pub mod clients;
pub mod projects;
pub mod tasks;
pub mod users;

// Finance
pub mod accounting;
pub mod invoices;
pub mod reports;

// HR
pub mod hr;

// Workflow
pub mod approvals;
pub mod audit_log;
pub mod notifications;

/// Every route, without middleware or state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // public
        .merge(health::router())
        .merge(auth::router())
        // authenticated; sections checked per handler
        .merge(users::router())
        .merge(clients::router())
        .merge(projects::router())
        .merge(tasks::router())
        .merge(invoices::router())
        .merge(accounting::router())
        .merge(hr::router())
        .merge(approvals::router())
        .merge(notifications::router())
        .merge(audit_log::router())
        .merge(reports::router())
        .merge(uploads::router())
}
