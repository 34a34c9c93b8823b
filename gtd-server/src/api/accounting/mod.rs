//! Accounting API
//!
//! Expenses, installments, purchases, sales and bill of quantities, all
//! under section `accounting`. Create, update and delete of expenses,
//! installments, purchases and sales execute immediately for holders of
//! `accounting.autoApprove` and are filed as approval requests otherwise.
//!
//! | Path | Method |
//! |------|--------|
//! | /api/accounting/expenses | GET, POST |
//! | /api/accounting/expenses/{id} | PUT, DELETE |
//! | /api/accounting/installments | GET, POST |
//! | /api/accounting/installments/{id} | PUT, DELETE |
//! | /api/accounting/installments/{id}/pay | POST |
//! | /api/accounting/purchases | GET, POST |
//! | /api/accounting/purchases/{id} | PUT, DELETE |
//! | /api/accounting/sales | GET, POST |
//! | /api/accounting/sales/{id} | PUT, DELETE |
//! | /api/accounting/boq | GET, POST |
//! | /api/accounting/boq/{id} | PUT, DELETE |
//! | /api/accounting/boq/total/{project_id} | GET |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/accounting", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/expenses",
            get(handler::list_expenses).post(handler::create_expense),
        )
        .route(
            "/expenses/{id}",
            put(handler::update_expense).delete(handler::delete_expense),
        )
        .route(
            "/installments",
            get(handler::list_installments).post(handler::create_installment),
        )
        .route(
            "/installments/{id}",
            put(handler::update_installment).delete(handler::delete_installment),
        )
        .route("/installments/{id}/pay", post(handler::mark_installment_paid))
        .route(
            "/purchases",
            get(handler::list_purchases).post(handler::create_purchase),
        )
        .route(
            "/purchases/{id}",
            put(handler::update_purchase).delete(handler::delete_purchase),
        )
        .route("/sales", get(handler::list_sales).post(handler::create_sale))
        .route(
            "/sales/{id}",
            put(handler::update_sale).delete(handler::delete_sale),
        )
        .route("/boq", get(handler::list_boq).post(handler::create_boq_item))
        .route(
            "/boq/{id}",
            put(handler::update_boq_item).delete(handler::delete_boq_item),
        )
        .route("/boq/total/{project_id}", get(handler::boq_total))
}
