//! Sale Model
//!
//! A sale without `invoice_id` is a manual sale. Sales linked to an invoice
//! are already counted through the invoice and never enter revenue twice.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

status_enum! {
    SaleStatus {
        Pending => "pending",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub client_id: Option<i64>,
    pub project_id: Option<i64>,
    pub invoice_id: Option<i64>,
    pub description: String,
    pub amount: i64,
    pub sale_date: NaiveDate,
    pub status: SaleStatus,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Sale {
    pub fn is_manual(&self) -> bool {
        self.invoice_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaleCreate {
    pub client_id: Option<i64>,
    pub project_id: Option<i64>,
    pub invoice_id: Option<i64>,
    #[validate(length(min = 1, max = 300))]
    pub description: String,
    #[validate(range(min = 0))]
    pub amount: i64,
    pub sale_date: NaiveDate,
    pub status: Option<SaleStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SaleUpdate {
    pub client_id: Option<i64>,
    pub project_id: Option<i64>,
    pub invoice_id: Option<i64>,
    #[validate(length(min = 1, max = 300))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub amount: Option<i64>,
    pub sale_date: Option<NaiveDate>,
    pub status: Option<SaleStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleQuery {
    pub client_id: Option<i64>,
    pub project_id: Option<i64>,
    pub status: Option<SaleStatus>,
    /// true = only manual sales, false = only invoice-linked
    pub manual: Option<bool>,
}
