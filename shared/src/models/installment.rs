//! Installment Model
//!
//! A scheduled partial payment tied to a project.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

status_enum! {
    InstallmentStatus {
        Pending => "pending",
        Paid => "paid",
        Overdue => "overdue",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Installment {
    pub id: i64,
    pub project_id: i64,
    pub invoice_id: Option<i64>,
    pub description: Option<String>,
    pub amount: i64,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub status: InstallmentStatus,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InstallmentCreate {
    pub project_id: i64,
    pub invoice_id: Option<i64>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub amount: i64,
    pub due_date: NaiveDate,
    pub status: Option<InstallmentStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct InstallmentUpdate {
    pub invoice_id: Option<i64>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub amount: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<InstallmentStatus>,
}

/// Mark-paid payload; defaults to today
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallmentPayment {
    pub paid_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallmentQuery {
    pub project_id: Option<i64>,
    pub status: Option<InstallmentStatus>,
}
