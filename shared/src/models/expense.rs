//! Expense Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

status_enum! {
    ExpenseStatus {
        Pending => "pending",
        Approved => "approved",
        Paid => "paid",
        Cancelled => "cancelled",
    }
}

/// Expense entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: i64,
    pub project_id: Option<i64>,
    pub category: String,
    pub description: Option<String>,
    pub amount: i64,
    pub expense_date: NaiveDate,
    pub status: ExpenseStatus,
    pub vendor: Option<String>,
    pub receipt_url: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create expense payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExpenseCreate {
    pub project_id: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub amount: i64,
    pub expense_date: NaiveDate,
    pub status: Option<ExpenseStatus>,
    pub vendor: Option<String>,
    pub receipt_url: Option<String>,
}

/// Update expense payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ExpenseUpdate {
    pub project_id: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub amount: Option<i64>,
    pub expense_date: Option<NaiveDate>,
    pub status: Option<ExpenseStatus>,
    pub vendor: Option<String>,
    pub receipt_url: Option<String>,
}

/// Expense listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseQuery {
    pub project_id: Option<i64>,
    pub status: Option<ExpenseStatus>,
    pub category: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
