//! Purchase Model (materials bought from suppliers)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

status_enum! {
    PurchaseStatus {
        Pending => "pending",
        Received => "received",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: i64,
    pub project_id: Option<i64>,
    pub supplier: String,
    pub description: Option<String>,
    pub amount: i64,
    pub purchase_date: NaiveDate,
    pub status: PurchaseStatus,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PurchaseCreate {
    pub project_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub supplier: String,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub amount: i64,
    pub purchase_date: NaiveDate,
    pub status: Option<PurchaseStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PurchaseUpdate {
    pub project_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub supplier: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub amount: Option<i64>,
    pub purchase_date: Option<NaiveDate>,
    pub status: Option<PurchaseStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseQuery {
    pub project_id: Option<i64>,
    pub status: Option<PurchaseStatus>,
}
