//! Bill of Quantities Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One BOQ line: an itemized cost estimate entry for a project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BoqItem {
    pub id: i64,
    pub project_id: i64,
    /// Grouping heading (e.g. "Flooring", "Joinery")
    pub section: Option<String>,
    pub description: String,
    pub unit: Option<String>,
    pub quantity: i64,
    pub unit_price: i64,
    pub total: i64,
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BoqItemCreate {
    pub project_id: i64,
    pub section: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    pub unit: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: i64,
    #[validate(range(min = 0))]
    pub unit_price: i64,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BoqItemUpdate {
    pub section: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
    pub unit: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: Option<i64>,
    #[validate(range(min = 0))]
    pub unit_price: Option<i64>,
    pub sort_order: Option<i64>,
}

/// BOQ total for a project, per section and overall
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoqTotal {
    pub project_id: i64,
    pub sections: Vec<BoqSectionTotal>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BoqSectionTotal {
    pub section: Option<String>,
    pub total: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoqQuery {
    pub project_id: Option<i64>,
}
