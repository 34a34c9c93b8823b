//! Report Models
//!
//! Report payloads feed chart components directly, so they use camelCase keys
//! (`dateKey`, `invoicesTotal`, ...).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Time bucket size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Month,
}

/// Query shared by summary, timeseries, breakdown and CSV export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[serde(default)]
    pub granularity: Granularity,
    pub client_id: Option<i64>,
    pub project_id: Option<i64>,
    /// Applies to invoices and expenses; without it cancelled rows are excluded
    pub status: Option<String>,
    /// Comma separated status restrictions for the breakdown variant
    pub invoice_statuses: Option<String>,
    pub expense_statuses: Option<String>,
    pub installment_statuses: Option<String>,
    pub purchase_statuses: Option<String>,
    pub sale_statuses: Option<String>,
}

/// Totals over a date range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub invoices_total: i64,
    pub paid_invoices_total: i64,
    pub purchases_total: i64,
    pub expenses_total: i64,
    pub installments_total: i64,
    pub manual_sales_total: i64,
    /// paidInvoices + paidInstallments + manualSales - purchases - expenses
    pub net: i64,
}

/// One day or month of the time series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBucket {
    /// `YYYY-MM-DD` or `YYYY-MM`
    pub date_key: String,
    pub invoices: i64,
    pub expenses: i64,
    pub installments: i64,
    pub purchases: i64,
    pub sales: i64,
    pub net: i64,
}

impl ReportBucket {
    pub fn empty(date_key: impl Into<String>) -> Self {
        Self {
            date_key: date_key.into(),
            invoices: 0,
            expenses: 0,
            installments: 0,
            purchases: 0,
            sales: 0,
            net: 0,
        }
    }
}

/// Status-keyed amounts for one bucket (`"inv:paid" -> 500`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownBucket {
    pub date_key: String,
    pub values: BTreeMap<String, i64>,
}
