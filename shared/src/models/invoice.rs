//! Invoice / Quotation Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

status_enum! {
    /// Document kind: a quotation can later be converted into an invoice
    InvoiceType {
        Quotation => "quotation",
        Invoice => "invoice",
    }
}

status_enum! {
    InvoiceStatus {
        Draft => "draft",
        Sent => "sent",
        Paid => "paid",
        Overdue => "overdue",
        Cancelled => "cancelled",
    }
}

/// Invoice header
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    pub client_id: Option<i64>,
    pub project_id: Option<i64>,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub subtotal: i64,
    pub discount: i64,
    pub tax: i64,
    pub total: i64,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Invoice line item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    pub description: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub total: i64,
    pub sort_order: i64,
}

/// Line item input
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InvoiceItemInput {
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(range(min = 0))]
    pub unit_price: i64,
}

impl InvoiceItemInput {
    pub fn line_total(&self) -> i64 {
        self.quantity.saturating_mul(self.unit_price)
    }
}

/// Create invoice payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InvoiceCreate {
    /// Generated when omitted
    pub invoice_number: Option<String>,
    pub invoice_type: Option<InvoiceType>,
    pub client_id: Option<i64>,
    pub project_id: Option<i64>,
    pub status: Option<InvoiceStatus>,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    #[validate(range(min = 0))]
    pub discount: Option<i64>,
    #[validate(range(min = 0))]
    pub tax: Option<i64>,
    pub notes: Option<String>,
    #[validate(nested)]
    pub items: Vec<InvoiceItemInput>,
}

/// Update invoice payload (items, when present, replace all lines)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct InvoiceUpdate {
    pub client_id: Option<i64>,
    pub project_id: Option<i64>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    #[validate(range(min = 0))]
    pub discount: Option<i64>,
    #[validate(range(min = 0))]
    pub tax: Option<i64>,
    pub notes: Option<String>,
    #[validate(nested)]
    pub items: Option<Vec<InvoiceItemInput>>,
}

/// Status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceStatusUpdate {
    pub status: InvoiceStatus,
}

/// Invoice with its line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

/// Invoice listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceQuery {
    pub client_id: Option<i64>,
    pub project_id: Option<i64>,
    pub status: Option<InvoiceStatus>,
    pub invoice_type: Option<InvoiceType>,
}

/// Computed monetary totals for a set of line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: i64,
    pub discount: i64,
    pub tax: i64,
    pub total: i64,
}

impl InvoiceTotals {
    /// `sum(quantity * unit_price) - discount + tax`, floored at zero
    pub fn compute(items: &[InvoiceItemInput], discount: i64, tax: i64) -> Self {
        let subtotal = items
            .iter()
            .fold(0i64, |acc, item| acc.saturating_add(item.line_total()));
        let total = subtotal.saturating_sub(discount).saturating_add(tax).max(0);
        Self {
            subtotal,
            discount,
            tax,
            total,
        }
    }
}
