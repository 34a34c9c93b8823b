//! Reports Aggregator
//!
//! Sums invoices, expenses, installments, purchases and sales over a date
//! range into totals, a day/month time series, and a per-status breakdown.
//!
//! All three views share the same row selection ([`Selection`]) so that
//! `Σ timeseries[].net == summary.net` holds for any range. Amounts are
//! integers throughout.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use shared::models::{
    BreakdownBucket, ExpenseStatus, Granularity, InstallmentStatus, InvoiceStatus, PurchaseStatus,
    ReportBucket, ReportQuery, ReportSummary, SaleStatus,
};
use sqlx::SqlitePool;

use crate::db::repository::report::{self, ReportData, ReportRow, ReportScope};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Upper bound on generated buckets (roughly ten years of days)
pub const MAX_BUCKETS: usize = 3660;

fn range_error(message: impl Into<String>) -> AppError {
    AppError::with_message(ErrorCode::ReportRangeInvalid, message)
}

// ============================================================================
// Buckets
// ============================================================================

/// Bucket key for `date`: `YYYY-MM-DD` or `YYYY-MM`
pub fn bucket_key(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => date.format("%Y-%m-%d").to_string(),
        Granularity::Month => date.format("%Y-%m").to_string(),
    }
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Every bucket key in `[from, to]`, inclusive and in order
pub fn bucket_keys(from: NaiveDate, to: NaiveDate, granularity: Granularity) -> AppResult<Vec<String>> {
    if to < from {
        return Err(range_error(format!("'to' ({to}) is before 'from' ({from})")));
    }

    let mut keys = Vec::new();
    let mut cursor = match granularity {
        Granularity::Day => from,
        Granularity::Month => from.with_day(1).unwrap_or(from),
    };
    while cursor <= to {
        if keys.len() == MAX_BUCKETS {
            return Err(range_error(format!("Range exceeds {MAX_BUCKETS} buckets")));
        }
        keys.push(bucket_key(cursor, granularity));
        let next = match granularity {
            Granularity::Day => cursor.succ_opt(),
            Granularity::Month => first_of_next_month(cursor),
        };
        match next {
            Some(next) => cursor = next,
            None => break,
        }
    }
    Ok(keys)
}

// ============================================================================
// Row selection
// ============================================================================

/// Status rules shared by summary and timeseries
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Explicit invoice/expense statuses; `None` means "everything but cancelled"
    pub statuses: Option<Vec<String>>,
}

impl Selection {
    pub fn from_query(query: &ReportQuery) -> Self {
        Self {
            statuses: query.status.as_deref().map(split_list).filter(|s| !s.is_empty()),
        }
    }

    fn admits(&self, status: &str) -> bool {
        match &self.statuses {
            Some(allowed) => allowed.iter().any(|s| s == status),
            None => status != "cancelled",
        }
    }

    fn invoice(&self, row: &ReportRow) -> bool {
        self.admits(&row.status)
    }

    fn paid_invoice(&self, row: &ReportRow) -> bool {
        self.invoice(row) && row.status == InvoiceStatus::Paid.as_str()
    }

    fn expense(&self, row: &ReportRow) -> bool {
        self.admits(&row.status)
    }

    fn paid_installment(row: &ReportRow) -> bool {
        row.status == InstallmentStatus::Paid.as_str()
    }

    fn purchase(row: &ReportRow) -> bool {
        row.status != PurchaseStatus::Cancelled.as_str()
    }

    fn manual_sale(row: &ReportRow) -> bool {
        !row.linked && row.status == SaleStatus::Completed.as_str()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn sum<'a>(rows: impl IntoIterator<Item = &'a ReportRow>) -> i64 {
    rows.into_iter().map(|r| r.amount).sum()
}

fn net(paid_invoices: i64, paid_installments: i64, manual_sales: i64, purchases: i64, expenses: i64) -> i64 {
    paid_invoices + paid_installments + manual_sales - purchases - expenses
}

// ============================================================================
// Aggregation
// ============================================================================

pub fn summarize(data: &ReportData, selection: &Selection) -> ReportSummary {
    let invoices_total = sum(data.invoices.iter().filter(|r| selection.invoice(r)));
    let paid_invoices_total = sum(data.invoices.iter().filter(|r| selection.paid_invoice(r)));
    let expenses_total = sum(data.expenses.iter().filter(|r| selection.expense(r)));
    let installments_total = sum(data.installments.iter().filter(|r| Selection::paid_installment(r)));
    let purchases_total = sum(data.purchases.iter().filter(|r| Selection::purchase(r)));
    let manual_sales_total = sum(data.sales.iter().filter(|r| Selection::manual_sale(r)));

    ReportSummary {
        invoices_total,
        paid_invoices_total,
        purchases_total,
        expenses_total,
        installments_total,
        manual_sales_total,
        net: net(
            paid_invoices_total,
            installments_total,
            manual_sales_total,
            purchases_total,
            expenses_total,
        ),
    }
}

/// Fully populated series; rows outside `[from, to]` are ignored
pub fn timeseries(
    data: &ReportData,
    selection: &Selection,
    from: NaiveDate,
    to: NaiveDate,
    granularity: Granularity,
) -> AppResult<Vec<ReportBucket>> {
    let keys = bucket_keys(from, to, granularity)?;
    let index: BTreeMap<String, usize> = keys.iter().cloned().enumerate().map(|(i, k)| (k, i)).collect();
    let mut buckets: Vec<ReportBucket> = keys.into_iter().map(ReportBucket::empty).collect();

    let slot = |row: &ReportRow| -> Option<usize> {
        if row.date < from || row.date > to {
            return None;
        }
        index.get(&bucket_key(row.date, granularity)).copied()
    };

    for row in data.invoices.iter().filter(|r| selection.paid_invoice(r)) {
        if let Some(i) = slot(row) {
            buckets[i].invoices += row.amount;
        }
    }
    for row in data.expenses.iter().filter(|r| selection.expense(r)) {
        if let Some(i) = slot(row) {
            buckets[i].expenses += row.amount;
        }
    }
    for row in data.installments.iter().filter(|r| Selection::paid_installment(r)) {
        if let Some(i) = slot(row) {
            buckets[i].installments += row.amount;
        }
    }
    for row in data.purchases.iter().filter(|r| Selection::purchase(r)) {
        if let Some(i) = slot(row) {
            buckets[i].purchases += row.amount;
        }
    }
    for row in data.sales.iter().filter(|r| Selection::manual_sale(r)) {
        if let Some(i) = slot(row) {
            buckets[i].sales += row.amount;
        }
    }

    for bucket in &mut buckets {
        bucket.net = net(
            bucket.invoices,
            bucket.installments,
            bucket.sales,
            bucket.purchases,
            bucket.expenses,
        );
    }
    Ok(buckets)
}

// ============================================================================
// Breakdown
// ============================================================================

/// Status sets per entity, keyed by breakdown prefix
#[derive(Debug, Clone)]
pub struct BreakdownStatuses {
    pub invoices: Vec<String>,
    pub expenses: Vec<String>,
    pub installments: Vec<String>,
    pub purchases: Vec<String>,
    pub sales: Vec<String>,
}

fn all<T: std::fmt::Display>(statuses: &[T]) -> Vec<String> {
    statuses.iter().map(ToString::to_string).collect()
}

/// Restrict `known` to the caller's comma-separated list; unknown names are rejected
fn restrict(known: Vec<String>, requested: Option<&str>, entity: &str) -> AppResult<Vec<String>> {
    let Some(requested) = requested else {
        return Ok(known);
    };
    let requested = split_list(requested);
    if requested.is_empty() {
        return Ok(known);
    }
    if let Some(unknown) = requested.iter().find(|s| !known.contains(s)) {
        return Err(AppError::validation(format!("Unknown {entity} status '{unknown}'"))
            .with_detail("entity", entity.to_string()));
    }
    Ok(known.into_iter().filter(|s| requested.contains(s)).collect())
}

impl BreakdownStatuses {
    pub fn from_query(query: &ReportQuery) -> AppResult<Self> {
        Ok(Self {
            invoices: restrict(all(InvoiceStatus::ALL), query.invoice_statuses.as_deref(), "invoice")?,
            expenses: restrict(all(ExpenseStatus::ALL), query.expense_statuses.as_deref(), "expense")?,
            installments: restrict(
                all(InstallmentStatus::ALL),
                query.installment_statuses.as_deref(),
                "installment",
            )?,
            purchases: restrict(all(PurchaseStatus::ALL), query.purchase_statuses.as_deref(), "purchase")?,
            sales: restrict(all(SaleStatus::ALL), query.sale_statuses.as_deref(), "sale")?,
        })
    }

    /// Every `prefix:status` key, in output order
    pub fn keys(&self) -> Vec<String> {
        self.groups()
            .into_iter()
            .flat_map(|(prefix, statuses)| statuses.iter().map(move |s| format!("{prefix}:{s}")))
            .collect()
    }

    fn groups(&self) -> [(&'static str, &[String]); 5] {
        [
            ("inv", self.invoices.as_slice()),
            ("exp", self.expenses.as_slice()),
            ("ins", self.installments.as_slice()),
            ("pur", self.purchases.as_slice()),
            ("sal", self.sales.as_slice()),
        ]
    }
}

impl Default for BreakdownStatuses {
    fn default() -> Self {
        Self {
            invoices: all(InvoiceStatus::ALL),
            expenses: all(ExpenseStatus::ALL),
            installments: all(InstallmentStatus::ALL),
            purchases: all(PurchaseStatus::ALL),
            sales: all(SaleStatus::ALL),
        }
    }
}

/// Status-keyed series; invoice-linked sales never appear under `sal:`
pub fn breakdown(
    data: &ReportData,
    statuses: &BreakdownStatuses,
    from: NaiveDate,
    to: NaiveDate,
    granularity: Granularity,
) -> AppResult<Vec<BreakdownBucket>> {
    let keys = bucket_keys(from, to, granularity)?;
    let template: BTreeMap<String, i64> = statuses.keys().into_iter().map(|k| (k, 0)).collect();
    let index: BTreeMap<String, usize> = keys.iter().cloned().enumerate().map(|(i, k)| (k, i)).collect();
    let mut buckets: Vec<BreakdownBucket> = keys
        .into_iter()
        .map(|date_key| BreakdownBucket {
            date_key,
            values: template.clone(),
        })
        .collect();

    let sources: [(&str, &[ReportRow], bool); 5] = [
        ("inv", data.invoices.as_slice(), false),
        ("exp", data.expenses.as_slice(), false),
        ("ins", data.installments.as_slice(), false),
        ("pur", data.purchases.as_slice(), false),
        ("sal", data.sales.as_slice(), true),
    ];
    for (prefix, rows, skip_linked) in sources {
        for row in rows {
            if (skip_linked && row.linked) || row.date < from || row.date > to {
                continue;
            }
            let Some(&i) = index.get(&bucket_key(row.date, granularity)) else {
                continue;
            };
            let key = format!("{prefix}:{}", row.status);
            if let Some(value) = buckets[i].values.get_mut(&key) {
                *value += row.amount;
            }
        }
    }
    Ok(buckets)
}

// ============================================================================
// Entry points
// ============================================================================

fn scope(query: &ReportQuery) -> AppResult<ReportScope> {
    if query.to < query.from {
        return Err(range_error(format!(
            "'to' ({}) is before 'from' ({})",
            query.to, query.from
        )));
    }
    Ok(ReportScope {
        from: query.from,
        to: query.to,
        client_id: query.client_id,
        project_id: query.project_id,
    })
}

pub async fn load_summary(pool: &SqlitePool, query: &ReportQuery) -> AppResult<ReportSummary> {
    let data = report::fetch(pool, &scope(query)?).await?;
    Ok(summarize(&data, &Selection::from_query(query)))
}

pub async fn load_timeseries(pool: &SqlitePool, query: &ReportQuery) -> AppResult<Vec<ReportBucket>> {
    let scope = scope(query)?;
    // validate the range before touching the database
    bucket_keys(query.from, query.to, query.granularity)?;
    let data = report::fetch(pool, &scope).await?;
    timeseries(&data, &Selection::from_query(query), query.from, query.to, query.granularity)
}

pub async fn load_breakdown(
    pool: &SqlitePool,
    query: &ReportQuery,
) -> AppResult<(BreakdownStatuses, Vec<BreakdownBucket>)> {
    let scope = scope(query)?;
    let statuses = BreakdownStatuses::from_query(query)?;
    bucket_keys(query.from, query.to, query.granularity)?;
    let data = report::fetch(pool, &scope).await?;
    let buckets = breakdown(&data, &statuses, query.from, query.to, query.granularity)?;
    Ok((statuses, buckets))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(d: &str, amount: i64, status: &str) -> ReportRow {
        ReportRow {
            date: date(d),
            amount,
            status: status.to_string(),
            linked: false,
        }
    }

    fn sample() -> ReportData {
        ReportData {
            invoices: vec![
                row("2024-01-03", 1000, "paid"),
                row("2024-01-10", 400, "sent"),
                row("2024-01-11", 999, "cancelled"),
            ],
            expenses: vec![row("2024-01-03", 150, "approved"), row("2024-01-20", 70, "cancelled")],
            installments: vec![row("2024-01-15", 300, "paid"), row("2024-01-16", 200, "pending")],
            purchases: vec![row("2024-01-31", 120, "received"), row("2024-01-31", 80, "cancelled")],
            sales: vec![
                row("2024-02-01", 60, "completed"),
                ReportRow {
                    linked: true,
                    ..row("2024-02-01", 1000, "completed")
                },
                row("2024-01-05", 45, "pending"),
            ],
        }
    }

    #[test]
    fn test_inclusive_day_range() {
        let keys = bucket_keys(date("2024-01-01"), date("2024-02-01"), Granularity::Day).unwrap();
        assert_eq!(keys.len(), 32);
        assert_eq!(keys.first().unwrap(), "2024-01-01");
        assert_eq!(keys.last().unwrap(), "2024-02-01");
    }

    #[test]
    fn test_month_keys_cover_partial_months() {
        let keys = bucket_keys(date("2023-11-15"), date("2024-02-01"), Granularity::Month).unwrap();
        assert_eq!(keys, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_invalid_ranges_are_bad_request() {
        let err = bucket_keys(date("2024-02-01"), date("2024-01-01"), Granularity::Day).unwrap_err();
        assert_eq!(err.code.kind(), "BAD_REQUEST");

        let err = bucket_keys(date("2000-01-01"), date("2020-01-01"), Granularity::Day).unwrap_err();
        assert_eq!(err.code, ErrorCode::ReportRangeInvalid);

        // the same span by month is fine
        assert!(bucket_keys(date("2000-01-01"), date("2020-01-01"), Granularity::Month).is_ok());
    }

    #[test]
    fn test_summary_rules() {
        let summary = summarize(&sample(), &Selection::default());
        assert_eq!(summary.invoices_total, 1400);
        assert_eq!(summary.paid_invoices_total, 1000);
        assert_eq!(summary.expenses_total, 150);
        assert_eq!(summary.installments_total, 300);
        assert_eq!(summary.purchases_total, 120);
        // linked sale excluded
        assert_eq!(summary.manual_sales_total, 60);
        assert_eq!(summary.net, 1000 + 300 + 60 - 120 - 150);
    }

    #[test]
    fn test_status_filter_includes_cancelled() {
        let selection = Selection {
            statuses: Some(vec!["cancelled".into()]),
        };
        let summary = summarize(&sample(), &selection);
        assert_eq!(summary.invoices_total, 999);
        assert_eq!(summary.paid_invoices_total, 0);
        assert_eq!(summary.expenses_total, 70);
    }

    #[test]
    fn test_timeseries_matches_summary() {
        let data = sample();
        let selection = Selection::default();
        let (from, to) = (date("2024-01-01"), date("2024-02-01"));
        let buckets = timeseries(&data, &selection, from, to, Granularity::Day).unwrap();
        assert_eq!(buckets.len(), 32);

        let total: i64 = buckets.iter().map(|b| b.net).sum();
        assert_eq!(total, summarize(&data, &selection).net);

        let jan3 = &buckets[2];
        assert_eq!(jan3.date_key, "2024-01-03");
        assert_eq!(jan3.invoices, 1000);
        assert_eq!(jan3.expenses, 150);
        assert_eq!(jan3.net, 850);
        // empty days stay zero
        assert_eq!(buckets[1], ReportBucket::empty("2024-01-02"));
    }

    #[test]
    fn test_monthly_series() {
        let buckets = timeseries(
            &sample(),
            &Selection::default(),
            date("2024-01-01"),
            date("2024-02-29"),
            Granularity::Month,
        )
        .unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[1].date_key, "2024-02");
        assert_eq!(buckets[1].sales, 60);
    }

    #[test]
    fn test_breakdown_keys_and_linked_sales() {
        let statuses = BreakdownStatuses::default();
        let buckets = breakdown(
            &sample(),
            &statuses,
            date("2024-01-01"),
            date("2024-02-01"),
            Granularity::Month,
        )
        .unwrap();
        assert_eq!(buckets.len(), 2);

        let jan = &buckets[0].values;
        assert_eq!(jan.len(), 5 + 4 + 4 + 3 + 3);
        assert_eq!(jan["inv:paid"], 1000);
        assert_eq!(jan["inv:cancelled"], 999);
        assert_eq!(jan["inv:draft"], 0);
        assert_eq!(jan["sal:pending"], 45);

        let feb = &buckets[1].values;
        assert_eq!(feb["sal:completed"], 60);
    }

    #[test]
    fn test_breakdown_restriction() {
        let query = ReportQuery {
            from: date("2024-01-01"),
            to: date("2024-01-31"),
            granularity: Granularity::Day,
            client_id: None,
            project_id: None,
            status: None,
            invoice_statuses: Some("paid, sent".into()),
            expense_statuses: None,
            installment_statuses: None,
            purchase_statuses: None,
            sale_statuses: Some("completed".into()),
        };
        let statuses = BreakdownStatuses::from_query(&query).unwrap();
        assert_eq!(statuses.invoices, vec!["sent", "paid"]);
        assert!(statuses.keys().contains(&"sal:completed".to_string()));
        assert!(!statuses.keys().contains(&"sal:pending".to_string()));

        let bad = ReportQuery {
            invoice_statuses: Some("void".into()),
            ..query
        };
        assert!(BreakdownStatuses::from_query(&bad).is_err());
    }
}
