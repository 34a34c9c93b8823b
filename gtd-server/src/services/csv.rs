//! CSV export of report series
//!
//! UTF-8 with a leading BOM so spreadsheet tools pick the right encoding.
//! Cells are dates, integers or fixed `prefix:status` keys, so no quoting
//! is required.

use std::fmt::Write;

use shared::models::{BreakdownBucket, ReportBucket};

pub const BOM: &str = "\u{FEFF}";
pub const CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const TIMESERIES_HEADER: &str = "date,invoices,installments,expenses,net";

pub fn timeseries_csv(buckets: &[ReportBucket]) -> String {
    let mut out = String::with_capacity(BOM.len() + 48 * (buckets.len() + 1));
    out.push_str(BOM);
    out.push_str(TIMESERIES_HEADER);
    out.push('\n');
    for b in buckets {
        let _ = writeln!(out, "{},{},{},{},{}", b.date_key, b.invoices, b.installments, b.expenses, b.net);
    }
    out
}

/// `date,<keys...>`; a key missing from a bucket is written as 0
pub fn breakdown_csv(keys: &[String], buckets: &[BreakdownBucket]) -> String {
    let mut out = String::from(BOM);
    out.push_str("date");
    for key in keys {
        out.push(',');
        out.push_str(key);
    }
    out.push('\n');
    for b in buckets {
        out.push_str(&b.date_key);
        for key in keys {
            let _ = write!(out, ",{}", b.values.get(key).copied().unwrap_or(0));
        }
        out.push('\n');
    }
    out
}

/// `attachment; filename="<stem>-<from>_<to>.csv"`
pub fn attachment(stem: &str, from: &str, to: &str) -> String {
    format!("attachment; filename=\"{stem}-{from}_{to}.csv\"")
}
