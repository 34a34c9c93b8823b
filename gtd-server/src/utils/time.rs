//! Business date helpers
//!
//! Business dates are `YYYY-MM-DD` (UTC); stored timestamps are Unix millis.

use chrono::NaiveDate;

use super::{AppError, AppResult, ErrorCode};

/// Parse a `YYYY-MM-DD` string
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Reject `start > end` with the given error code
pub fn ensure_date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    code: ErrorCode,
) -> AppResult<()> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => Err(AppError::new(code)
            .with_detail("start_date", s.to_string())
            .with_detail("end_date", e.to_string())),
        _ => Ok(()),
    }
}

/// 00:00:00 UTC of `date` in Unix millis
pub fn day_start_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}

/// 00:00:00 UTC of the following day (exclusive bound)
pub fn day_end_millis(date: NaiveDate) -> i64 {
    day_start_millis(date.succ_opt().unwrap_or(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(d("2024-02-29").to_string(), "2024-02-29");
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("01/02/2024").is_err());
    }

    #[test]
    fn test_ensure_date_order() {
        let code = ErrorCode::TaskDatesInvalid;
        assert!(ensure_date_order(Some(d("2024-01-01")), Some(d("2024-01-01")), code).is_ok());
        assert!(ensure_date_order(None, Some(d("2024-01-01")), code).is_ok());
        let err = ensure_date_order(Some(d("2024-01-02")), Some(d("2024-01-01")), code).unwrap_err();
        assert_eq!(err.code, ErrorCode::TaskDatesInvalid);
        assert_eq!(err.code.kind(), "BAD_REQUEST");
    }

    #[test]
    fn test_day_bounds() {
        let start = day_start_millis(d("2024-01-01"));
        assert_eq!(start, 1_704_067_200_000);
        assert_eq!(day_end_millis(d("2024-01-01")) - start, 86_400_000);
    }
}
