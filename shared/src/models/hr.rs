//! HR Models: attendance, leave requests, payroll

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

// ==================== Attendance ====================

status_enum! {
    AttendanceStatus {
        Present => "present",
        Absent => "absent",
        Late => "late",
        HalfDay => "half_day",
        Remote => "remote",
    }
}

/// One attendance record per user per day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Attendance {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    /// "HH:MM"
    pub check_in: Option<String>,
    /// "HH:MM"
    pub check_out: Option<String>,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub recorded_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Upsert payload keyed by (user_id, date)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttendanceRecord {
    pub user_id: i64,
    pub date: NaiveDate,
    #[validate(length(equal = 5))]
    pub check_in: Option<String>,
    #[validate(length(equal = 5))]
    pub check_out: Option<String>,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceQuery {
    pub user_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// ==================== Leave ====================

status_enum! {
    LeaveType {
        Annual => "annual",
        Sick => "sick",
        Unpaid => "unpaid",
        Other => "other",
    }
}

status_enum! {
    LeaveStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LeaveRequest {
    pub id: i64,
    pub user_id: i64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub reviewed_by: Option<i64>,
    pub review_notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl LeaveRequest {
    /// Inclusive number of calendar days
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LeaveCreate {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

/// Approve / reject payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaveDecision {
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaveQuery {
    pub user_id: Option<i64>,
    pub status: Option<LeaveStatus>,
}

// ==================== Payroll ====================

status_enum! {
    PayrollStatus {
        Pending => "pending",
        Paid => "paid",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payroll {
    pub id: i64,
    pub user_id: i64,
    /// "YYYY-MM"
    pub period: String,
    pub base_salary: i64,
    pub allowances: i64,
    pub bonus: i64,
    pub deductions: i64,
    pub net_salary: i64,
    pub status: PayrollStatus,
    pub paid_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PayrollCreate {
    pub user_id: i64,
    #[validate(length(equal = 7))]
    pub period: String,
    #[validate(range(min = 0))]
    pub base_salary: i64,
    #[validate(range(min = 0))]
    pub allowances: Option<i64>,
    #[validate(range(min = 0))]
    pub bonus: Option<i64>,
    #[validate(range(min = 0))]
    pub deductions: Option<i64>,
    pub notes: Option<String>,
}

impl PayrollCreate {
    /// base + allowances + bonus - deductions
    pub fn net_salary(&self) -> i64 {
        self.base_salary
            .saturating_add(self.allowances.unwrap_or(0))
            .saturating_add(self.bonus.unwrap_or(0))
            .saturating_sub(self.deductions.unwrap_or(0))
    }
}

/// Mark-paid payload; defaults to today
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollPayment {
    pub paid_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollQuery {
    pub user_id: Option<i64>,
    pub period: Option<String>,
    pub status: Option<PayrollStatus>,
}
