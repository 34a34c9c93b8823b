//! Unified error codes for the Golden Touch Design backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Approval workflow errors
//! - 4xxx: Finance errors (invoices, expenses, installments)
//! - 5xxx: Project and task errors
//! - 6xxx: File upload errors
//! - 8xxx: User and HR errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as its `u16` value so the browser client can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Resource is still referenced by other records
    ResourceInUse = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Session token has expired
    TokenExpired = 1003,
    /// Session token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied for a section or capability
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,
    /// Reviewer role (admin, finance manager) required
    ReviewerRequired = 2004,

    // ==================== 3xxx: Approval ====================
    /// Approval request not found
    ApprovalNotFound = 3001,
    /// Approval request already approved or rejected
    ApprovalAlreadyProcessed = 3002,
    /// Entity type / action combination cannot be approved
    ApprovalUnsupportedAction = 3003,
    /// Stored request payload could not be decoded
    ApprovalPayloadInvalid = 3004,

    // ==================== 4xxx: Finance ====================
    /// Invoice not found
    InvoiceNotFound = 4001,
    /// Invoice status transition not allowed
    InvoiceInvalidStatus = 4002,
    /// Only quotations can be converted
    InvoiceNotQuotation = 4003,
    /// Invoice number already used
    InvoiceNumberExists = 4004,
    /// Expense not found
    ExpenseNotFound = 4101,
    /// Installment not found
    InstallmentNotFound = 4201,
    /// Installment already paid
    InstallmentAlreadyPaid = 4202,
    /// Purchase not found
    PurchaseNotFound = 4301,
    /// Sale not found
    SaleNotFound = 4401,
    /// BOQ item not found
    BoqItemNotFound = 4501,
    /// Report date range is invalid
    ReportRangeInvalid = 4601,

    // ==================== 5xxx: Project ====================
    /// Client not found
    ClientNotFound = 5001,
    /// Client still has projects
    ClientHasProjects = 5002,
    /// Project not found
    ProjectNotFound = 5101,
    /// Task not found
    TaskNotFound = 5201,
    /// Task dates invalid (start after end)
    TaskDatesInvalid = 5202,

    // ==================== 6xxx: File upload ====================
    /// File too large
    FileTooLarge = 6501,
    /// Unsupported file format
    UnsupportedFileFormat = 6502,
    /// File content does not match the declared type
    FileContentMismatch = 6503,
    /// Payload is not valid base64
    InvalidBase64 = 6504,
    /// Empty file
    EmptyFile = 6505,
    /// No filename provided
    NoFilename = 6506,
    /// File storage failed
    FileStorageFailed = 6509,

    // ==================== 8xxx: Users and HR ====================
    /// User not found
    UserNotFound = 8001,
    /// Email already registered
    UserEmailExists = 8002,
    /// Cannot delete own account
    UserCannotDeleteSelf = 8003,
    /// Unknown role name
    RoleNotFound = 8101,
    /// Leave request not found
    LeaveNotFound = 8201,
    /// Leave request already decided
    LeaveAlreadyDecided = 8202,
    /// Leave dates invalid
    LeaveDatesInvalid = 8203,
    /// Payroll entry not found
    PayrollNotFound = 8301,
    /// Payroll entry already exists for the period
    PayrollPeriodExists = 8302,
    /// Attendance record not found
    AttendanceNotFound = 8401,
    /// Notification not found
    NotificationNotFound = 8501,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Database is not configured
    DatabaseNotConfigured = 9003,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::ResourceInUse => "Resource is still in use",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Session has expired",
            ErrorCode::TokenInvalid => "Invalid session",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role required",
            ErrorCode::AdminRequired => "Admin role required",
            ErrorCode::ReviewerRequired => "Only reviewers can decide approval requests",

            // Approval
            ErrorCode::ApprovalNotFound => "Approval request not found",
            ErrorCode::ApprovalAlreadyProcessed => "Approval request already processed",
            ErrorCode::ApprovalUnsupportedAction => "Unsupported approval action",
            ErrorCode::ApprovalPayloadInvalid => "Approval request data is invalid",

            // Finance
            ErrorCode::InvoiceNotFound => "Invoice not found",
            ErrorCode::InvoiceInvalidStatus => "Invalid invoice status",
            ErrorCode::InvoiceNotQuotation => "Only quotations can be converted to invoices",
            ErrorCode::InvoiceNumberExists => "Invoice number already exists",
            ErrorCode::ExpenseNotFound => "Expense not found",
            ErrorCode::InstallmentNotFound => "Installment not found",
            ErrorCode::InstallmentAlreadyPaid => "Installment already paid",
            ErrorCode::PurchaseNotFound => "Purchase not found",
            ErrorCode::SaleNotFound => "Sale not found",
            ErrorCode::BoqItemNotFound => "BOQ item not found",
            ErrorCode::ReportRangeInvalid => "Invalid report date range",

            // Project
            ErrorCode::ClientNotFound => "Client not found",
            ErrorCode::ClientHasProjects => "Client still has projects",
            ErrorCode::ProjectNotFound => "Project not found",
            ErrorCode::TaskNotFound => "Task not found",
            ErrorCode::TaskDatesInvalid => "Task start date must not be after its end date",

            // File upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::FileContentMismatch => "File content does not match the declared type",
            ErrorCode::InvalidBase64 => "File data is not valid base64",
            ErrorCode::EmptyFile => "Empty file",
            ErrorCode::NoFilename => "No filename provided",
            ErrorCode::FileStorageFailed => "Failed to store file",

            // Users and HR
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UserEmailExists => "Email already registered",
            ErrorCode::UserCannotDeleteSelf => "Cannot delete your own account",
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::LeaveNotFound => "Leave request not found",
            ErrorCode::LeaveAlreadyDecided => "Leave request already decided",
            ErrorCode::LeaveDatesInvalid => "Leave start date must not be after its end date",
            ErrorCode::PayrollNotFound => "Payroll entry not found",
            ErrorCode::PayrollPeriodExists => "Payroll entry already exists for this period",
            ErrorCode::AttendanceNotFound => "Attendance record not found",
            ErrorCode::NotificationNotFound => "Notification not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::DatabaseNotConfigured => "Database is not configured",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::ResourceInUse),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::ReviewerRequired),

            // Approval
            3001 => Ok(ErrorCode::ApprovalNotFound),
            3002 => Ok(ErrorCode::ApprovalAlreadyProcessed),
            3003 => Ok(ErrorCode::ApprovalUnsupportedAction),
            3004 => Ok(ErrorCode::ApprovalPayloadInvalid),

            // Finance
            4001 => Ok(ErrorCode::InvoiceNotFound),
            4002 => Ok(ErrorCode::InvoiceInvalidStatus),
            4003 => Ok(ErrorCode::InvoiceNotQuotation),
            4004 => Ok(ErrorCode::InvoiceNumberExists),
            4101 => Ok(ErrorCode::ExpenseNotFound),
            4201 => Ok(ErrorCode::InstallmentNotFound),
            4202 => Ok(ErrorCode::InstallmentAlreadyPaid),
            4301 => Ok(ErrorCode::PurchaseNotFound),
            4401 => Ok(ErrorCode::SaleNotFound),
            4501 => Ok(ErrorCode::BoqItemNotFound),
            4601 => Ok(ErrorCode::ReportRangeInvalid),

            // Project
            5001 => Ok(ErrorCode::ClientNotFound),
            5002 => Ok(ErrorCode::ClientHasProjects),
            5101 => Ok(ErrorCode::ProjectNotFound),
            5201 => Ok(ErrorCode::TaskNotFound),
            5202 => Ok(ErrorCode::TaskDatesInvalid),

            // File upload
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6503 => Ok(ErrorCode::FileContentMismatch),
            6504 => Ok(ErrorCode::InvalidBase64),
            6505 => Ok(ErrorCode::EmptyFile),
            6506 => Ok(ErrorCode::NoFilename),
            6509 => Ok(ErrorCode::FileStorageFailed),

            // Users and HR
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::UserEmailExists),
            8003 => Ok(ErrorCode::UserCannotDeleteSelf),
            8101 => Ok(ErrorCode::RoleNotFound),
            8201 => Ok(ErrorCode::LeaveNotFound),
            8202 => Ok(ErrorCode::LeaveAlreadyDecided),
            8203 => Ok(ErrorCode::LeaveDatesInvalid),
            8301 => Ok(ErrorCode::PayrollNotFound),
            8302 => Ok(ErrorCode::PayrollPeriodExists),
            8401 => Ok(ErrorCode::AttendanceNotFound),
            8501 => Ok(ErrorCode::NotificationNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::DatabaseNotConfigured),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::ApprovalAlreadyProcessed.code(), 3002);
        assert_eq!(ErrorCode::FileContentMismatch.code(), 6503);
        assert_eq!(ErrorCode::UserCannotDeleteSelf.code(), 8003);
        assert_eq!(ErrorCode::DatabaseNotConfigured.code(), 9003);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(3002), Ok(ErrorCode::ApprovalAlreadyProcessed));
        assert_eq!(ErrorCode::try_from(9001), Ok(ErrorCode::InternalError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(9999), Err(InvalidErrorCode(9999)));
        assert_eq!(ErrorCode::try_from(10), Err(InvalidErrorCode(10)));
    }

    #[test]
    fn test_roundtrip_every_declared_code() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::ResourceInUse,
            ErrorCode::AccountDisabled,
            ErrorCode::ReviewerRequired,
            ErrorCode::ApprovalPayloadInvalid,
            ErrorCode::ReportRangeInvalid,
            ErrorCode::TaskDatesInvalid,
            ErrorCode::InvalidBase64,
            ErrorCode::NotificationNotFound,
            ErrorCode::ConfigError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::PermissionDenied).unwrap();
        assert_eq!(json, "2001");

        let code: ErrorCode = serde_json::from_str("3002").unwrap();
        assert_eq!(code, ErrorCode::ApprovalAlreadyProcessed);

        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display_and_message() {
        assert_eq!(format!("{}", ErrorCode::NotFound), "3");
        assert_eq!(ErrorCode::NotAuthenticated.message(), "Authentication required");
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
    }
}
