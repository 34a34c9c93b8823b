//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::ApprovalNotFound
            | Self::InvoiceNotFound
            | Self::ExpenseNotFound
            | Self::InstallmentNotFound
            | Self::PurchaseNotFound
            | Self::SaleNotFound
            | Self::BoqItemNotFound
            | Self::ClientNotFound
            | Self::ProjectNotFound
            | Self::TaskNotFound
            | Self::UserNotFound
            | Self::RoleNotFound
            | Self::LeaveNotFound
            | Self::PayrollNotFound
            | Self::AttendanceNotFound
            | Self::NotificationNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::ResourceInUse
            | Self::InvoiceNumberExists
            | Self::ClientHasProjects
            | Self::UserEmailExists
            | Self::PayrollPeriodExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::AdminRequired
            | Self::ReviewerRequired => StatusCode::FORBIDDEN,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::DatabaseNotConfigured
            | Self::ConfigError
            | Self::FileStorageFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Symbolic error kind sent to the browser alongside the numeric code
    pub fn kind(&self) -> &'static str {
        match self.http_status() {
            StatusCode::OK => "OK",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::CONFLICT => "CONFLICT",
            StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
            StatusCode::FORBIDDEN => "FORBIDDEN",
            StatusCode::INTERNAL_SERVER_ERROR => "INTERNAL_SERVER_ERROR",
            _ => "BAD_REQUEST",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_codes() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::InvoiceNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::ApprovalNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::UserNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_codes() {
        assert_eq!(ErrorCode::UserEmailExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::ClientHasProjects.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::ClientHasProjects.kind(), "CONFLICT");
    }

    #[test]
    fn test_auth_and_permission_codes() {
        assert_eq!(ErrorCode::NotAuthenticated.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::TokenExpired.kind(), "UNAUTHORIZED");
        assert_eq!(ErrorCode::PermissionDenied.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::PermissionDenied.kind(), "FORBIDDEN");
        assert_eq!(ErrorCode::ReviewerRequired.kind(), "FORBIDDEN");
    }

    #[test]
    fn test_bad_request_defaults() {
        assert_eq!(ErrorCode::ValidationFailed.kind(), "BAD_REQUEST");
        assert_eq!(ErrorCode::ApprovalAlreadyProcessed.kind(), "BAD_REQUEST");
        assert_eq!(ErrorCode::FileContentMismatch.kind(), "BAD_REQUEST");
        assert_eq!(ErrorCode::UserCannotDeleteSelf.kind(), "BAD_REQUEST");
        assert_eq!(ErrorCode::FileTooLarge.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_system_codes() {
        assert_eq!(ErrorCode::InternalError.kind(), "INTERNAL_SERVER_ERROR");
        assert_eq!(
            ErrorCode::DatabaseNotConfigured.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
