//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Approval workflow errors
/// - 4xxx: Finance errors
/// - 5xxx: Project errors
/// - 6xxx: Upload errors
/// - 8xxx: User and HR errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Approval workflow errors (3xxx)
    Approval,
    /// Finance errors (4xxx)
    Finance,
    /// Project errors (5xxx)
    Project,
    /// Upload errors (6xxx)
    Upload,
    /// User and HR errors (7xxx, 8xxx)
    People,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Approval,
            4000..5000 => Self::Finance,
            5000..6000 => Self::Project,
            6000..7000 => Self::Upload,
            7000..9000 => Self::People,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Approval => "approval",
            Self::Finance => "finance",
            Self::Project => "project",
            Self::Upload => "upload",
            Self::People => "people",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Approval);
        assert_eq!(ErrorCategory::from_code(4601), ErrorCategory::Finance);
        assert_eq!(ErrorCategory::from_code(5101), ErrorCategory::Project);
        assert_eq!(ErrorCategory::from_code(6503), ErrorCategory::Upload);
        assert_eq!(ErrorCategory::from_code(8001), ErrorCategory::People);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::ApprovalAlreadyProcessed.category(), ErrorCategory::Approval);
        assert_eq!(ErrorCode::InvoiceNotFound.category(), ErrorCategory::Finance);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Approval).unwrap();
        assert_eq!(json, "\"approval\"");
        let category: ErrorCategory = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(category, ErrorCategory::System);
    }
}
