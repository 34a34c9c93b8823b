//! Data models
//!
//! Shared between gtd-server and the browser client (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis,
//! business dates are `YYYY-MM-DD`, money is whole currency units (`i64`).

/// Declares a status-like enum stored as snake_case TEXT.
///
/// Generates `ALL`, `as_str`, `Display` and `FromStr` alongside the
/// serde/sqlx derives.
macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        #[cfg_attr(feature = "db", derive(sqlx::Type))]
        #[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {}: {}", stringify!($name), other)),
                }
            }
        }
    };
}

pub mod approval;
pub mod audit;
pub mod boq;
pub mod client;
pub mod expense;
pub mod hr;
pub mod installment;
pub mod invoice;
pub mod notification;
pub mod permission;
pub mod project;
pub mod purchase;
pub mod report;
pub mod sale;
pub mod task;
pub mod upload;
pub mod user;

// Re-exports
pub use approval::*;
pub use audit::*;
pub use boq::*;
pub use client::*;
pub use expense::*;
pub use hr::*;
pub use installment::*;
pub use invoice::*;
pub use notification::*;
pub use permission::*;
pub use project::*;
pub use purchase::*;
pub use report::*;
pub use sale::*;
pub use task::*;
pub use upload::*;
pub use user::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_enum_roundtrip() {
        for status in InvoiceStatus::ALL {
            let parsed: InvoiceStatus = status.as_str().parse().unwrap();
            assert_eq!(&parsed, status);
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert!("bogus".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn test_multi_word_statuses_are_snake_case() {
        assert_eq!(ProjectStatus::InProgress.as_str(), "in_progress");
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(AttendanceStatus::HalfDay.to_string(), "half_day");
    }
}
