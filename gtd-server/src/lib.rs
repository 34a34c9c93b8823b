//! Golden Touch Design backend
//!
//! Business management for an interior design and construction company:
//! clients, projects, invoicing, accounting, HR, approvals, notifications
//! and reporting behind a role-based permission matrix.
//!
//! ```text
//! gtd-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT sessions, argon2, extractor
//! ├── permissions/   # role table, resolver, request context
//! ├── audit/         # best-effort audit trail
//! ├── services/      # approvals, notifications, reports, uploads
//! ├── db/            # SQLite pool and repositories
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, dates, error re-exports
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod core;
pub mod db;
pub mod permissions;
pub mod services;
pub mod utils;

// Re-exports
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_app};
pub use permissions::{RequestContext, RoleTable};
pub use utils::{AppError, AppResult};

// Unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Security event on the `security` tracing target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
