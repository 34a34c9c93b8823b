//! Audit Logging
//!
//! Append-only trail of who did what, from where.
//!
//! ```text
//! handler / resolver
//!   └─ log_audit(pool, user, ip, AuditEvent) → audit_logs table
//! ```
//!
//! Writes are best effort: a failed insert is logged through `tracing` and
//! never surfaces to the caller.

pub mod ip;
pub mod logger;
pub mod types;

pub use ip::{ClientIp, client_ip};
pub use logger::log_audit;
pub use types::{AuditAction, AuditEvent};
