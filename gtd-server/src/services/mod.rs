//! Services
//!
//! Business workflows shared by several namespaces:
//!
//! - [`approval`] - deferred sensitive mutations
//! - [`notification`] - per-recipient fan-out
//! - [`reports`] - range aggregation
//! - [`csv`] - report export
//! - [`upload`] - base64 upload validation and storage

pub mod approval;
pub mod csv;
pub mod notification;
pub mod reports;
pub mod upload;
