//! Authentication
//!
//! - [`JwtService`] - session token signing and validation
//! - [`CurrentUser`] - authenticated actor extractor
//! - [`require_auth`] - middleware guarding `/api/`
//! - [`password`] - argon2 hashing
//! - [`session`] - session cookie helpers

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod session;

pub use extractor::{CurrentUser, authenticate};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
