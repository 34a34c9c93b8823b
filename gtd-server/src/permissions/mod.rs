//! Permissions
//!
//! Section-level access (`ensure_perm`) and per-resource modifiers
//! (`has_modifier`) resolved from an immutable [`RoleTable`] plus per-user
//! overrides. Overrides always win over role defaults.

pub mod context;
pub mod resolver;
pub mod role_table;

pub use context::RequestContext;
pub use resolver::{
    Modifier, detailed_permissions, effective_permissions, has_modifier, is_valid_override_key,
    section_allowed,
};
pub use role_table::{REVIEWER_ROLES, RoleDefinition, RoleTable, RoleTableError, SECTIONS, WILDCARD};
