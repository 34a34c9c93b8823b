//! Permission Models
//!
//! Sections, detailed per-resource capabilities and per-user overrides.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-user override map: `"section"` or `"section.modifier"` -> allow/deny
pub type PermissionOverrides = BTreeMap<String, bool>;

/// Fine-grained capabilities a role holds on one resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcePermissions {
    pub view: bool,
    pub view_own: bool,
    pub view_financials: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
    pub approve: bool,
    pub submit: bool,
}

impl ResourcePermissions {
    /// Everything allowed
    pub const FULL: Self = Self {
        view: true,
        view_own: true,
        view_financials: true,
        create: true,
        edit: true,
        delete: true,
        approve: true,
        submit: true,
    };

    /// Nothing allowed
    pub const NONE: Self = Self {
        view: false,
        view_own: false,
        view_financials: false,
        create: false,
        edit: false,
        delete: false,
        approve: false,
        submit: false,
    };

    /// Coarse access level used by the UI
    pub fn access_level(&self) -> AccessLevel {
        if self.view && (self.create || self.edit || self.delete) {
            AccessLevel::Full
        } else if self.view {
            AccessLevel::ReadOnly
        } else if self.view_own {
            AccessLevel::Own
        } else {
            AccessLevel::None
        }
    }
}

/// Granularity of access to a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Full,
    Own,
    ReadOnly,
    None,
}

/// Section access plus detailed permissions, after overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectivePermissions {
    pub role: String,
    pub sections: BTreeMap<String, bool>,
    pub resources: BTreeMap<String, ResourcePermissions>,
    pub access: BTreeMap<String, AccessLevel>,
    pub overrides: PermissionOverrides,
}

/// Override replacement payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionOverridesUpdate {
    pub permissions: PermissionOverrides,
}
