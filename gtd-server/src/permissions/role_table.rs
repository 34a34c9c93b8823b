//! Role Table
//!
//! Immutable role → sections / detailed-permissions mapping, built once at
//! startup and shared through `Arc`. A JSON file can replace the built-in
//! table:
//!
//! ```json
//! {
//!   "roles": {
//!     "admin":    { "sections": ["*"] },
//!     "designer": {
//!       "sections": ["dashboard", "projects", "tasks"],
//!       "resources": { "projects": { "view_own": true } }
//!     }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use shared::models::ResourcePermissions;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Grants every section and full detailed permissions
pub const WILDCARD: &str = "*";

/// Every section known to the server
pub const SECTIONS: &[&str] = &[
    "dashboard",
    "clients",
    "projects",
    "tasks",
    "invoices",
    "accounting",
    "hr",
    "reports",
    "approvals",
    "users",
    "audit",
];

/// Roles allowed to decide approval requests
pub const REVIEWER_ROLES: &[&str] = &["admin", "finance_manager"];

/// One role's defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    #[serde(default)]
    pub sections: BTreeSet<String>,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourcePermissions>,
}

impl RoleDefinition {
    /// `resources` pairs a resource with comma separated flags (`"view,create"`)
    pub fn new(sections: &[&str], resources: &[(&str, &str)]) -> Self {
        Self {
            sections: sections.iter().map(|s| s.to_string()).collect(),
            resources: resources
                .iter()
                .map(|(name, flags)| (name.to_string(), caps(flags)))
                .collect(),
        }
    }

    fn is_wildcard(&self) -> bool {
        self.sections.contains(WILDCARD)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTable {
    roles: BTreeMap<String, RoleDefinition>,
}

#[derive(Debug, thiserror::Error)]
pub enum RoleTableError {
    #[error("Failed to read role table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid role table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Role table must define at least one role")]
    Empty,
}

/// Build a capability set from comma separated flag names
fn caps(flags: &str) -> ResourcePermissions {
    let mut p = ResourcePermissions::NONE;
    for flag in flags.split(',') {
        match flag.trim() {
            "view" => p.view = true,
            "view_own" => p.view_own = true,
            "view_financials" => p.view_financials = true,
            "create" => p.create = true,
            "edit" => p.edit = true,
            "delete" => p.delete = true,
            "approve" => p.approve = true,
            "submit" => p.submit = true,
            _ => {}
        }
    }
    p
}

const READ: &str = "view";
const MANAGE: &str = "view,create,edit,submit";

impl RoleTable {
    pub fn new(roles: BTreeMap<String, RoleDefinition>) -> Self {
        Self { roles }
    }

    /// Canonical role table
    pub fn builtin() -> Self {
        let mut roles = BTreeMap::new();
        roles.insert("admin".to_string(), RoleDefinition::new(&[WILDCARD], &[]));
        roles.insert(
            "finance_manager".to_string(),
            RoleDefinition::new(
                &["dashboard", "clients", "projects", "invoices", "accounting", "reports", "approvals"],
                &[
                    ("dashboard", READ),
                    ("clients", READ),
                    ("projects", "view,view_financials"),
                    ("invoices", "view,view_financials,create,edit,delete,approve,submit"),
                    ("accounting", "view,view_financials,create,edit,delete,approve,submit"),
                    ("reports", "view,view_financials"),
                    ("approvals", "view,approve"),
                ],
            ),
        );
        roles.insert(
            "accountant".to_string(),
            RoleDefinition::new(
                &["dashboard", "clients", "invoices", "accounting", "reports"],
                &[
                    ("dashboard", READ),
                    ("clients", READ),
                    ("invoices", "view,view_financials,create,edit,submit"),
                    ("accounting", "view,view_financials,create,edit,submit"),
                    ("reports", "view,view_financials"),
                ],
            ),
        );
        roles.insert(
            "project_manager".to_string(),
            RoleDefinition::new(
                &["dashboard", "clients", "projects", "tasks", "invoices", "reports"],
                &[
                    ("dashboard", READ),
                    ("clients", MANAGE),
                    ("projects", "view,view_financials,create,edit,submit"),
                    ("tasks", "view,create,edit,delete,submit"),
                    ("invoices", "view,create,submit"),
                    ("reports", READ),
                ],
            ),
        );
        roles.insert(
            "site_engineer".to_string(),
            RoleDefinition::new(
                &["dashboard", "projects", "tasks"],
                &[
                    ("dashboard", READ),
                    ("projects", "view_own"),
                    ("tasks", "view,edit,submit"),
                ],
            ),
        );
        roles.insert(
            "designer".to_string(),
            RoleDefinition::new(
                &["dashboard", "projects", "tasks"],
                &[
                    ("dashboard", READ),
                    ("projects", "view_own"),
                    ("tasks", "view,create,edit,submit"),
                ],
            ),
        );
        roles.insert(
            "hr_manager".to_string(),
            RoleDefinition::new(
                &["dashboard", "hr"],
                &[
                    ("dashboard", READ),
                    ("hr", "view,view_financials,create,edit,delete,approve,submit"),
                ],
            ),
        );
        roles.insert(
            "sales_manager".to_string(),
            RoleDefinition::new(
                &["dashboard", "clients", "projects", "invoices"],
                &[
                    ("dashboard", READ),
                    ("clients", MANAGE),
                    ("projects", READ),
                    ("invoices", "view,view_financials,create,edit,submit"),
                ],
            ),
        );
        roles.insert("viewer".to_string(), RoleDefinition::new(&["dashboard"], &[("dashboard", READ)]));
        Self { roles }
    }

    pub fn from_json(json: &str) -> Result<Self, RoleTableError> {
        let table: Self = serde_json::from_str(json)?;
        if table.roles.is_empty() {
            return Err(RoleTableError::Empty);
        }
        Ok(table)
    }

    pub fn from_file(path: &Path) -> Result<Self, RoleTableError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Replace or add one role (builder style, used by tests and setup code)
    pub fn with_role(mut self, name: impl Into<String>, definition: RoleDefinition) -> Self {
        self.roles.insert(name.into(), definition);
        self
    }

    pub fn contains_role(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    /// Role default for a section; unknown roles get nothing
    pub fn allows_section(&self, role: &str, section: &str) -> bool {
        self.roles
            .get(role)
            .is_some_and(|def| def.is_wildcard() || def.sections.contains(section))
    }

    /// Role default detailed permissions on a resource
    pub fn resource_permissions(&self, role: &str, resource: &str) -> ResourcePermissions {
        match self.roles.get(role) {
            Some(def) => match def.resources.get(resource) {
                Some(perms) => *perms,
                None if def.is_wildcard() => ResourcePermissions::FULL,
                None => ResourcePermissions::NONE,
            },
            None => ResourcePermissions::NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_admin_wildcard() {
        let table = RoleTable::builtin();
        for section in SECTIONS {
            assert!(table.allows_section("admin", section));
        }
        assert_eq!(
            table.resource_permissions("admin", "accounting"),
            ResourcePermissions::FULL
        );
    }

    #[test]
    fn test_builtin_section_defaults() {
        let table = RoleTable::builtin();
        assert!(table.allows_section("designer", "projects"));
        assert!(!table.allows_section("viewer", "projects"));
        assert!(table.allows_section("hr_manager", "hr"));
        assert!(!table.allows_section("accountant", "hr"));
        assert!(!table.allows_section("ghost", "dashboard"));
    }

    #[test]
    fn test_designer_projects_are_own_only() {
        let table = RoleTable::builtin();
        let perms = table.resource_permissions("designer", "projects");
        assert!(perms.view_own);
        assert!(!perms.view);
        assert_eq!(
            table.resource_permissions("designer", "accounting"),
            ResourcePermissions::NONE
        );
    }

    #[test]
    fn test_from_json() {
        let table = RoleTable::from_json(
            r#"{"roles": {"auditor": {"sections": ["audit", "reports"], "resources": {"reports": {"view": true}}}}}"#,
        )
        .unwrap();
        assert!(table.allows_section("auditor", "audit"));
        assert!(!table.allows_section("admin", "audit"));
        assert!(table.resource_permissions("auditor", "reports").view);
        assert!(!table.resource_permissions("auditor", "reports").create);

        assert!(matches!(
            RoleTable::from_json(r#"{"roles": {}}"#),
            Err(RoleTableError::Empty)
        ));
        assert!(matches!(
            RoleTable::from_json("not json"),
            Err(RoleTableError::Parse(_))
        ));
    }
}
