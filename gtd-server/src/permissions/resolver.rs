//! Permission Resolver
//!
//! Pure resolution over a [`RoleTable`] and a user's override map. Override
//! keys always win over role defaults:
//!
//! 1. `"<section>"` present → honored as-is (allow or deny)
//! 2. `"<section>.view"` present and `true` → allow
//! 3. role table: wildcard or listed section → allow, else deny
//!
//! Modifiers resolve `"<resource>.<modifier>"` first, then the role's
//! detailed permissions.

use shared::models::{AccessLevel, EffectivePermissions, PermissionOverrides, ResourcePermissions};
use std::collections::BTreeMap;

use super::role_table::{RoleTable, SECTIONS};

/// Capability flag on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    View,
    ViewOwn,
    ViewFinancials,
    Create,
    Edit,
    Delete,
    Approve,
    Submit,
    /// Sees only records the user is assigned to
    OnlyAssigned,
    /// Sensitive mutations skip the approval queue
    AutoApprove,
}

impl Modifier {
    pub const ALL: &'static [Modifier] = &[
        Modifier::View,
        Modifier::ViewOwn,
        Modifier::ViewFinancials,
        Modifier::Create,
        Modifier::Edit,
        Modifier::Delete,
        Modifier::Approve,
        Modifier::Submit,
        Modifier::OnlyAssigned,
        Modifier::AutoApprove,
    ];

    /// Override key suffix
    pub fn key(&self) -> &'static str {
        match self {
            Modifier::View => "view",
            Modifier::ViewOwn => "viewOwn",
            Modifier::ViewFinancials => "viewFinancials",
            Modifier::Create => "create",
            Modifier::Edit => "edit",
            Modifier::Delete => "delete",
            Modifier::Approve => "approve",
            Modifier::Submit => "submit",
            Modifier::OnlyAssigned => "onlyAssigned",
            Modifier::AutoApprove => "autoApprove",
        }
    }

    /// Role default for this modifier
    fn from_role(&self, p: &ResourcePermissions) -> bool {
        match self {
            Modifier::View => p.view,
            Modifier::ViewOwn => p.view_own,
            Modifier::ViewFinancials => p.view_financials,
            Modifier::Create => p.create,
            Modifier::Edit => p.edit,
            Modifier::Delete => p.delete,
            Modifier::Approve => p.approve,
            Modifier::Submit => p.submit,
            Modifier::OnlyAssigned => p.view_own && !p.view,
            Modifier::AutoApprove => p.approve,
        }
    }
}

/// `"<section>"` or `"<section>.<modifier>"` over known sections and modifiers
pub fn is_valid_override_key(key: &str) -> bool {
    let (section, modifier) = match key.split_once('.') {
        Some((section, modifier)) => (section, Some(modifier)),
        None => (key, None),
    };
    SECTIONS.contains(&section)
        && modifier.is_none_or(|m| Modifier::ALL.iter().any(|known| known.key() == m))
}

fn modifier_key(resource: &str, modifier: Modifier) -> String {
    format!("{}.{}", resource, modifier.key())
}

pub fn section_allowed(
    table: &RoleTable,
    role: &str,
    overrides: &PermissionOverrides,
    section: &str,
) -> bool {
    if let Some(&explicit) = overrides.get(section) {
        return explicit;
    }
    if overrides.get(&modifier_key(section, Modifier::View)) == Some(&true) {
        return true;
    }
    table.allows_section(role, section)
}

pub fn has_modifier(
    table: &RoleTable,
    role: &str,
    overrides: &PermissionOverrides,
    resource: &str,
    modifier: Modifier,
) -> bool {
    if let Some(&explicit) = overrides.get(&modifier_key(resource, modifier)) {
        return explicit;
    }
    modifier.from_role(&table.resource_permissions(role, resource))
}

/// Detailed permissions on one resource after modifier overrides
pub fn detailed_permissions(
    table: &RoleTable,
    role: &str,
    overrides: &PermissionOverrides,
    resource: &str,
) -> ResourcePermissions {
    let check = |m| has_modifier(table, role, overrides, resource, m);
    ResourcePermissions {
        view: check(Modifier::View),
        view_own: check(Modifier::ViewOwn),
        view_financials: check(Modifier::ViewFinancials),
        create: check(Modifier::Create),
        edit: check(Modifier::Edit),
        delete: check(Modifier::Delete),
        approve: check(Modifier::Approve),
        submit: check(Modifier::Submit),
    }
}

/// Everything the UI needs to gate itself for one user
pub fn effective_permissions(
    table: &RoleTable,
    role: &str,
    overrides: &PermissionOverrides,
) -> EffectivePermissions {
    let mut sections = BTreeMap::new();
    let mut resources = BTreeMap::new();
    let mut access = BTreeMap::new();

    for section in SECTIONS {
        let allowed = section_allowed(table, role, overrides, section);
        let detail = if allowed {
            detailed_permissions(table, role, overrides, section)
        } else {
            ResourcePermissions::NONE
        };
        let level = if allowed {
            match detail.access_level() {
                // section access without detail still reads
                AccessLevel::None => AccessLevel::ReadOnly,
                level => level,
            }
        } else {
            AccessLevel::None
        };
        sections.insert(section.to_string(), allowed);
        resources.insert(section.to_string(), detail);
        access.insert(section.to_string(), level);
    }

    EffectivePermissions {
        role: role.to_string(),
        sections,
        resources,
        access,
        overrides: overrides.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(pairs: &[(&str, bool)]) -> PermissionOverrides {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_role_defaults() {
        let table = RoleTable::builtin();
        let none = PermissionOverrides::new();
        assert!(section_allowed(&table, "designer", &none, "projects"));
        assert!(!section_allowed(&table, "viewer", &none, "projects"));
        assert!(!section_allowed(&table, "unknown_role", &none, "dashboard"));
        for section in SECTIONS {
            assert!(section_allowed(&table, "admin", &none, section));
        }
    }

    #[test]
    fn test_section_override_wins_both_ways() {
        let table = RoleTable::builtin();
        let deny = overrides(&[("projects", false)]);
        assert!(!section_allowed(&table, "admin", &deny, "projects"));
        assert!(!section_allowed(&table, "designer", &deny, "projects"));

        let allow = overrides(&[("accounting", true)]);
        assert!(section_allowed(&table, "viewer", &allow, "accounting"));
        assert!(section_allowed(&table, "unknown_role", &allow, "accounting"));
    }

    #[test]
    fn test_view_override_only_grants() {
        let table = RoleTable::builtin();
        let grant = overrides(&[("hr.view", true)]);
        assert!(section_allowed(&table, "viewer", &grant, "hr"));

        // a false `.view` does not revoke the role default
        let revoke = overrides(&[("projects.view", false)]);
        assert!(section_allowed(&table, "designer", &revoke, "projects"));

        // the bare section key takes precedence over `.view`
        let both = overrides(&[("hr", false), ("hr.view", true)]);
        assert!(!section_allowed(&table, "hr_manager", &both, "hr"));
    }

    #[test]
    fn test_modifiers() {
        let table = RoleTable::builtin();
        let none = PermissionOverrides::new();
        assert!(has_modifier(&table, "designer", &none, "projects", Modifier::OnlyAssigned));
        assert!(!has_modifier(&table, "project_manager", &none, "projects", Modifier::OnlyAssigned));
        assert!(!has_modifier(&table, "accountant", &none, "accounting", Modifier::AutoApprove));
        assert!(has_modifier(&table, "finance_manager", &none, "accounting", Modifier::AutoApprove));
        assert!(has_modifier(&table, "admin", &none, "anything", Modifier::Delete));

        let custom = overrides(&[("accounting.autoApprove", true), ("projects.viewFinancials", false)]);
        assert!(has_modifier(&table, "accountant", &custom, "accounting", Modifier::AutoApprove));
        assert!(!has_modifier(&table, "admin", &custom, "projects", Modifier::ViewFinancials));
    }

    #[test]
    fn test_override_key_shape() {
        assert!(is_valid_override_key("accounting"));
        assert!(is_valid_override_key("projects.onlyAssigned"));
        assert!(is_valid_override_key("invoices.autoApprove"));
        assert!(!is_valid_override_key("payments"));
        assert!(!is_valid_override_key("projects.fly"));
        assert!(!is_valid_override_key("projects.view.extra"));
    }

    #[test]
    fn test_effective_permissions() {
        let table = RoleTable::builtin();
        let custom = overrides(&[("reports", true), ("tasks.delete", true)]);
        let effective = effective_permissions(&table, "designer", &custom);

        assert_eq!(effective.sections["reports"], true);
        assert_eq!(effective.access["reports"], AccessLevel::ReadOnly);
        assert_eq!(effective.sections["accounting"], false);
        assert_eq!(effective.access["accounting"], AccessLevel::None);
        assert_eq!(effective.access["projects"], AccessLevel::Own);
        assert!(effective.resources["tasks"].delete);
        assert_eq!(effective.overrides, custom);
    }
}
