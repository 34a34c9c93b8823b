//! Request Context
//!
//! Per-request view of the acting user: identity, caller IP and a memoized
//! permission override map. Every procedure takes a [`RequestContext`] and
//! calls [`RequestContext::ensure_perm`] before touching data.

use axum::extract::FromRequestParts;
use http::request::Parts;
use serde_json::json;
use shared::models::{EffectivePermissions, PermissionOverrides, ResourcePermissions};
use sqlx::SqlitePool;
use tokio::sync::OnceCell;

use super::resolver::{self, Modifier};
use super::role_table::REVIEWER_ROLES;
use crate::audit::{AuditAction, AuditEvent, ClientIp, log_audit};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::permission;
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode};

pub struct RequestContext {
    pub state: ServerState,
    pub user: CurrentUser,
    pub ip: String,
    overrides: OnceCell<PermissionOverrides>,
}

impl RequestContext {
    pub fn new(state: ServerState, user: CurrentUser, ip: impl Into<String>) -> Self {
        Self {
            state,
            user,
            ip: ip.into(),
            overrides: OnceCell::new(),
        }
    }

    pub fn pool(&self) -> AppResult<&SqlitePool> {
        self.state.pool()
    }

    /// Override map, loaded at most once per request
    pub async fn overrides(&self) -> AppResult<&PermissionOverrides> {
        self.overrides
            .get_or_try_init(|| async {
                permission::find_overrides(self.pool()?, self.user.id)
                    .await
                    .map_err(AppError::from)
            })
            .await
    }

    /// Allow or raise `FORBIDDEN`; denials are audit-logged
    pub async fn ensure_perm(&self, section: &str) -> AppResult<()> {
        let overrides = self.overrides().await?;
        if resolver::section_allowed(self.state.role_table(), &self.user.role, overrides, section) {
            return Ok(());
        }
        Err(self
            .deny(json!({ "section": section, "role": self.user.role }))
            .await
            .with_detail("section", section))
    }

    pub async fn has_modifier(&self, resource: &str, modifier: Modifier) -> AppResult<bool> {
        let overrides = self.overrides().await?;
        Ok(resolver::has_modifier(
            self.state.role_table(),
            &self.user.role,
            overrides,
            resource,
            modifier,
        ))
    }

    /// Like [`Self::has_modifier`] but raises `FORBIDDEN` (audit-logged)
    pub async fn require_modifier(&self, resource: &str, modifier: Modifier) -> AppResult<()> {
        if self.has_modifier(resource, modifier).await? {
            return Ok(());
        }
        Err(self
            .deny(json!({
                "section": resource,
                "modifier": modifier.key(),
                "role": self.user.role,
            }))
            .await
            .with_detail("section", resource)
            .with_detail("modifier", modifier.key()))
    }

    pub async fn detailed_permissions(&self, resource: &str) -> AppResult<ResourcePermissions> {
        let overrides = self.overrides().await?;
        Ok(resolver::detailed_permissions(
            self.state.role_table(),
            &self.user.role,
            overrides,
            resource,
        ))
    }

    pub async fn effective_permissions(&self) -> AppResult<EffectivePermissions> {
        let overrides = self.overrides().await?;
        Ok(resolver::effective_permissions(
            self.state.role_table(),
            &self.user.role,
            overrides,
        ))
    }

    pub fn is_reviewer(&self) -> bool {
        REVIEWER_ROLES.contains(&self.user.role.as_str())
    }

    /// Approval decisions: admin or finance manager
    pub async fn ensure_reviewer(&self) -> AppResult<()> {
        if self.is_reviewer() {
            return Ok(());
        }
        self.deny(json!({ "section": "approvals", "role": self.user.role, "required": REVIEWER_ROLES }))
            .await;
        Err(AppError::new(ErrorCode::ReviewerRequired))
    }

    pub async fn ensure_admin(&self) -> AppResult<()> {
        if self.user.is_admin() {
            return Ok(());
        }
        self.deny(json!({ "section": "users", "role": self.user.role, "required": "admin" }))
            .await;
        Err(AppError::new(ErrorCode::AdminRequired))
    }

    /// Best-effort audit entry attributed to this user and IP
    pub async fn audit(&self, event: AuditEvent) {
        match self.pool() {
            Ok(pool) => log_audit(pool, Some(self.user.id), Some(&self.ip), event).await,
            Err(_) => tracing::warn!(action = %event.action, "Audit skipped: no database"),
        }
    }

    async fn deny(&self, details: serde_json::Value) -> AppError {
        security_log!(
            "WARN",
            "permission_denied",
            user_id = self.user.id,
            role = self.user.role.clone(),
            details = details.to_string()
        );
        self.audit(AuditEvent::new(AuditAction::PermissionDenied).details(details))
            .await;
        AppError::forbidden("Permission denied")
    }
}

impl FromRequestParts<ServerState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let user =
            <CurrentUser as FromRequestParts<ServerState>>::from_request_parts(parts, state).await?;
        let ClientIp(ip) = ClientIp::from_parts(parts);
        Ok(Self::new(state.clone(), user, ip))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::core::Config;
    use crate::db::repository::testing as repo_testing;
    use crate::permissions::RoleTable;

    /// Context for a freshly inserted user with `role`, on `pool`
    pub async fn context_for(pool: &SqlitePool, role: &str) -> RequestContext {
        let email = format!("{role}-{}@gtd.local", uuid::Uuid::new_v4().simple());
        let id = repo_testing::insert_user(pool, &email, role).await;
        let state = ServerState::new(
            Config::for_testing(std::env::temp_dir()),
            Some(pool.clone()),
            RoleTable::builtin(),
        );
        let user = CurrentUser {
            id,
            name: role.to_string(),
            email,
            role: role.to_string(),
        };
        RequestContext::new(state, user, "203.0.113.9")
    }
}

#[cfg(test)]
mod tests {
    use super::testing::context_for;
    use super::*;
    use crate::db::repository::{audit_log, testing};
    use shared::models::AuditQuery;

    async fn context(role: &str) -> RequestContext {
        context_for(&testing::pool().await, role).await
    }

    #[tokio::test]
    async fn test_ensure_perm_allows_role_default() {
        let ctx = context("designer").await;
        ctx.ensure_perm("projects").await.unwrap();
        ctx.ensure_perm("tasks").await.unwrap();
    }

    #[tokio::test]
    async fn test_denial_is_forbidden_and_audited() {
        let ctx = context("viewer").await;
        let err = ctx.ensure_perm("projects").await.unwrap_err();
        assert_eq!(err.code.kind(), "FORBIDDEN");

        let pool = ctx.pool().unwrap();
        let (items, total) = audit_log::query(pool, &AuditQuery::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].action, "permission_denied");
        assert_eq!(items[0].user_id, Some(ctx.user.id));
        assert_eq!(items[0].ip_address.as_deref(), Some("203.0.113.9"));
        let details = items[0].details.as_ref().unwrap();
        assert_eq!(details["section"], "projects");
        assert_eq!(details["role"], "viewer");
    }

    #[tokio::test]
    async fn test_overrides_are_memoized_per_request() {
        let ctx = context("viewer").await;
        let pool = ctx.pool().unwrap().clone();
        let grant: PermissionOverrides = [("accounting".to_string(), true)].into_iter().collect();
        permission::save_overrides(&pool, ctx.user.id, &grant, ctx.user.id)
            .await
            .unwrap();

        ctx.ensure_perm("accounting").await.unwrap();

        // a change mid-request is not observed by this context
        permission::save_overrides(&pool, ctx.user.id, &PermissionOverrides::new(), ctx.user.id)
            .await
            .unwrap();
        ctx.ensure_perm("accounting").await.unwrap();

        // a fresh context sees it
        let next = RequestContext::new(ctx.state.clone(), ctx.user.clone(), "203.0.113.9");
        assert!(next.ensure_perm("accounting").await.is_err());
    }

    #[tokio::test]
    async fn test_reviewer_and_admin_gates() {
        let ctx = context("accountant").await;
        assert_eq!(
            ctx.ensure_reviewer().await.unwrap_err().code,
            ErrorCode::ReviewerRequired
        );
        assert_eq!(ctx.ensure_admin().await.unwrap_err().code, ErrorCode::AdminRequired);

        let finance = context("finance_manager").await;
        finance.ensure_reviewer().await.unwrap();
    }

    #[tokio::test]
    async fn test_modifiers_follow_overrides() {
        let ctx = context("accountant").await;
        assert!(!ctx.has_modifier("accounting", Modifier::AutoApprove).await.unwrap());
        assert!(ctx.require_modifier("accounting", Modifier::Delete).await.is_err());
    }
}
