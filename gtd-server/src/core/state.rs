use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{JwtService, password};
use crate::core::{Config, Result};
use crate::db::DbService;
use crate::db::repository::user::{self, NewUser};
use crate::permissions::RoleTable;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Server state, cloned into every handler
///
/// | Field | Type | Meaning |
/// |-------|------|---------|
/// | config | Config | immutable configuration |
/// | db | Option<SqlitePool> | `None` when no database is configured |
/// | jwt_service | Arc<JwtService> | session token signing |
/// | role_table | Arc<RoleTable> | role defaults, loaded once |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: Option<SqlitePool>,
    pub jwt_service: Arc<JwtService>,
    pub role_table: Arc<RoleTable>,
}

impl ServerState {
    pub fn new(config: Config, db: Option<SqlitePool>, role_table: RoleTable) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            db,
            jwt_service,
            role_table: Arc::new(role_table),
        }
    }

    /// Build state from configuration
    ///
    /// 1. role table (`ROLE_TABLE_PATH` or built-in)
    /// 2. database + migrations (skipped when `DATABASE_URL` is empty)
    /// 3. upload directory
    /// 4. bootstrap admin on an empty user table
    pub async fn initialize(config: &Config) -> Result<Self> {
        let role_table = match &config.role_table_path {
            Some(path) => {
                let table = RoleTable::from_file(path)?;
                tracing::info!(path = %path.display(), "Loaded role table");
                table
            }
            None => RoleTable::builtin(),
        };

        let db = if config.database_url.trim().is_empty() {
            tracing::warn!("DATABASE_URL is empty, data procedures will fail");
            None
        } else {
            Some(DbService::new(&config.database_url).await?.pool)
        };

        tokio::fs::create_dir_all(&config.upload_dir).await?;

        let state = Self::new(config.clone(), db, role_table);
        if let Some(pool) = &state.db {
            bootstrap_admin(pool, config).await?;
        }
        Ok(state)
    }

    /// Database pool, or `DatabaseNotConfigured`
    pub fn pool(&self) -> AppResult<&SqlitePool> {
        self.db
            .as_ref()
            .ok_or_else(|| AppError::new(ErrorCode::DatabaseNotConfigured))
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    pub fn role_table(&self) -> &RoleTable {
        &self.role_table
    }
}

async fn bootstrap_admin(pool: &SqlitePool, config: &Config) -> Result<()> {
    let (Some(email), Some(pass)) = (
        config.bootstrap_admin_email.as_deref(),
        config.bootstrap_admin_password.as_deref(),
    ) else {
        return Ok(());
    };

    if user::count(pool).await.map_err(AppError::from)? > 0 {
        return Ok(());
    }

    let hash = password::hash_password(pass)
        .map_err(|e| crate::core::ServerError::Config(format!("Cannot hash admin password: {e}")))?;
    let admin = user::create(
        pool,
        NewUser {
            name: "Administrator",
            email,
            password_hash: &hash,
            role: "admin",
            phone: None,
            position: None,
        },
    )
    .await
    .map_err(AppError::from)?;

    tracing::info!(user_id = admin.id, email = %admin.email, "Bootstrap admin created");
    Ok(())
}
