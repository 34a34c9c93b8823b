//! User Repository

use super::{RepoError, RepoResult, like_pattern};
use shared::models::{User, UserQuery, UserUpdate};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COLUMNS: &str =
    "id, name, email, role, phone, position, is_active, last_login_at, created_at, updated_at";

/// Login lookup row
#[derive(Debug, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub password_hash: String,
    pub is_active: bool,
}

pub async fn find_all(pool: &SqlitePool, query: &UserQuery) -> RepoResult<Vec<User>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM users WHERE 1 = 1"));
    if !query.include_inactive.unwrap_or(false) {
        qb.push(" AND is_active = 1");
    }
    if let Some(role) = &query.role {
        qb.push(" AND role = ").push_bind(role.clone());
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search.trim());
        qb.push(" AND (name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR email LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
    qb.push(" ORDER BY name");

    let users = qb.build_query_as::<User>().fetch_all(pool).await?;
    Ok(users)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_credentials(
    pool: &SqlitePool,
    email: &str,
) -> RepoResult<Option<UserCredentials>> {
    let row = sqlx::query_as::<_, UserCredentials>(
        "SELECT id, password_hash, is_active FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Active user ids holding any of `roles`
pub async fn find_ids_by_roles(pool: &SqlitePool, roles: &[&str]) -> RepoResult<Vec<i64>> {
    if roles.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT id FROM users WHERE is_active = 1 AND role IN (");
    let mut separated = qb.separated(", ");
    for role in roles {
        separated.push_bind(role.to_string());
    }
    separated.push_unseparated(") ORDER BY id");

    let ids = qb.build_query_scalar::<i64>().fetch_all(pool).await?;
    Ok(ids)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub phone: Option<&'a str>,
    pub position: Option<&'a str>,
}

pub async fn create(pool: &SqlitePool, data: NewUser<'_>) -> RepoResult<User> {
    if find_by_email(pool, data.email).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Email '{}' already exists",
            data.email
        )));
    }

    let now = now_millis();
    let id = sqlx::query(
        "INSERT INTO users (name, email, password_hash, role, phone, position, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(data.name)
    .bind(data.email)
    .bind(data.password_hash)
    .bind(data.role)
    .bind(data.phone)
    .bind(data.position)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Update profile fields; `password_hash` replaces the stored hash when given
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &UserUpdate,
    password_hash: Option<&str>,
) -> RepoResult<User> {
    if let Some(email) = &data.email
        && let Some(other) = find_by_email(pool, email).await?
        && other.id != id
    {
        return Err(RepoError::Duplicate(format!("Email '{}' already exists", email)));
    }

    let rows = sqlx::query(
        "UPDATE users SET name = COALESCE(?1, name), email = COALESCE(?2, email), password_hash = COALESCE(?3, password_hash), phone = COALESCE(?4, phone), position = COALESCE(?5, position), updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(password_hash)
    .bind(&data.phone)
    .bind(&data.position)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn update_role(pool: &SqlitePool, id: i64, role: &str) -> RepoResult<User> {
    let rows = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
        .bind(role)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn set_active(pool: &SqlitePool, id: i64, is_active: bool) -> RepoResult<User> {
    let rows = sqlx::query("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?")
        .bind(is_active)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn touch_last_login(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;

    fn new_user<'a>(email: &'a str, role: &'a str) -> NewUser<'a> {
        NewUser {
            name: "Test",
            email,
            password_hash: "hash",
            role,
            phone: None,
            position: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let pool = testing::pool().await;
        create(&pool, new_user("a@gtd.test", "designer")).await.unwrap();
        let err = create(&pool, new_user("a@gtd.test", "viewer")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_find_ids_by_roles_skips_inactive() {
        let pool = testing::pool().await;
        let admin = create(&pool, new_user("admin@gtd.test", "admin")).await.unwrap();
        let hr = create(&pool, new_user("hr@gtd.test", "hr_manager")).await.unwrap();
        let other_hr = create(&pool, new_user("hr2@gtd.test", "hr_manager")).await.unwrap();
        create(&pool, new_user("d@gtd.test", "designer")).await.unwrap();
        set_active(&pool, other_hr.id, false).await.unwrap();

        let ids = find_ids_by_roles(&pool, &["admin", "hr_manager"]).await.unwrap();
        assert_eq!(ids, vec![admin.id, hr.id]);
        assert!(find_ids_by_roles(&pool, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_unset_fields() {
        let pool = testing::pool().await;
        let user = create(&pool, new_user("keep@gtd.test", "designer")).await.unwrap();
        let update_data = UserUpdate {
            phone: Some("555-0101".into()),
            ..Default::default()
        };
        let updated = update(&pool, user.id, &update_data, None).await.unwrap();
        assert_eq!(updated.email, "keep@gtd.test");
        assert_eq!(updated.phone.as_deref(), Some("555-0101"));
    }
}
