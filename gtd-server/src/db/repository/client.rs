//! Client Repository

use super::{RepoError, RepoResult, like_pattern};
use shared::models::{Client, ClientCreate, ClientQuery, ClientUpdate};
use shared::util::now_millis;
use sqlx::SqlitePool;

const COLUMNS: &str =
    "id, name, email, phone, company, address, notes, created_by, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool, query: &ClientQuery) -> RepoResult<Vec<Client>> {
    let clients = match query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(term) => {
            let pattern = like_pattern(term);
            sqlx::query_as::<_, Client>(&format!(
                "SELECT {COLUMNS} FROM clients WHERE name LIKE ?1 ESCAPE '\\' OR email LIKE ?1 ESCAPE '\\' OR phone LIKE ?1 ESCAPE '\\' ORDER BY name"
            ))
            .bind(pattern)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Client>(&format!("SELECT {COLUMNS} FROM clients ORDER BY name"))
                .fetch_all(pool)
                .await?
        }
    };
    Ok(clients)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Client>> {
    let client = sqlx::query_as::<_, Client>(&format!("SELECT {COLUMNS} FROM clients WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(client)
}

pub async fn create(pool: &SqlitePool, data: &ClientCreate, created_by: i64) -> RepoResult<Client> {
    let now = now_millis();
    let id = sqlx::query(
        "INSERT INTO clients (name, email, phone, company, address, notes, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.company)
    .bind(&data.address)
    .bind(&data.notes)
    .bind(created_by)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create client".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &ClientUpdate) -> RepoResult<Client> {
    let rows = sqlx::query(
        "UPDATE clients SET name = COALESCE(?1, name), email = COALESCE(?2, email), phone = COALESCE(?3, phone), company = COALESCE(?4, company), address = COALESCE(?5, address), notes = COALESCE(?6, notes), updated_at = ?7 WHERE id = ?8",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.company)
    .bind(&data.address)
    .bind(&data.notes)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Client {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Client {id} not found")))
}

pub async fn count_projects(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE client_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM clients WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;

    fn payload(name: &str, email: Option<&str>) -> ClientCreate {
        ClientCreate {
            name: name.into(),
            email: email.map(Into::into),
            phone: None,
            company: None,
            address: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_search_matches_name_or_email() {
        let pool = testing::pool().await;
        let user = testing::insert_user(&pool, "c@gtd.test", "admin").await;
        create(&pool, &payload("Villa Rosa", None), user).await.unwrap();
        create(&pool, &payload("Hotel Lumen", Some("rosa@lumen.test")), user)
            .await
            .unwrap();
        create(&pool, &payload("Office Park", None), user).await.unwrap();

        let query = ClientQuery {
            search: Some("rosa".into()),
        };
        let found = find_all(&pool, &query).await.unwrap();
        let names: Vec<_> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Hotel Lumen", "Villa Rosa"]);
    }

    #[tokio::test]
    async fn test_update_missing_client() {
        let pool = testing::pool().await;
        let err = update(&pool, 404, &ClientUpdate::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
