//! Purchase Repository

use super::{RepoError, RepoResult};
use shared::models::{Purchase, PurchaseCreate, PurchaseQuery, PurchaseStatus, PurchaseUpdate};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, project_id, supplier, description, amount, purchase_date, status, created_by, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool, query: &PurchaseQuery) -> RepoResult<Vec<Purchase>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM purchases WHERE 1 = 1"));
    if let Some(project_id) = query.project_id {
        qb.push(" AND project_id = ").push_bind(project_id);
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    qb.push(" ORDER BY purchase_date DESC, id DESC");

    let rows = qb.build_query_as::<Purchase>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Purchase>>
{
    let row =
        sqlx::query_as::<_, Purchase>(&format!("SELECT {COLUMNS} FROM purchases WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(row)
}

pub async fn create(conn: &mut SqliteConnection, data: &PurchaseCreate, created_by: i64) -> RepoResult<Purchase>
{
    let now = now_millis();
    let id = sqlx::query(
        "INSERT INTO purchases (project_id, supplier, description, amount, purchase_date, status, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(data.project_id)
    .bind(&data.supplier)
    .bind(&data.description)
    .bind(data.amount)
    .bind(data.purchase_date)
    .bind(data.status.unwrap_or(PurchaseStatus::Pending))
    .bind(created_by)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create purchase".into()))
}

pub async fn update(conn: &mut SqliteConnection, id: i64, data: &PurchaseUpdate) -> RepoResult<Purchase>
{
    let rows = sqlx::query(
        "UPDATE purchases SET project_id = COALESCE(?1, project_id), supplier = COALESCE(?2, supplier), description = COALESCE(?3, description), amount = COALESCE(?4, amount), purchase_date = COALESCE(?5, purchase_date), status = COALESCE(?6, status), updated_at = ?7 WHERE id = ?8",
    )
    .bind(data.project_id)
    .bind(&data.supplier)
    .bind(&data.description)
    .bind(data.amount)
    .bind(data.purchase_date)
    .bind(data.status)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Purchase {id} not found")));
    }
    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Purchase {id} not found")))
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool>
{
    let rows = sqlx::query("DELETE FROM purchases WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_create_and_filter_by_status() {
        let pool = testing::pool().await;
        let user = testing::insert_user(&pool, "p@gtd.test", "finance_manager").await;
        let base = PurchaseCreate {
            project_id: None,
            supplier: "Stone & Co".into(),
            description: None,
            amount: 1_200,
            purchase_date: NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(),
            status: None,
        };
        create(&mut *pool.acquire().await.unwrap(), &base, user).await.unwrap();
        create(
            &mut *pool.acquire().await.unwrap(),
            &PurchaseCreate {
                status: Some(PurchaseStatus::Received),
                ..base.clone()
            },
            user,
        )
        .await
        .unwrap();

        let query = PurchaseQuery {
            status: Some(PurchaseStatus::Received),
            ..Default::default()
        };
        assert_eq!(find_all(&pool, &query).await.unwrap().len(), 1);
        assert_eq!(find_all(&pool, &PurchaseQuery::default()).await.unwrap().len(), 2);
    }
}
