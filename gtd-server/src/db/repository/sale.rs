//! Sale Repository

use super::{RepoError, RepoResult};
use shared::models::{Sale, SaleCreate, SaleQuery, SaleStatus, SaleUpdate};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, client_id, project_id, invoice_id, description, amount, sale_date, status, created_by, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool, query: &SaleQuery) -> RepoResult<Vec<Sale>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM sales WHERE 1 = 1"));
    if let Some(client_id) = query.client_id {
        qb.push(" AND client_id = ").push_bind(client_id);
    }
    if let Some(project_id) = query.project_id {
        qb.push(" AND project_id = ").push_bind(project_id);
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    match query.manual {
        Some(true) => {
            qb.push(" AND invoice_id IS NULL");
        }
        Some(false) => {
            qb.push(" AND invoice_id IS NOT NULL");
        }
        None => {}
    }
    qb.push(" ORDER BY sale_date DESC, id DESC");

    let rows = qb.build_query_as::<Sale>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Sale>>
{
    let row = sqlx::query_as::<_, Sale>(&format!("SELECT {COLUMNS} FROM sales WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn create(conn: &mut SqliteConnection, data: &SaleCreate, created_by: i64) -> RepoResult<Sale>
{
    let now = now_millis();
    let id = sqlx::query(
        "INSERT INTO sales (client_id, project_id, invoice_id, description, amount, sale_date, status, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(data.client_id)
    .bind(data.project_id)
    .bind(data.invoice_id)
    .bind(&data.description)
    .bind(data.amount)
    .bind(data.sale_date)
    .bind(data.status.unwrap_or(SaleStatus::Pending))
    .bind(created_by)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create sale".into()))
}

pub async fn update(conn: &mut SqliteConnection, id: i64, data: &SaleUpdate) -> RepoResult<Sale>
{
    let rows = sqlx::query(
        "UPDATE sales SET client_id = COALESCE(?1, client_id), project_id = COALESCE(?2, project_id), invoice_id = COALESCE(?3, invoice_id), description = COALESCE(?4, description), amount = COALESCE(?5, amount), sale_date = COALESCE(?6, sale_date), status = COALESCE(?7, status), updated_at = ?8 WHERE id = ?9",
    )
    .bind(data.client_id)
    .bind(data.project_id)
    .bind(data.invoice_id)
    .bind(&data.description)
    .bind(data.amount)
    .bind(data.sale_date)
    .bind(data.status)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Sale {id} not found")));
    }
    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Sale {id} not found")))
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool>
{
    let rows = sqlx::query("DELETE FROM sales WHERE id = ?")
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
    async fn test_manual_filter() {
        let pool = testing::pool().await;
        let user = testing::insert_user(&pool, "s@gtd.test", "sales_manager").await;
        let invoice = sqlx::query(
            "INSERT INTO invoices (invoice_number, issue_date, created_at, updated_at) VALUES ('INV-1', '2024-01-01', 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap()
        .last_insert_rowid();

        let manual = SaleCreate {
            client_id: None,
            project_id: None,
            invoice_id: None,
            description: "Showroom chair".into(),
            amount: 400,
            sale_date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            status: Some(SaleStatus::Completed),
        };
        create(&mut *pool.acquire().await.unwrap(), &manual, user).await.unwrap();
        create(
            &mut *pool.acquire().await.unwrap(),
            &SaleCreate {
                invoice_id: Some(invoice),
                ..manual.clone()
            },
            user,
        )
        .await
        .unwrap();

        let query = SaleQuery {
            manual: Some(true),
            ..Default::default()
        };
        let found = find_all(&pool, &query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].is_manual());
    }
}
