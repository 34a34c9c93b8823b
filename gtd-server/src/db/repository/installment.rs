//! Installment Repository

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{
    Installment, InstallmentCreate, InstallmentQuery, InstallmentStatus, InstallmentUpdate,
};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, project_id, invoice_id, description, amount, due_date, paid_date, status, created_by, created_at, updated_at";

pub async fn find_all(
    pool: &SqlitePool,
    query: &InstallmentQuery,
) -> RepoResult<Vec<Installment>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM installments WHERE 1 = 1"));
    if let Some(project_id) = query.project_id {
        qb.push(" AND project_id = ").push_bind(project_id);
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    qb.push(" ORDER BY due_date, id");

    let rows = qb.build_query_as::<Installment>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Installment>>
{
    let row = sqlx::query_as::<_, Installment>(&format!(
        "SELECT {COLUMNS} FROM installments WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

pub async fn create(conn: &mut SqliteConnection, data: &InstallmentCreate, created_by: i64) -> RepoResult<Installment>
{
    let now = now_millis();
    let id = sqlx::query(
        "INSERT INTO installments (project_id, invoice_id, description, amount, due_date, status, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(data.project_id)
    .bind(data.invoice_id)
    .bind(&data.description)
    .bind(data.amount)
    .bind(data.due_date)
    .bind(data.status.unwrap_or(InstallmentStatus::Pending))
    .bind(created_by)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create installment".into()))
}

pub async fn update(conn: &mut SqliteConnection, id: i64, data: &InstallmentUpdate) -> RepoResult<Installment>
{
    let rows = sqlx::query(
        "UPDATE installments SET invoice_id = COALESCE(?1, invoice_id), description = COALESCE(?2, description), amount = COALESCE(?3, amount), due_date = COALESCE(?4, due_date), status = COALESCE(?5, status), updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.invoice_id)
    .bind(&data.description)
    .bind(data.amount)
    .bind(data.due_date)
    .bind(data.status)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Installment {id} not found")));
    }
    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Installment {id} not found")))
}

/// Mark paid; only an unpaid installment can transition
pub async fn mark_paid(
    pool: &SqlitePool,
    id: i64,
    paid_date: NaiveDate,
) -> RepoResult<Installment> {
    let rows = sqlx::query(
        "UPDATE installments SET status = 'paid', paid_date = ?, updated_at = ? WHERE id = ? AND status != 'paid'",
    )
    .bind(paid_date)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return match find_by_id(&mut *pool.acquire().await?, id).await? {
            Some(_) => Err(RepoError::Validation(format!(
                "Installment {id} is already paid"
            ))),
            None => Err(RepoError::NotFound(format!("Installment {id} not found"))),
        };
    }
    find_by_id(&mut *pool.acquire().await?, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Installment {id} not found")))
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool>
{
    let rows = sqlx::query("DELETE FROM installments WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;

    #[tokio::test]
    async fn test_mark_paid_once() {
        let pool = testing::pool().await;
        let user = testing::insert_user(&pool, "f@gtd.test", "finance_manager").await;
        let project = sqlx::query(
            "INSERT INTO projects (name, created_at, updated_at) VALUES ('Villa', 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap()
        .last_insert_rowid();

        let data = InstallmentCreate {
            project_id: project,
            invoice_id: None,
            description: Some("Deposit".into()),
            amount: 5_000,
            due_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            status: None,
        };
        let created = create(&mut *pool.acquire().await.unwrap(), &data, user).await.unwrap();
        assert_eq!(created.status, InstallmentStatus::Pending);
        assert!(created.paid_date.is_none());

        let paid_on = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
        let paid = mark_paid(&pool, created.id, paid_on).await.unwrap();
        assert_eq!(paid.status, InstallmentStatus::Paid);
        assert_eq!(paid.paid_date, Some(paid_on));

        let err = mark_paid(&pool, created.id, paid_on).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        let err = mark_paid(&pool, 999, paid_on).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
