//! Expense Repository

use super::{RepoError, RepoResult};
use shared::models::{Expense, ExpenseCreate, ExpenseQuery, ExpenseStatus, ExpenseUpdate};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, project_id, category, description, amount, expense_date, status, vendor, receipt_url, created_by, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool, query: &ExpenseQuery) -> RepoResult<Vec<Expense>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM expenses WHERE 1 = 1"));
    if let Some(project_id) = query.project_id {
        qb.push(" AND project_id = ").push_bind(project_id);
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(category) = &query.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(from) = query.from {
        qb.push(" AND expense_date >= ").push_bind(from);
    }
    if let Some(to) = query.to {
        qb.push(" AND expense_date <= ").push_bind(to);
    }
    qb.push(" ORDER BY expense_date DESC, id DESC");

    let expenses = qb.build_query_as::<Expense>().fetch_all(pool).await?;
    Ok(expenses)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Expense>>
{
    let expense =
        sqlx::query_as::<_, Expense>(&format!("SELECT {COLUMNS} FROM expenses WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(expense)
}

pub async fn create(conn: &mut SqliteConnection, data: &ExpenseCreate, created_by: i64) -> RepoResult<Expense>
{
    let now = now_millis();
    let id = sqlx::query(
        "INSERT INTO expenses (project_id, category, description, amount, expense_date, status, vendor, receipt_url, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(data.project_id)
    .bind(&data.category)
    .bind(&data.description)
    .bind(data.amount)
    .bind(data.expense_date)
    .bind(data.status.unwrap_or(ExpenseStatus::Pending))
    .bind(&data.vendor)
    .bind(&data.receipt_url)
    .bind(created_by)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create expense".into()))
}

pub async fn update(conn: &mut SqliteConnection, id: i64, data: &ExpenseUpdate) -> RepoResult<Expense>
{
    let rows = sqlx::query(
        "UPDATE expenses SET project_id = COALESCE(?1, project_id), category = COALESCE(?2, category), description = COALESCE(?3, description), amount = COALESCE(?4, amount), expense_date = COALESCE(?5, expense_date), status = COALESCE(?6, status), vendor = COALESCE(?7, vendor), receipt_url = COALESCE(?8, receipt_url), updated_at = ?9 WHERE id = ?10",
    )
    .bind(data.project_id)
    .bind(&data.category)
    .bind(&data.description)
    .bind(data.amount)
    .bind(data.expense_date)
    .bind(data.status)
    .bind(&data.vendor)
    .bind(&data.receipt_url)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Expense {id} not found")));
    }
    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Expense {id} not found")))
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool>
{
    let rows = sqlx::query("DELETE FROM expenses WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}
