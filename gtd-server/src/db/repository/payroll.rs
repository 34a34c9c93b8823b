//! Payroll Repository

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{Payroll, PayrollCreate, PayrollQuery};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COLUMNS: &str = "id, user_id, period, base_salary, allowances, bonus, deductions, net_salary, status, paid_date, notes, created_by, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool, query: &PayrollQuery) -> RepoResult<Vec<Payroll>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM payroll WHERE 1 = 1"));
    if let Some(user_id) = query.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(period) = &query.period {
        qb.push(" AND period = ").push_bind(period.clone());
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    qb.push(" ORDER BY period DESC, user_id");

    let rows = qb.build_query_as::<Payroll>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Payroll>> {
    let row = sqlx::query_as::<_, Payroll>(&format!("SELECT {COLUMNS} FROM payroll WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// One entry per user per period (`Duplicate` otherwise)
pub async fn create(
    pool: &SqlitePool,
    data: &PayrollCreate,
    created_by: i64,
) -> RepoResult<Payroll> {
    let now = now_millis();
    let id = sqlx::query(
        "INSERT INTO payroll (user_id, period, base_salary, allowances, bonus, deductions, net_salary, status, notes, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?, ?, ?)",
    )
    .bind(data.user_id)
    .bind(&data.period)
    .bind(data.base_salary)
    .bind(data.allowances.unwrap_or(0))
    .bind(data.bonus.unwrap_or(0))
    .bind(data.deductions.unwrap_or(0))
    .bind(data.net_salary())
    .bind(&data.notes)
    .bind(created_by)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create payroll".into()))
}

pub async fn mark_paid(pool: &SqlitePool, id: i64, paid_date: NaiveDate) -> RepoResult<Payroll> {
    let rows = sqlx::query(
        "UPDATE payroll SET status = 'paid', paid_date = ?, updated_at = ? WHERE id = ?",
    )
    .bind(paid_date)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Payroll {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Payroll {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM payroll WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;
    use shared::models::PayrollStatus;

    #[tokio::test]
    async fn test_one_entry_per_period() {
        let pool = testing::pool().await;
        let hr = testing::insert_user(&pool, "hr@gtd.test", "hr_manager").await;
        let employee = testing::insert_user(&pool, "e@gtd.test", "designer").await;
        let data = PayrollCreate {
            user_id: employee,
            period: "2024-07".into(),
            base_salary: 4_000,
            allowances: Some(250),
            bonus: None,
            deductions: Some(100),
            notes: None,
        };
        let entry = create(&pool, &data, hr).await.unwrap();
        assert_eq!(entry.net_salary, 4_150);
        assert_eq!(entry.status, PayrollStatus::Pending);

        let err = create(&pool, &data, hr).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        let paid = mark_paid(&pool, entry.id, NaiveDate::from_ymd_opt(2024, 7, 31).unwrap())
            .await
            .unwrap();
        assert_eq!(paid.status, PayrollStatus::Paid);
    }
}
