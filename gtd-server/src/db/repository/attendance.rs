//! Attendance Repository

use super::{RepoError, RepoResult};
use shared::models::{Attendance, AttendanceQuery, AttendanceRecord};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COLUMNS: &str = "id, user_id, date, check_in, check_out, status, notes, recorded_by, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool, query: &AttendanceQuery) -> RepoResult<Vec<Attendance>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM attendance WHERE 1 = 1"));
    if let Some(user_id) = query.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(from) = query.from {
        qb.push(" AND date >= ").push_bind(from);
    }
    if let Some(to) = query.to {
        qb.push(" AND date <= ").push_bind(to);
    }
    qb.push(" ORDER BY date DESC, user_id");

    let rows = qb.build_query_as::<Attendance>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Attendance>> {
    let row =
        sqlx::query_as::<_, Attendance>(&format!("SELECT {COLUMNS} FROM attendance WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row)
}

/// Insert or overwrite the record for (user, date)
pub async fn upsert(
    pool: &SqlitePool,
    data: &AttendanceRecord,
    recorded_by: i64,
) -> RepoResult<Attendance> {
    let now = now_millis();
    sqlx::query(
        "INSERT INTO attendance (user_id, date, check_in, check_out, status, notes, recorded_by, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8) \
         ON CONFLICT(user_id, date) DO UPDATE SET check_in = ?3, check_out = ?4, status = ?5, notes = ?6, recorded_by = ?7, updated_at = ?8",
    )
    .bind(data.user_id)
    .bind(data.date)
    .bind(&data.check_in)
    .bind(&data.check_out)
    .bind(data.status)
    .bind(&data.notes)
    .bind(recorded_by)
    .bind(now)
    .execute(pool)
    .await?;

    let row = sqlx::query_as::<_, Attendance>(&format!(
        "SELECT {COLUMNS} FROM attendance WHERE user_id = ? AND date = ?"
    ))
    .bind(data.user_id)
    .bind(data.date)
    .fetch_optional(pool)
    .await?;
    row.ok_or_else(|| RepoError::Database("Failed to record attendance".into()))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM attendance WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;
    use chrono::NaiveDate;
    use shared::models::AttendanceStatus;

    #[tokio::test]
    async fn test_upsert_one_row_per_day() {
        let pool = testing::pool().await;
        let hr = testing::insert_user(&pool, "hr@gtd.test", "hr_manager").await;
        let worker = testing::insert_user(&pool, "w@gtd.test", "site_engineer").await;
        let mut record = AttendanceRecord {
            user_id: worker,
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            check_in: Some("09:12".into()),
            check_out: None,
            status: AttendanceStatus::Late,
            notes: None,
        };
        let first = upsert(&pool, &record, hr).await.unwrap();

        record.check_out = Some("17:30".into());
        record.status = AttendanceStatus::Present;
        let second = upsert(&pool, &record, hr).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, AttendanceStatus::Present);
        assert_eq!(second.check_out.as_deref(), Some("17:30"));
        let all = find_all(&pool, &AttendanceQuery::default()).await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
