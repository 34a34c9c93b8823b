//! Task Repository

use super::{RepoError, RepoResult};
use shared::models::{Task, TaskCreate, TaskPriority, TaskQuery, TaskStatus, TaskUpdate};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COLUMNS: &str = "id, project_id, title, description, status, priority, assigned_to, start_date, end_date, progress, created_by, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool, query: &TaskQuery) -> RepoResult<Vec<Task>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM tasks WHERE 1 = 1"));
    if let Some(project_id) = query.project_id {
        qb.push(" AND project_id = ").push_bind(project_id);
    }
    if let Some(assigned_to) = query.assigned_to {
        qb.push(" AND assigned_to = ").push_bind(assigned_to);
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    // Gantt order: undated tasks last
    qb.push(" ORDER BY start_date IS NULL, start_date, id");

    let tasks = qb.build_query_as::<Task>().fetch_all(pool).await?;
    Ok(tasks)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Task>> {
    let task = sqlx::query_as::<_, Task>(&format!("SELECT {COLUMNS} FROM tasks WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(task)
}

pub async fn create(pool: &SqlitePool, data: &TaskCreate, created_by: i64) -> RepoResult<Task> {
    let now = now_millis();
    let id = sqlx::query(
        "INSERT INTO tasks (project_id, title, description, status, priority, assigned_to, start_date, end_date, progress, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(data.project_id)
    .bind(&data.title)
    .bind(&data.description)
    .bind(data.status.unwrap_or(TaskStatus::Todo))
    .bind(data.priority.unwrap_or(TaskPriority::Medium))
    .bind(data.assigned_to)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(data.progress.unwrap_or(0))
    .bind(created_by)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create task".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &TaskUpdate) -> RepoResult<Task> {
    let rows = sqlx::query(
        "UPDATE tasks SET title = COALESCE(?1, title), description = COALESCE(?2, description), status = COALESCE(?3, status), priority = COALESCE(?4, priority), assigned_to = COALESCE(?5, assigned_to), start_date = COALESCE(?6, start_date), end_date = COALESCE(?7, end_date), progress = COALESCE(?8, progress), updated_at = ?9 WHERE id = ?10",
    )
    .bind(&data.title)
    .bind(&data.description)
    .bind(data.status)
    .bind(data.priority)
    .bind(data.assigned_to)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(data.progress)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Task {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Task {id} not found")))
}

/// Status change; `done` also pins progress to 100
pub async fn update_status(pool: &SqlitePool, id: i64, status: TaskStatus) -> RepoResult<Task> {
    let rows = sqlx::query(
        "UPDATE tasks SET status = ?1, progress = CASE WHEN ?1 = 'done' THEN 100 ELSE progress END, updated_at = ?2 WHERE id = ?3",
    )
    .bind(status)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Task {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Task {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
