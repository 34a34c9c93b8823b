//! Project Repository

use super::{RepoError, RepoResult, like_pattern};
use shared::models::{
    Project, ProjectCreate, ProjectMember, ProjectQuery, ProjectStatus, ProjectUpdate,
};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COLUMNS: &str = "p.id, p.client_id, p.name, p.description, p.status, p.budget, p.location, p.start_date, p.end_date, p.manager_id, p.created_by, p.created_at, p.updated_at";

/// List projects; `member_id` restricts to projects the user manages or belongs to
pub async fn find_all(
    pool: &SqlitePool,
    query: &ProjectQuery,
    member_id: Option<i64>,
) -> RepoResult<Vec<Project>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM projects p WHERE 1 = 1"));
    if let Some(client_id) = query.client_id {
        qb.push(" AND p.client_id = ").push_bind(client_id);
    }
    if let Some(status) = query.status {
        qb.push(" AND p.status = ").push_bind(status);
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        qb.push(" AND p.name LIKE ")
            .push_bind(like_pattern(search))
            .push(" ESCAPE '\\'");
    }
    if let Some(user_id) = member_id {
        qb.push(" AND (p.manager_id = ")
            .push_bind(user_id)
            .push(" OR EXISTS (SELECT 1 FROM project_members m WHERE m.project_id = p.id AND m.user_id = ")
            .push_bind(user_id)
            .push("))");
    }
    qb.push(" ORDER BY p.created_at DESC, p.id DESC");

    let projects = qb.build_query_as::<Project>().fetch_all(pool).await?;
    Ok(projects)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Project>> {
    let project =
        sqlx::query_as::<_, Project>(&format!("SELECT {COLUMNS} FROM projects p WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(project)
}

pub async fn create(
    pool: &SqlitePool,
    data: &ProjectCreate,
    created_by: i64,
) -> RepoResult<Project> {
    let now = now_millis();
    let id = sqlx::query(
        "INSERT INTO projects (client_id, name, description, status, budget, location, start_date, end_date, manager_id, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(data.client_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.status.unwrap_or(ProjectStatus::Planning))
    .bind(data.budget)
    .bind(&data.location)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(data.manager_id)
    .bind(created_by)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create project".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &ProjectUpdate) -> RepoResult<Project> {
    let rows = sqlx::query(
        "UPDATE projects SET client_id = COALESCE(?1, client_id), name = COALESCE(?2, name), description = COALESCE(?3, description), status = COALESCE(?4, status), budget = COALESCE(?5, budget), location = COALESCE(?6, location), start_date = COALESCE(?7, start_date), end_date = COALESCE(?8, end_date), manager_id = COALESCE(?9, manager_id), updated_at = ?10 WHERE id = ?11",
    )
    .bind(data.client_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.status)
    .bind(data.budget)
    .bind(&data.location)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(data.manager_id)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Project {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Project {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

// ==================== Members ====================

pub async fn members(pool: &SqlitePool, project_id: i64) -> RepoResult<Vec<ProjectMember>> {
    let rows = sqlx::query_as::<_, ProjectMember>(
        "SELECT m.project_id, m.user_id, u.name AS user_name, m.role_in_project, m.added_at FROM project_members m JOIN users u ON u.id = m.user_id WHERE m.project_id = ? ORDER BY u.name",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Add or re-label a member
pub async fn add_member(
    pool: &SqlitePool,
    project_id: i64,
    user_id: i64,
    role_in_project: Option<&str>,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO project_members (project_id, user_id, role_in_project, added_at) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(project_id, user_id) DO UPDATE SET role_in_project = ?3",
    )
    .bind(project_id)
    .bind(user_id)
    .bind(role_in_project)
    .bind(now_millis())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn remove_member(pool: &SqlitePool, project_id: i64, user_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM project_members WHERE project_id = ? AND user_id = ?")
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Manager or member of the project
pub async fn is_assigned(pool: &SqlitePool, project_id: i64, user_id: i64) -> RepoResult<bool> {
    let assigned = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM projects WHERE id = ?1 AND manager_id = ?2) OR EXISTS (SELECT 1 FROM project_members WHERE project_id = ?1 AND user_id = ?2)",
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(assigned)
}
