//! BOQ (Bill of Quantities) Repository

use super::{RepoError, RepoResult};
use shared::models::{BoqItem, BoqItemCreate, BoqItemUpdate, BoqSectionTotal, BoqTotal};
use shared::util::now_millis;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, project_id, section, description, unit, quantity, unit_price, total, sort_order, created_at, updated_at";

pub async fn find_by_project(pool: &SqlitePool, project_id: i64) -> RepoResult<Vec<BoqItem>> {
    let items = sqlx::query_as::<_, BoqItem>(&format!(
        "SELECT {COLUMNS} FROM boq_items WHERE project_id = ? ORDER BY section, sort_order, id"
    ))
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<BoqItem>> {
    let item =
        sqlx::query_as::<_, BoqItem>(&format!("SELECT {COLUMNS} FROM boq_items WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(item)
}

pub async fn create(pool: &SqlitePool, data: &BoqItemCreate) -> RepoResult<BoqItem> {
    let now = now_millis();
    let id = sqlx::query(
        "INSERT INTO boq_items (project_id, section, description, unit, quantity, unit_price, total, sort_order, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(data.project_id)
    .bind(&data.section)
    .bind(&data.description)
    .bind(&data.unit)
    .bind(data.quantity)
    .bind(data.unit_price)
    .bind(data.quantity.saturating_mul(data.unit_price))
    .bind(data.sort_order.unwrap_or(0))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create BOQ item".into()))
}

/// Partial update; line total follows quantity and unit price
pub async fn update(pool: &SqlitePool, id: i64, data: &BoqItemUpdate) -> RepoResult<BoqItem> {
    let rows = sqlx::query(
        "UPDATE boq_items SET section = COALESCE(?1, section), description = COALESCE(?2, description), unit = COALESCE(?3, unit), quantity = COALESCE(?4, quantity), unit_price = COALESCE(?5, unit_price), total = COALESCE(?4, quantity) * COALESCE(?5, unit_price), sort_order = COALESCE(?6, sort_order), updated_at = ?7 WHERE id = ?8",
    )
    .bind(&data.section)
    .bind(&data.description)
    .bind(&data.unit)
    .bind(data.quantity)
    .bind(data.unit_price)
    .bind(data.sort_order)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("BOQ item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("BOQ item {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM boq_items WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Section subtotals and grand total for a project
pub async fn total(pool: &SqlitePool, project_id: i64) -> RepoResult<BoqTotal> {
    let sections = sqlx::query_as::<_, BoqSectionTotal>(
        "SELECT section, COALESCE(SUM(total), 0) AS total FROM boq_items WHERE project_id = ? GROUP BY section ORDER BY section",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    let total = sections.iter().map(|s| s.total).sum();
    Ok(BoqTotal {
        project_id,
        sections,
        total,
    })
}
