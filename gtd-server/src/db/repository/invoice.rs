//! Invoice Repository
//!
//! Header and line items are always written together inside one transaction.

use super::{RepoError, RepoResult};
use shared::models::{
    Invoice, InvoiceCreate, InvoiceDetail, InvoiceItem, InvoiceItemInput, InvoiceQuery,
    InvoiceStatus, InvoiceTotals, InvoiceType, InvoiceUpdate,
};
use shared::util::now_millis;
use sqlx::{Connection, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, invoice_number, invoice_type, client_id, project_id, status, issue_date, due_date, subtotal, discount, tax, total, notes, created_by, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, invoice_id, description, quantity, unit_price, total, sort_order";

pub async fn find_all(pool: &SqlitePool, query: &InvoiceQuery) -> RepoResult<Vec<Invoice>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM invoices WHERE 1 = 1"));
    if let Some(client_id) = query.client_id {
        qb.push(" AND client_id = ").push_bind(client_id);
    }
    if let Some(project_id) = query.project_id {
        qb.push(" AND project_id = ").push_bind(project_id);
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(kind) = query.invoice_type {
        qb.push(" AND invoice_type = ").push_bind(kind);
    }
    qb.push(" ORDER BY issue_date DESC, id DESC");

    let invoices = qb.build_query_as::<Invoice>().fetch_all(pool).await?;
    Ok(invoices)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Invoice>>
{
    let invoice =
        sqlx::query_as::<_, Invoice>(&format!("SELECT {COLUMNS} FROM invoices WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(invoice)
}

pub async fn find_items(conn: &mut SqliteConnection, invoice_id: i64) -> RepoResult<Vec<InvoiceItem>>
{
    let items = sqlx::query_as::<_, InvoiceItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM invoice_items WHERE invoice_id = ? ORDER BY sort_order, id"
    ))
    .bind(invoice_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(items)
}

pub async fn find_detail(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<InvoiceDetail>>
{
    let Some(invoice) = find_by_id(&mut *conn, id).await? else {
        return Ok(None);
    };
    let items = find_items(&mut *conn, id).await?;
    Ok(Some(InvoiceDetail { invoice, items }))
}

/// Document number: `INV-YYYYMMDD-<seq>` or `QUO-YYYYMMDD-<seq>`
fn generate_number(kind: InvoiceType, issue_date: chrono::NaiveDate, seq: i64) -> String {
    let prefix = match kind {
        InvoiceType::Invoice => "INV",
        InvoiceType::Quotation => "QUO",
    };
    format!("{}-{}-{:04}", prefix, issue_date.format("%Y%m%d"), seq)
}

async fn insert_items(
    conn: &mut SqliteConnection,
    invoice_id: i64,
    items: &[InvoiceItemInput],
) -> RepoResult<()> {
    for (index, item) in items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO invoice_items (invoice_id, description, quantity, unit_price, total, sort_order) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(invoice_id)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.line_total())
        .bind(index as i64)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn create(
    pool: &SqlitePool,
    data: &InvoiceCreate,
    created_by: i64,
) -> RepoResult<InvoiceDetail> {
    let kind = data.invoice_type.unwrap_or(InvoiceType::Invoice);
    let totals = InvoiceTotals::compute(
        &data.items,
        data.discount.unwrap_or(0),
        data.tax.unwrap_or(0),
    );
    let now = now_millis();

    let mut tx = pool.begin().await?;

    if let Some(number) = &data.invoice_number {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM invoices WHERE invoice_number = ?)")
                .bind(number)
                .fetch_one(&mut *tx)
                .await?;
        if taken {
            return Err(RepoError::Duplicate(format!(
                "Invoice number '{number}' already exists"
            )));
        }
    }

    // Placeholder number keeps the UNIQUE column satisfied until the id is known
    let placeholder = format!("pending-{now}-{created_by}");
    let id = sqlx::query(
        "INSERT INTO invoices (invoice_number, invoice_type, client_id, project_id, status, issue_date, due_date, subtotal, discount, tax, total, notes, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(data.invoice_number.as_deref().unwrap_or(&placeholder))
    .bind(kind)
    .bind(data.client_id)
    .bind(data.project_id)
    .bind(data.status.unwrap_or(InvoiceStatus::Draft))
    .bind(data.issue_date)
    .bind(data.due_date)
    .bind(totals.subtotal)
    .bind(totals.discount)
    .bind(totals.tax)
    .bind(totals.total)
    .bind(&data.notes)
    .bind(created_by)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    if data.invoice_number.is_none() {
        sqlx::query("UPDATE invoices SET invoice_number = ? WHERE id = ?")
            .bind(generate_number(kind, data.issue_date, id))
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    insert_items(&mut tx, id, &data.items).await?;
    tx.commit().await?;

    find_detail(&mut *pool.acquire().await?, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create invoice".into()))
}

/// Update header fields; `items` replaces all lines and recomputes totals.
///
/// Runs on its own transaction, or on a savepoint when `db` is already inside one.
pub async fn update(conn: &mut SqliteConnection, id: i64, data: &InvoiceUpdate) -> RepoResult<InvoiceDetail>
{
    let current = find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Invoice {id} not found")))?;

    let discount = data.discount.unwrap_or(current.discount);
    let tax = data.tax.unwrap_or(current.tax);
    let totals = match &data.items {
        Some(items) => InvoiceTotals::compute(items, discount, tax),
        None => {
            let total = current.subtotal.saturating_sub(discount).saturating_add(tax).max(0);
            InvoiceTotals {
                subtotal: current.subtotal,
                discount,
                tax,
                total,
            }
        }
    };

    let mut tx = Connection::begin(&mut *conn).await?;
    sqlx::query(
        "UPDATE invoices SET client_id = COALESCE(?1, client_id), project_id = COALESCE(?2, project_id), issue_date = COALESCE(?3, issue_date), due_date = COALESCE(?4, due_date), notes = COALESCE(?5, notes), subtotal = ?6, discount = ?7, tax = ?8, total = ?9, updated_at = ?10 WHERE id = ?11",
    )
    .bind(data.client_id)
    .bind(data.project_id)
    .bind(data.issue_date)
    .bind(data.due_date)
    .bind(&data.notes)
    .bind(totals.subtotal)
    .bind(totals.discount)
    .bind(totals.tax)
    .bind(totals.total)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if let Some(items) = &data.items {
        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, id, items).await?;
    }
    tx.commit().await?;

    find_detail(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Invoice {id} not found")))
}

pub async fn update_status(
    pool: &SqlitePool,
    id: i64,
    status: InvoiceStatus,
) -> RepoResult<Invoice> {
    let rows = sqlx::query("UPDATE invoices SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Invoice {id} not found")));
    }
    find_by_id(&mut *pool.acquire().await?, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Invoice {id} not found")))
}

/// Turn a quotation into a draft invoice with a fresh `INV-` number
pub async fn convert_to_invoice(pool: &SqlitePool, id: i64) -> RepoResult<InvoiceDetail> {
    let current = find_by_id(&mut *pool.acquire().await?, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Invoice {id} not found")))?;
    if current.invoice_type != InvoiceType::Quotation {
        return Err(RepoError::Validation(format!(
            "Invoice {} is not a quotation",
            current.invoice_number
        )));
    }

    sqlx::query(
        "UPDATE invoices SET invoice_type = ?, status = ?, invoice_number = ?, updated_at = ? WHERE id = ?",
    )
    .bind(InvoiceType::Invoice)
    .bind(InvoiceStatus::Draft)
    .bind(generate_number(InvoiceType::Invoice, current.issue_date, id))
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    find_detail(&mut *pool.acquire().await?, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Invoice {id} not found")))
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool>
{
    let rows = sqlx::query("DELETE FROM invoices WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}
