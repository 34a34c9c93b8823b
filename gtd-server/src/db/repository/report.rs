//! Report Source Rows
//!
//! Loads the dated amounts the reports aggregator works on. Only the date
//! range and the client/project scope are applied here; status rules live in
//! `services::reports` so summary, timeseries and breakdown share them.

use super::RepoResult;
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// One dated amount from any financial table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub amount: i64,
    pub status: String,
    /// Sales only: linked to an invoice
    pub linked: bool,
}

/// Scope shared by every source table
#[derive(Debug, Clone, Copy)]
pub struct ReportScope {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub client_id: Option<i64>,
    pub project_id: Option<i64>,
}

/// Rows per source table
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    pub invoices: Vec<ReportRow>,
    pub expenses: Vec<ReportRow>,
    pub installments: Vec<ReportRow>,
    pub purchases: Vec<ReportRow>,
    pub sales: Vec<ReportRow>,
}

/// How a table reaches its client
enum ClientLink {
    Direct,
    ViaProject,
}

async fn fetch_rows(
    pool: &SqlitePool,
    select: &str,
    date_expr: &str,
    link: ClientLink,
    scope: &ReportScope,
) -> RepoResult<Vec<ReportRow>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(select);
    qb.push(" AND ")
        .push(date_expr)
        .push(" >= ")
        .push_bind(scope.from)
        .push(" AND ")
        .push(date_expr)
        .push(" <= ")
        .push_bind(scope.to);
    if let Some(project_id) = scope.project_id {
        qb.push(" AND t.project_id = ").push_bind(project_id);
    }
    if let Some(client_id) = scope.client_id {
        match link {
            ClientLink::Direct => qb.push(" AND t.client_id = "),
            ClientLink::ViaProject => qb.push(" AND p.client_id = "),
        };
        qb.push_bind(client_id);
    }

    let rows = qb.build_query_as::<ReportRow>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn fetch(pool: &SqlitePool, scope: &ReportScope) -> RepoResult<ReportData> {
    let invoices = fetch_rows(
        pool,
        "SELECT t.issue_date AS date, t.total AS amount, t.status, 0 AS linked FROM invoices t WHERE t.invoice_type = 'invoice'",
        "t.issue_date",
        ClientLink::Direct,
        scope,
    )
    .await?;

    let expenses = fetch_rows(
        pool,
        "SELECT t.expense_date AS date, t.amount, t.status, 0 AS linked FROM expenses t LEFT JOIN projects p ON p.id = t.project_id WHERE 1 = 1",
        "t.expense_date",
        ClientLink::ViaProject,
        scope,
    )
    .await?;

    let installments = fetch_rows(
        pool,
        "SELECT COALESCE(t.paid_date, t.due_date) AS date, t.amount, t.status, 0 AS linked FROM installments t LEFT JOIN projects p ON p.id = t.project_id WHERE 1 = 1",
        "COALESCE(t.paid_date, t.due_date)",
        ClientLink::ViaProject,
        scope,
    )
    .await?;

    let purchases = fetch_rows(
        pool,
        "SELECT t.purchase_date AS date, t.amount, t.status, 0 AS linked FROM purchases t LEFT JOIN projects p ON p.id = t.project_id WHERE 1 = 1",
        "t.purchase_date",
        ClientLink::ViaProject,
        scope,
    )
    .await?;

    let sales = fetch_rows(
        pool,
        "SELECT t.sale_date AS date, t.amount, t.status, t.invoice_id IS NOT NULL AS linked FROM sales t WHERE 1 = 1",
        "t.sale_date",
        ClientLink::Direct,
        scope,
    )
    .await?;

    Ok(ReportData {
        invoices,
        expenses,
        installments,
        purchases,
        sales,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_scopes_by_range_and_client() {
        let pool = testing::pool().await;
        let client = sqlx::query("INSERT INTO clients (name, created_at, updated_at) VALUES ('Rosa', 0, 0)")
            .execute(&pool)
            .await
            .unwrap()
            .last_insert_rowid();
        let project = sqlx::query(
            "INSERT INTO projects (client_id, name, created_at, updated_at) VALUES (?, 'Villa', 0, 0)",
        )
        .bind(client)
        .execute(&pool)
        .await
        .unwrap()
        .last_insert_rowid();
        let other = sqlx::query("INSERT INTO projects (name, created_at, updated_at) VALUES ('Lobby', 0, 0)")
            .execute(&pool)
            .await
            .unwrap()
            .last_insert_rowid();

        for (project_id, date, amount) in [(project, "2024-01-05", 100), (other, "2024-01-06", 200), (project, "2024-03-01", 400)] {
            sqlx::query(
                "INSERT INTO expenses (project_id, category, amount, expense_date, created_at, updated_at) VALUES (?, 'materials', ?, ?, 0, 0)",
            )
            .bind(project_id)
            .bind(amount)
            .bind(date)
            .execute(&pool)
            .await
            .unwrap();
        }
        sqlx::query(
            "INSERT INTO installments (project_id, amount, due_date, paid_date, status, created_at, updated_at) VALUES (?, 50, '2023-12-20', '2024-01-02', 'paid', 0, 0)",
        )
        .bind(project)
        .execute(&pool)
        .await
        .unwrap();

        let scope = ReportScope {
            from: day(1),
            to: day(31),
            client_id: Some(client),
            project_id: None,
        };
        let data = fetch(&pool, &scope).await.unwrap();
        assert_eq!(data.expenses.len(), 1);
        assert_eq!(data.expenses[0].amount, 100);
        // dated by paid_date, not due_date
        assert_eq!(data.installments.len(), 1);
        assert_eq!(data.installments[0].date, day(2));
    }

    #[tokio::test]
    async fn test_quotations_and_sale_links() {
        let pool = testing::pool().await;
        let invoice = sqlx::query(
            "INSERT INTO invoices (invoice_number, invoice_type, status, issue_date, total, created_at, updated_at) VALUES ('INV-1', 'invoice', 'paid', '2024-01-03', 900, 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap()
        .last_insert_rowid();
        sqlx::query(
            "INSERT INTO invoices (invoice_number, invoice_type, status, issue_date, total, created_at, updated_at) VALUES ('QUO-1', 'quotation', 'sent', '2024-01-03', 700, 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO sales (invoice_id, description, amount, sale_date, status, created_at, updated_at) VALUES (?, 'linked', 900, '2024-01-03', 'completed', 0, 0), (NULL, 'manual', 80, '2024-01-04', 'completed', 0, 0)",
        )
        .bind(invoice)
        .execute(&pool)
        .await
        .unwrap();

        let scope = ReportScope {
            from: day(1),
            to: day(31),
            client_id: None,
            project_id: None,
        };
        let data = fetch(&pool, &scope).await.unwrap();
        assert_eq!(data.invoices.len(), 1);
        assert_eq!(data.invoices[0].amount, 900);
        let linked: Vec<_> = data.sales.iter().map(|s| s.linked).collect();
        assert_eq!(linked.len(), 2);
        assert_eq!(linked.iter().filter(|l| **l).count(), 1);
    }
}
