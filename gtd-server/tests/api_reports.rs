mod common;

use common::TestApp;
use http::{StatusCode, header};
use serde_json::json;

/// Paid invoice 1000 on 01-05, expense 300 on 01-10, manual sale 200 on 01-20
async fn seed(app: &TestApp, admin: &str) {
    let invoice = app
        .post(
            "/api/invoices",
            admin,
            json!({
                "issue_date": "2024-01-05",
                "status": "paid",
                "items": [{ "description": "Design fee", "quantity": 2, "unit_price": 500 }],
            }),
        )
        .await;
    assert_eq!(invoice.status, StatusCode::OK);
    assert_eq!(invoice.json()["total"], 1000);

    let expense = app
        .post(
            "/api/accounting/expenses",
            admin,
            json!({ "category": "materials", "amount": 300, "expense_date": "2024-01-10" }),
        )
        .await;
    assert_eq!(expense.status, StatusCode::OK);
    assert_eq!(expense.json()["status"], "completed");

    let sale = app
        .post(
            "/api/accounting/sales",
            admin,
            json!({ "description": "Showroom piece", "amount": 200, "sale_date": "2024-01-20", "status": "completed" }),
        )
        .await;
    assert_eq!(sale.status, StatusCode::OK);
}

#[tokio::test]
async fn test_daily_timeseries_is_inclusive_and_sums_to_summary() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@gtd.test", "admin").await;
    seed(&app, &admin).await;

    let range = "from=2024-01-01&to=2024-02-01";
    let series = app
        .get(&format!("/api/reports/timeseries?{range}&granularity=day"), &admin)
        .await;
    assert_eq!(series.status, StatusCode::OK);
    let buckets = series.json();
    let buckets = buckets.as_array().unwrap();
    assert_eq!(buckets.len(), 32);
    assert_eq!(buckets[0]["dateKey"], "2024-01-01");
    assert_eq!(buckets[31]["dateKey"], "2024-02-01");
    assert_eq!(buckets[4]["invoices"], 1000);

    let summary = app.get(&format!("/api/reports/summary?{range}"), &admin).await.json();
    assert_eq!(summary["paidInvoicesTotal"], 1000);
    assert_eq!(summary["expensesTotal"], 300);
    assert_eq!(summary["manualSalesTotal"], 200);
    assert_eq!(summary["net"], 900);

    let net: i64 = buckets.iter().map(|b| b["net"].as_i64().unwrap()).sum();
    assert_eq!(net, 900);
}

#[tokio::test]
async fn test_monthly_buckets() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@gtd.test", "admin").await;
    seed(&app, &admin).await;

    let res = app
        .get("/api/reports/timeseries?from=2024-01-15&to=2024-03-02&granularity=month", &admin)
        .await;
    let buckets = res.json();
    let keys: Vec<&str> = buckets
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["dateKey"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["2024-01", "2024-02", "2024-03"]);
}

#[tokio::test]
async fn test_inverted_range_is_bad_request() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@gtd.test", "admin").await;

    let res = app
        .get("/api/reports/timeseries?from=2024-02-01&to=2024-01-01", &admin)
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_kind(), "BAD_REQUEST");
}

#[tokio::test]
async fn test_breakdown_has_every_key() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@gtd.test", "admin").await;
    seed(&app, &admin).await;

    let res = app
        .get(
            "/api/reports/timeseries-breakdown?from=2024-01-01&to=2024-01-31&granularity=month",
            &admin,
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let bucket = &res.json()[0];
    assert_eq!(bucket["values"]["inv:paid"], 1000);
    assert_eq!(bucket["values"]["exp:pending"], 300);
    assert_eq!(bucket["values"]["sal:completed"], 200);
    assert_eq!(bucket["values"]["pur:received"], 0);
    assert_eq!(bucket["values"].as_object().unwrap().len(), 5 + 4 + 4 + 3 + 3);
}

#[tokio::test]
async fn test_csv_export() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@gtd.test", "admin").await;
    seed(&app, &admin).await;

    let res = app
        .get("/api/reports/export.csv?from=2024-01-01&to=2024-01-31&granularity=month", &admin)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(
        res.headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    assert!(
        res.headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .starts_with("attachment")
    );

    let body = res.text();
    assert!(body.starts_with('\u{FEFF}'));
    let lines: Vec<&str> = body.trim_start_matches('\u{FEFF}').lines().collect();
    assert_eq!(lines[0], "date,invoices,installments,expenses,net");
    assert_eq!(lines[1], "2024-01,1000,0,300,900");
}

#[tokio::test]
async fn test_reports_require_section() {
    let app = TestApp::new().await;
    let (_, hr) = app.user("hr@gtd.test", "hr_manager").await;
    let res = app
        .get("/api/reports/summary?from=2024-01-01&to=2024-01-31", &hr)
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}
