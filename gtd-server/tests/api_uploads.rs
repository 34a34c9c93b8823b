mod common;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::TestApp;
use http::{StatusCode, header};
use serde_json::json;

const PDF: &[u8] = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n1 0 obj\n<< /Type /Catalog >>\nendobj\n";

#[tokio::test]
async fn test_pdf_declared_as_png_is_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.user("designer@gtd.test", "designer").await;

    let res = app
        .post(
            "/api/uploads",
            &token,
            json!({ "fileName": "plan.png", "mimeType": "image/png", "data": STANDARD.encode(PDF) }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_kind(), "BAD_REQUEST");
}

#[tokio::test]
async fn test_pdf_upload_and_download() {
    let app = TestApp::new().await;
    let (_, token) = app.user("designer@gtd.test", "designer").await;

    let res = app
        .post(
            "/api/uploads",
            &token,
            json!({ "fileName": "plan.pdf", "mimeType": "application/pdf", "data": STANDARD.encode(PDF) }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["size"], PDF.len());
    assert_eq!(body["mimeType"], "application/pdf");
    assert_eq!(body["sha256"].as_str().unwrap().len(), 64);
    let url = body["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/api/uploads/") && url.ends_with(".pdf"));

    let file = app.get(&url, &token).await;
    assert_eq!(file.status, StatusCode::OK);
    assert_eq!(file.headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(file.body, PDF);
}

#[tokio::test]
async fn test_invalid_base64_is_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.user("designer@gtd.test", "designer").await;

    let res = app
        .post(
            "/api/uploads",
            &token,
            json!({ "fileName": "plan.pdf", "mimeType": "application/pdf", "data": "not base64 !!" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_rejects_traversal() {
    let app = TestApp::new().await;
    let (_, token) = app.user("designer@gtd.test", "designer").await;

    let res = app.get("/api/uploads/..%2Fsecret", &token).await;
    assert_ne!(res.status, StatusCode::OK);
}
