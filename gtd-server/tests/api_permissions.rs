mod common;

use common::TestApp;
use http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_unauthenticated_request_is_rejected() {
    let app = TestApp::new().await;
    let res = app.call(Method::GET, "/api/projects", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;
    let res = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "ok");
    assert_eq!(res.json()["database"], "ok");
}

#[tokio::test]
async fn test_viewer_is_forbidden_from_projects() {
    let app = TestApp::new().await;
    let (_, viewer) = app.user("viewer@gtd.test", "viewer").await;

    let res = app.get("/api/projects", &viewer).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error_kind(), "FORBIDDEN");

    // the denial is audit-logged
    let (_, admin) = app.user("admin@gtd.test", "admin").await;
    let audit = app.get("/api/audit?action=permission_denied", &admin).await;
    assert_eq!(audit.status, StatusCode::OK);
    assert_eq!(audit.json()["total"], 1);
    assert_eq!(audit.json()["items"][0]["details"]["section"], "projects");
}

#[tokio::test]
async fn test_designer_sees_only_assigned_projects_without_budget() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@gtd.test", "admin").await;
    let (designer_id, designer) = app.user("designer@gtd.test", "designer").await;

    let villa = app
        .post("/api/projects", &admin, json!({ "name": "Villa", "budget": 90000 }))
        .await;
    assert_eq!(villa.status, StatusCode::OK);
    assert_eq!(villa.json()["budget"], 90000);
    let villa_id = villa.json()["id"].as_i64().unwrap();
    app.post("/api/projects", &admin, json!({ "name": "Office" })).await;

    let added = app
        .post(
            &format!("/api/projects/{villa_id}/members"),
            &admin,
            json!({ "user_id": designer_id, "role_in_project": "designer" }),
        )
        .await;
    assert_eq!(added.status, StatusCode::OK);

    let res = app.get("/api/projects", &designer).await;
    assert_eq!(res.status, StatusCode::OK);
    let list = res.json();
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["name"], "Villa");
    assert!(list[0]["budget"].is_null());

    let admin_list = app.get("/api/projects", &admin).await.json();
    assert_eq!(admin_list.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_override_grants_section() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@gtd.test", "admin").await;
    let (viewer_id, viewer) = app.user("viewer@gtd.test", "viewer").await;

    let res = app
        .call(
            Method::PUT,
            &format!("/api/users/{viewer_id}/permissions"),
            Some(&admin),
            Some(json!({ "permissions": { "clients": true } })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["sections"]["clients"], true);

    assert_eq!(app.get("/api/clients", &viewer).await.status, StatusCode::OK);

    let mine = app.get("/api/users/me/permissions", &viewer).await;
    assert_eq!(mine.json()["sections"]["clients"], true);
    assert_eq!(mine.json()["sections"]["projects"], false);
}

#[tokio::test]
async fn test_unknown_override_key_is_rejected() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@gtd.test", "admin").await;
    let (viewer_id, _) = app.user("viewer@gtd.test", "viewer").await;

    let res = app
        .call(
            Method::PUT,
            &format!("/api/users/{viewer_id}/permissions"),
            Some(&admin),
            Some(json!({ "permissions": { "casino": true } })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_client_with_projects_cannot_be_deleted() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@gtd.test", "admin").await;

    let client = app.post("/api/clients", &admin, json!({ "name": "Acme" })).await.json();
    let client_id = client["id"].as_i64().unwrap();
    app.post(
        "/api/projects",
        &admin,
        json!({ "name": "Acme HQ", "client_id": client_id }),
    )
    .await;

    let res = app
        .call(Method::DELETE, &format!("/api/clients/{client_id}"), Some(&admin), None)
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.error_kind(), "CONFLICT");
}

#[tokio::test]
async fn test_designer_cannot_join_or_delete_unassigned_project() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@gtd.test", "admin").await;
    let (designer_id, designer) = app.user("designer@gtd.test", "designer").await;

    let project = app.post("/api/projects", &admin, json!({ "name": "Villa" })).await.json();
    let project_id = project["id"].as_i64().unwrap();

    let joined = app
        .post(
            &format!("/api/projects/{project_id}/members"),
            &designer,
            json!({ "user_id": designer_id }),
        )
        .await;
    assert_eq!(joined.status, StatusCode::FORBIDDEN);
    assert_eq!(
        app.get(&format!("/api/projects/{project_id}"), &designer).await.status,
        StatusCode::FORBIDDEN
    );

    let deleted = app
        .call(
            Method::DELETE,
            &format!("/api/projects/{project_id}"),
            Some(&designer),
            None,
        )
        .await;
    assert_eq!(deleted.status, StatusCode::FORBIDDEN);
    assert_eq!(
        app.get(&format!("/api/projects/{project_id}"), &admin).await.status,
        StatusCode::OK
    );

    let members = app.get(&format!("/api/projects/{project_id}/members"), &admin).await;
    assert!(members.json().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_designer_cannot_edit_assigned_project() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@gtd.test", "admin").await;
    let (designer_id, designer) = app.user("designer@gtd.test", "designer").await;

    let project = app.post("/api/projects", &admin, json!({ "name": "Villa" })).await.json();
    let project_id = project["id"].as_i64().unwrap();
    app.post(
        &format!("/api/projects/{project_id}/members"),
        &admin,
        json!({ "user_id": designer_id }),
    )
    .await;

    let renamed = app
        .call(
            Method::PUT,
            &format!("/api/projects/{project_id}"),
            Some(&designer),
            Some(json!({ "name": "Mine" })),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::FORBIDDEN);

    let left = app
        .call(
            Method::DELETE,
            &format!("/api/projects/{project_id}/members/{designer_id}"),
            Some(&designer),
            None,
        )
        .await;
    assert_eq!(left.status, StatusCode::FORBIDDEN);
    assert_eq!(app.get(&format!("/api/projects/{project_id}"), &designer).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_project_writes_follow_modifiers() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@gtd.test", "admin").await;
    let (_, designer) = app.user("designer@gtd.test", "designer").await;
    let (_, manager) = app.user("pm@gtd.test", "project_manager").await;

    let res = app.post("/api/projects", &designer, json!({ "name": "Side job" })).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.json()["details"]["modifier"], "create");

    let created = app.post("/api/projects", &manager, json!({ "name": "Office" })).await;
    assert_eq!(created.status, StatusCode::OK);
    let project_id = created.json()["id"].as_i64().unwrap();

    // managers create and edit but never delete
    let path = format!("/api/projects/{project_id}");
    let res = app.call(Method::DELETE, &path, Some(&manager), None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = app.call(Method::DELETE, &path, Some(&admin), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(app.get(&path, &admin).await.status, StatusCode::NOT_FOUND);
}
