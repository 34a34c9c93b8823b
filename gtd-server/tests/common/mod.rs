//! In-process harness: full router over an in-memory database

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use gtd_server::auth::password;
use gtd_server::db::DbService;
use gtd_server::db::repository::user::{self, NewUser};
use gtd_server::{Config, RoleTable, ServerState, build_app};
use http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub state: ServerState,
    pub app: Router,
    _uploads: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Symbolic error kind of a failure body (`FORBIDDEN`, `BAD_REQUEST`, ...)
    pub fn error_kind(&self) -> String {
        self.json()["error"].as_str().unwrap_or_default().to_string()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let pool = DbService::in_memory().await.unwrap().pool;
        let state = ServerState::new(
            Config::for_testing(uploads.path()),
            Some(pool),
            RoleTable::builtin(),
        );
        let app = build_app(&state);
        Self {
            state,
            app,
            _uploads: uploads,
        }
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        self.state.pool().unwrap()
    }

    /// Create a user with [`PASSWORD`] and return `(id, bearer token)`
    pub async fn user(&self, email: &str, role: &str) -> (i64, String) {
        let hash = password::hash_password(PASSWORD).unwrap();
        let name = email.split('@').next().unwrap_or(email);
        let created = user::create(
            self.pool(),
            NewUser {
                name,
                email,
                password_hash: &hash,
                role,
                phone: None,
                position: None,
            },
        )
        .await
        .unwrap();
        let token = self
            .state
            .get_jwt_service()
            .generate_token(created.id, name, role)
            .unwrap();
        (created.id, token)
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }
}
