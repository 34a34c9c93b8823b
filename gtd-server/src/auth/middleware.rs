//! Authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::extractor::authenticate;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// Routes under `/api/` reachable without a session
const PUBLIC_API_ROUTES: &[&str] = &["/api/auth/login", "/api/auth/logout", "/api/auth/me"];

/// Require a valid session on `/api/` routes
///
/// Injects [`CurrentUser`](crate::auth::CurrentUser) into request extensions.
///
/// Skipped for:
/// - `OPTIONS *` (CORS preflight)
/// - non `/api/` paths (`/health`, unknown routes fall through to 404)
/// - [`PUBLIC_API_ROUTES`]
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if PUBLIC_API_ROUTES.contains(&path) {
        return Ok(next.run(req).await);
    }

    match authenticate(&state, req.headers()).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_rejected",
                error = e.message.clone(),
                uri = format!("{:?}", req.uri())
            );
            Err(e)
        }
    }
}
