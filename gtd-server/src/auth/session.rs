//! Session cookie handling
//!
//! The session token travels in one HTTP-only cookie. A `Bearer` header is
//! accepted as well, for scripts and tests.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use http::HeaderMap;

use super::JwtService;

/// Token from the session cookie, else from `Authorization: Bearer`
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(cookie_name)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_string());
    }

    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(JwtService::extract_from_header)
        .map(str::to_string)
}

/// `Set-Cookie` carrying a fresh session
pub fn session_cookie(name: &str, token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .build()
}

/// `Set-Cookie` that clears the session
pub fn clear_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name.to_string(), String::new()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_cookie_preferred_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::COOKIE,
            HeaderValue::from_static("theme=dark; gtd_session=from-cookie"),
        );
        headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(
            token_from_headers(&headers, "gtd_session").as_deref(),
            Some("from-cookie")
        );
    }

    #[test]
    fn test_bearer_fallback_and_absence() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(
            token_from_headers(&headers, "gtd_session").as_deref(),
            Some("from-header")
        );
        assert_eq!(token_from_headers(&HeaderMap::new(), "gtd_session"), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let rendered = session_cookie("gtd_session", "tok".into(), true).to_string();
        assert!(rendered.starts_with("gtd_session=tok"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Secure"));

        let cleared = clear_cookie("gtd_session").to_string();
        assert!(cleared.contains("Max-Age=0"));
    }
}
